use log::debug;
use serde::{Deserialize, Serialize};

use crate::detected_points::{Correspondence, ImageKeypoint};
use crate::error::Result;
use crate::types::BoundingBox;
use crate::util::{quartiles_of_sorted, sort_f64};

/// Below this many matches there is no dispersion to measure.
pub const MIN_MATCHES_FOR_FILTER: usize = 3;

/// How displacement outliers are rejected, with fences at `k * IQR` beyond the quartiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutlierRule {
    /// Outlier only when below the lower fence and above the upper fence at once,
    /// which no finite distance satisfies, so every match is kept.
    Conjunctive { multiplier: f64 },
    /// Tukey fences: below the lower fence or above the upper fence.
    Disjunctive { multiplier: f64 },
}

impl Default for OutlierRule {
    fn default() -> Self {
        OutlierRule::Conjunctive { multiplier: 1.0 }
    }
}

impl OutlierRule {
    pub fn tukey() -> OutlierRule {
        OutlierRule::Disjunctive { multiplier: 1.5 }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            OutlierRule::Conjunctive { multiplier } | OutlierRule::Disjunctive { multiplier } => {
                *multiplier
            }
        }
    }

    pub fn is_outlier(&self, dist: f64, q1: f64, q3: f64) -> bool {
        let iqr = q3 - q1;
        let k = self.multiplier();
        let below = dist < q1 - k * iqr;
        let above = dist > q3 + k * iqr;
        match self {
            OutlierRule::Conjunctive { .. } => below && above,
            OutlierRule::Disjunctive { .. } => below || above,
        }
    }
}

/// Assigns to `bbox` the matches whose previous and current keypoints both lie
/// inside its region, minus displacement outliers.
///
/// Appends indices into `matches` to `bbox.correspondences`, ascending.
pub fn cluster_matches_with_roi(
    bbox: &mut BoundingBox,
    matches: &[Correspondence],
    prev_keypoints: &[ImageKeypoint],
    curr_keypoints: &[ImageKeypoint],
    rule: OutlierRule,
) -> Result<()> {
    let mut inside: Vec<(usize, f64)> = Vec::new();
    for (idx, m) in matches.iter().enumerate() {
        let (prev, curr) = m.resolve(prev_keypoints, curr_keypoints)?;
        if bbox.roi.contains_pt(curr.pt) && bbox.roi.contains_pt(prev.pt) {
            inside.push((idx, prev.distance_to(curr)));
        }
    }

    if inside.len() < MIN_MATCHES_FOR_FILTER {
        bbox.correspondences.extend(inside.iter().map(|(idx, _)| *idx));
        return Ok(());
    }

    let mut sorted: Vec<f64> = inside.iter().map(|(_, d)| *d).collect();
    sort_f64(&mut sorted);
    let Some((q1, _median, q3)) = quartiles_of_sorted(&sorted) else {
        return Ok(());
    };

    let before = inside.len();
    inside.retain(|(_, d)| !rule.is_outlier(*d, q1, q3));
    debug!(
        "box {}: kept {}/{} matches (q1 {:.2}, q3 {:.2})",
        bbox.id,
        inside.len(),
        before,
        q1,
        q3
    );
    bbox.correspondences.extend(inside.iter().map(|(idx, _)| *idx));
    Ok(())
}
