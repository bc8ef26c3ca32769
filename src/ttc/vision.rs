use log::debug;

use super::finite;
use crate::detected_points::{Correspondence, ImageKeypoint};
use crate::error::Result;
use crate::util::{median_of_sorted, sort_f64};

/// Keypoint pairs closer than this in the current frame are dominated by noise.
pub const DEFAULT_MIN_PIXEL_DISTANCE: f64 = 100.0;

/// Estimates TTC from the scale change of keypoint constellations.
#[derive(Debug, Clone, Copy)]
pub struct VisionTtcEstimator {
    pub min_pixel_distance: f64,
}

impl Default for VisionTtcEstimator {
    fn default() -> Self {
        Self {
            min_pixel_distance: DEFAULT_MIN_PIXEL_DISTANCE,
        }
    }
}

impl VisionTtcEstimator {
    pub fn new(min_pixel_distance: f64) -> VisionTtcEstimator {
        VisionTtcEstimator { min_pixel_distance }
    }

    /// Current-to-previous distance ratios over every unordered pair of matches.
    pub fn distance_ratios(
        &self,
        prev_keypoints: &[ImageKeypoint],
        curr_keypoints: &[ImageKeypoint],
        matches: &[Correspondence],
    ) -> Result<Vec<f64>> {
        let pairs = matches
            .iter()
            .map(|m| m.resolve(prev_keypoints, curr_keypoints))
            .collect::<Result<Vec<_>>>()?;

        let mut ratios = Vec::new();
        for (i, (prev_a, curr_a)) in pairs.iter().enumerate() {
            for (prev_b, curr_b) in &pairs[i + 1..] {
                let dist_curr = curr_a.distance_to(curr_b);
                let dist_prev = prev_a.distance_to(prev_b);
                if dist_prev > f64::EPSILON && dist_curr >= self.min_pixel_distance {
                    ratios.push(dist_curr / dist_prev);
                }
            }
        }
        Ok(ratios)
    }

    pub fn estimate(
        &self,
        prev_keypoints: &[ImageKeypoint],
        curr_keypoints: &[ImageKeypoint],
        matches: &[Correspondence],
        frame_rate: f64,
    ) -> Result<Option<f64>> {
        if matches.len() < 2 {
            debug!("vision ttc undefined: {} matches", matches.len());
            return Ok(None);
        }
        let mut ratios = self.distance_ratios(prev_keypoints, curr_keypoints, matches)?;
        sort_f64(&mut ratios);
        let Some(median_ratio) = median_of_sorted(&ratios) else {
            debug!("vision ttc undefined: no keypoint pair passed the distance checks");
            return Ok(None);
        };
        let dt = 1.0 / frame_rate;
        Ok(finite(-dt / (1.0 - median_ratio)))
    }
}
