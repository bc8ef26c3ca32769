use log::debug;

use super::finite;
use crate::types::RangePoint;
use crate::util::n_smallest;

pub const DEFAULT_ROBUST_N: usize = 7;

/// Forward distance that ignores up to `n - 1` stray returns closer than the object.
///
/// This is the largest of the `n` smallest x values, or the largest x overall
/// when there are fewer than `n` points.
pub fn robust_min_x<'a>(points: impl IntoIterator<Item = &'a RangePoint>, n: usize) -> Option<f64> {
    n_smallest(points.into_iter().map(|p| p.x), n).last().copied()
}

#[derive(Debug, Clone, Copy)]
pub struct RangeTtcEstimator {
    pub robust_n: usize,
}

impl Default for RangeTtcEstimator {
    fn default() -> Self {
        Self {
            robust_n: DEFAULT_ROBUST_N,
        }
    }
}

impl RangeTtcEstimator {
    pub fn new(robust_n: usize) -> RangeTtcEstimator {
        RangeTtcEstimator { robust_n }
    }

    pub fn estimate<'a>(
        &self,
        prev_points: impl IntoIterator<Item = &'a RangePoint>,
        curr_points: impl IntoIterator<Item = &'a RangePoint>,
        frame_rate: f64,
    ) -> Option<f64> {
        let (Some(d_prev), Some(d_curr)) = (
            robust_min_x(prev_points, self.robust_n),
            robust_min_x(curr_points, self.robust_n),
        ) else {
            debug!("range ttc undefined: empty point set");
            return None;
        };
        Self::ttc_from_distances(d_prev, d_curr, frame_rate)
    }

    /// `d_curr * dt / (d_prev - d_curr)`
    pub fn ttc_from_distances(d_prev: f64, d_curr: f64, frame_rate: f64) -> Option<f64> {
        if d_prev == d_curr {
            debug!("range ttc undefined: no change in distance ({:.3} m)", d_curr);
            return None;
        }
        let dt = 1.0 / frame_rate;
        finite(d_curr * dt / (d_prev - d_curr))
    }
}
