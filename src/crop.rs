//! Gating of range points to the region in front of the ego vehicle.

use serde::{Deserialize, Serialize};

use crate::types::RangePoint;

/// Box-shaped window in sensor coordinates (metres), plus a reflectivity floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeCrop {
    pub min_x: f64,
    pub max_x: f64,
    /// Half-width of the window around the sensor's x axis.
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
    /// Points without a reflectivity reading are never rejected by this.
    pub min_reflectivity: f64,
}

impl Default for RangeCrop {
    /// Ego lane, roughly from just above the road up to the roof of a passenger car.
    fn default() -> Self {
        Self {
            min_x: 2.0,
            max_x: 20.0,
            max_y: 2.0,
            min_z: -1.5,
            max_z: -0.9,
            min_reflectivity: 0.1,
        }
    }
}

impl RangeCrop {
    #[inline]
    pub fn keeps(&self, pt: &RangePoint) -> bool {
        let inside = pt.x >= self.min_x
            && pt.x <= self.max_x
            && pt.y.abs() <= self.max_y
            && pt.z >= self.min_z
            && pt.z <= self.max_z;
        let bright = pt.reflectivity.is_none_or(|r| r >= self.min_reflectivity);
        inside && bright
    }

    pub fn apply(&self, points: &mut Vec<RangePoint>) {
        points.retain(|pt| self.keeps(pt));
    }
}
