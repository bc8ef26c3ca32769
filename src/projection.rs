use log::trace;
use nalgebra as na;
use rayon::prelude::*;

use crate::calibration::Calibration;
use crate::types::{BoundingBox, RangePoint};

/// Points whose projected depth is at or below this are behind the image plane.
pub const DEPTH_EPSILON: f64 = 1e-6;

/// Projects one range point to pixel coordinates, `None` when it lies behind the camera.
pub fn project_one(calibration: &Calibration, pt: &RangePoint) -> Option<na::Vector2<f64>> {
    let x = na::Vector4::new(pt.x, pt.y, pt.z, 1.0);
    let y = calibration.projection_matrix() * x;
    let depth = y[2];
    if !(depth > DEPTH_EPSILON) {
        return None;
    }
    let p2d = na::Vector2::new(y[0] / depth, y[1] / depth);
    if p2d.iter().all(|v| v.is_finite()) {
        Some(p2d)
    } else {
        None
    }
}

pub fn project(calibration: &Calibration, p3d: &[RangePoint]) -> Vec<Option<na::Vector2<f64>>> {
    p3d.par_iter().map(|pt| project_one(calibration, pt)).collect()
}

/// Assigns every range point to the single shrunk box enclosing its projection.
///
/// Points enclosed by no box or by more than one box are dropped. Assigned
/// indices are appended to each box's `range_points` in point order.
pub fn cluster_range_points_with_roi(
    boxes: &mut [BoundingBox],
    points: &[RangePoint],
    shrink_factor: f64,
    calibration: &Calibration,
) {
    let shrunk: Vec<_> = boxes.iter().map(|b| b.roi.shrink(shrink_factor)).collect();
    let p2ds = project(calibration, points);

    let mut dropped = 0usize;
    for (pt_idx, p2d) in p2ds.iter().enumerate() {
        let Some(p2d) = p2d else {
            dropped += 1;
            continue;
        };
        let mut enclosing = shrunk
            .iter()
            .enumerate()
            .filter(|(_, roi)| roi.contains(p2d.x, p2d.y))
            .map(|(box_idx, _)| box_idx);
        match (enclosing.next(), enclosing.next()) {
            (Some(box_idx), None) => boxes[box_idx].range_points.push(pt_idx),
            _ => dropped += 1,
        }
    }
    trace!(
        "clustered {} range points into {} boxes, dropped {}",
        points.len() - dropped,
        boxes.len(),
        dropped
    );
}
