use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};

/// A 2D feature produced by an external detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageKeypoint {
    pub pt: Vec2,
    #[serde(default)]
    pub size: f32,
    /// Orientation in degrees, -1 when the detector does not compute one.
    #[serde(default = "default_angle")]
    pub angle: f32,
    #[serde(default)]
    pub response: f32,
    #[serde(default)]
    pub octave: i32,
}

fn default_angle() -> f32 {
    -1.0
}

impl ImageKeypoint {
    pub fn new(x: f32, y: f32) -> ImageKeypoint {
        ImageKeypoint {
            pt: Vec2::new(x, y),
            size: 0.0,
            angle: default_angle(),
            response: 0.0,
            octave: 0,
        }
    }

    pub fn with_size(mut self, size: f32) -> ImageKeypoint {
        self.size = size;
        self
    }

    pub fn with_response(mut self, response: f32) -> ImageKeypoint {
        self.response = response;
        self
    }

    /// Euclidean pixel distance to another keypoint.
    pub fn distance_to(&self, other: &ImageKeypoint) -> f64 {
        let dx = self.pt.x as f64 - other.pt.x as f64;
        let dy = self.pt.y as f64 - other.pt.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Keypoint match between two consecutive frames.
///
/// `query_idx` indexes the previous frame's keypoints, `train_idx` the current
/// frame's keypoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correspondence {
    pub query_idx: usize,
    pub train_idx: usize,
    #[serde(default)]
    pub distance: f32,
}

impl Correspondence {
    pub fn new(query_idx: usize, train_idx: usize) -> Correspondence {
        Correspondence {
            query_idx,
            train_idx,
            distance: 0.0,
        }
    }

    pub fn with_distance(mut self, distance: f32) -> Correspondence {
        self.distance = distance;
        self
    }

    /// Looks up the (previous, current) keypoint pair this match links.
    pub fn resolve<'a>(
        &self,
        prev_keypoints: &'a [ImageKeypoint],
        curr_keypoints: &'a [ImageKeypoint],
    ) -> Result<(&'a ImageKeypoint, &'a ImageKeypoint)> {
        let prev = prev_keypoints
            .get(self.query_idx)
            .ok_or(FusionError::KeypointIndexOutOfRange {
                frame: "previous",
                index: self.query_idx,
                len: prev_keypoints.len(),
            })?;
        let curr = curr_keypoints
            .get(self.train_idx)
            .ok_or(FusionError::KeypointIndexOutOfRange {
                frame: "current",
                index: self.train_idx,
                len: curr_keypoints.len(),
            })?;
        Ok((prev, curr))
    }
}
