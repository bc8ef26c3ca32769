use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::detected_points::{Correspondence, ImageKeypoint};

/// Current box id -> previous box id.
pub type ObjectPairing = BTreeMap<u32, u32>;

/// A single return of the range sensor, x pointing forward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangePoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub reflectivity: Option<f64>,
}

impl RangePoint {
    pub fn new(x: f64, y: f64, z: f64) -> RangePoint {
        RangePoint {
            x,
            y,
            z,
            reflectivity: None,
        }
    }
}

/// Axis-aligned image region. Containment is half-open on the right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Roi {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Roi {
        Roi {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        self.x <= px && px < self.x + self.width && self.y <= py && py < self.y + self.height
    }

    pub fn contains_pt(&self, pt: Vec2) -> bool {
        self.contains(pt.x as f64, pt.y as f64)
    }

    /// Shrinks the region around its centre, removing `factor` of width and height.
    pub fn shrink(&self, factor: f64) -> Roi {
        Roi {
            x: self.x + factor * self.width / 2.0,
            y: self.y + factor * self.height / 2.0,
            width: self.width * (1.0 - factor),
            height: self.height * (1.0 - factor),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Range and vision TTC for one tracked object. `None` means no usable estimate this step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TtcPair {
    pub range: Option<f64>,
    pub vision: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub id: u32,
    pub roi: Roi,
    #[serde(default)]
    pub class_id: i32,
    #[serde(default)]
    pub confidence: f32,
    /// Indices into the owning frame's range points.
    #[serde(default)]
    pub range_points: Vec<usize>,
    /// Indices into the owning frame's correspondences.
    #[serde(default)]
    pub correspondences: Vec<usize>,
    #[serde(default)]
    pub ttc: Option<TtcPair>,
}

impl BoundingBox {
    pub fn new(id: u32, roi: Roi) -> BoundingBox {
        BoundingBox {
            id,
            roi,
            class_id: 0,
            confidence: 0.0,
            range_points: Vec::new(),
            correspondences: Vec::new(),
            ttc: None,
        }
    }

    pub fn clear_assignments(&mut self) {
        self.range_points.clear();
        self.correspondences.clear();
        self.ttc = None;
    }
}

/// First box in stored order whose region contains `pt`.
pub fn first_box_containing(boxes: &[BoundingBox], pt: Vec2) -> Option<&BoundingBox> {
    boxes.iter().find(|b| b.roi.contains_pt(pt))
}

/// Everything captured in one processing step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub timestamp_ns: i64,
    #[serde(default)]
    pub keypoints: Vec<ImageKeypoint>,
    #[serde(default)]
    pub range_points: Vec<RangePoint>,
    #[serde(default)]
    pub bounding_boxes: Vec<BoundingBox>,
    /// Matches from the previous frame's keypoints (query) to this frame's (train).
    #[serde(default)]
    pub correspondences: Vec<Correspondence>,
}

impl Frame {
    pub fn box_by_id(&self, id: u32) -> Option<&BoundingBox> {
        self.bounding_boxes.iter().find(|b| b.id == id)
    }

    pub fn box_range_points<'a>(
        &'a self,
        bbox: &'a BoundingBox,
    ) -> impl Iterator<Item = &'a RangePoint> + 'a {
        bbox.range_points
            .iter()
            .filter_map(move |&i| self.range_points.get(i))
    }

    pub fn box_correspondences(&self, bbox: &BoundingBox) -> Vec<Correspondence> {
        bbox.correspondences
            .iter()
            .filter_map(|&i| self.correspondences.get(i).copied())
            .collect()
    }
}
