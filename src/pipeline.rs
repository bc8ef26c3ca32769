use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::association::{OutlierRule, cluster_matches_with_roi, match_bounding_boxes};
use crate::calibration::Calibration;
use crate::crop::RangeCrop;
use crate::error::{FusionError, Result};
use crate::features::FrontendConfig;
use crate::frame_buffer::FrameBuffer;
use crate::projection::cluster_range_points_with_roi;
use crate::ttc::{
    DEFAULT_MIN_PIXEL_DISTANCE, DEFAULT_ROBUST_N, RangeTtcEstimator, VisionTtcEstimator,
};
use crate::types::{Frame, ObjectPairing, TtcPair};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Frames per second of the synchronised sensor stream.
    pub frame_rate: f64,
    pub history_capacity: usize,
    /// Fraction of box width and height removed before range points are assigned.
    pub shrink_factor: f64,
    pub range_robust_n: usize,
    pub min_pixel_distance: f64,
    pub outlier_rule: OutlierRule,
    pub range_crop: Option<RangeCrop>,
    pub frontend: FrontendConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_rate: 10.0,
            history_capacity: 2,
            shrink_factor: 0.10,
            range_robust_n: DEFAULT_ROBUST_N,
            min_pixel_distance: DEFAULT_MIN_PIXEL_DISTANCE,
            outlier_rule: OutlierRule::default(),
            range_crop: Some(RangeCrop::default()),
            frontend: FrontendConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(FusionError::InvalidConfig(msg));
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return invalid(format!("frame_rate must be positive, got {}", self.frame_rate));
        }
        if self.history_capacity < FrameBuffer::<Frame>::MIN_CAPACITY {
            return invalid(format!(
                "history_capacity must be at least {}, got {}",
                FrameBuffer::<Frame>::MIN_CAPACITY,
                self.history_capacity
            ));
        }
        if !(0.0..1.0).contains(&self.shrink_factor) {
            return invalid(format!("shrink_factor must be in [0, 1), got {}", self.shrink_factor));
        }
        if self.range_robust_n == 0 {
            return invalid("range_robust_n must be at least 1".to_string());
        }
        if !(self.min_pixel_distance.is_finite() && self.min_pixel_distance >= 0.0) {
            return invalid(format!(
                "min_pixel_distance must be non-negative, got {}",
                self.min_pixel_distance
            ));
        }
        let k = self.outlier_rule.multiplier();
        if !(k.is_finite() && k >= 0.0) {
            return invalid(format!("outlier multiplier must be non-negative, got {}", k));
        }
        self.frontend.validate()
    }
}

/// TTC estimates for one object tracked across the last two frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectTtc {
    pub curr_box_id: u32,
    pub prev_box_id: u32,
    pub prev_range_points: usize,
    pub curr_range_points: usize,
    pub matches: usize,
    pub ttc: TtcPair,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub timestamp_ns: i64,
    /// Sorted by current box id.
    pub objects: Vec<ObjectTtc>,
}

/// Owns the frame history and runs association and both estimators per frame.
pub struct TtcPipeline {
    config: PipelineConfig,
    calibration: Calibration,
    history: FrameBuffer<Frame>,
    range_estimator: RangeTtcEstimator,
    vision_estimator: VisionTtcEstimator,
}

impl TtcPipeline {
    pub fn new(config: PipelineConfig, calibration: Calibration) -> Result<TtcPipeline> {
        config.validate()?;
        let history = FrameBuffer::new(config.history_capacity)?;
        let range_estimator = RangeTtcEstimator::new(config.range_robust_n);
        let vision_estimator = VisionTtcEstimator::new(config.min_pixel_distance);
        Ok(TtcPipeline {
            config,
            calibration,
            history,
            range_estimator,
            vision_estimator,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn history(&self) -> &FrameBuffer<Frame> {
        &self.history
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Ingests the next frame and estimates TTC for every object also seen in
    /// the previous frame. The first frame yields an empty report.
    pub fn process(&mut self, mut frame: Frame) -> Result<StepReport> {
        if let Some(last) = self.history.current() {
            if frame.timestamp_ns <= last.timestamp_ns {
                warn!(
                    "frame {} does not advance past {}",
                    frame.timestamp_ns, last.timestamp_ns
                );
            }
        }
        for bbox in frame.bounding_boxes.iter_mut() {
            bbox.clear_assignments();
        }
        if let Some(crop) = &self.config.range_crop {
            crop.apply(&mut frame.range_points);
        }
        cluster_range_points_with_roi(
            &mut frame.bounding_boxes,
            &frame.range_points,
            self.config.shrink_factor,
            &self.calibration,
        );

        let timestamp_ns = frame.timestamp_ns;
        self.history.push(frame);
        let Some((prev, curr)) = self.history.latest_pair_mut() else {
            debug!("first frame {}, nothing to compare against", timestamp_ns);
            return Ok(StepReport {
                timestamp_ns,
                objects: Vec::new(),
            });
        };

        let pairing: ObjectPairing = match_bounding_boxes(&curr.correspondences, prev, curr)?;

        let Frame {
            ref keypoints,
            ref range_points,
            ref mut bounding_boxes,
            ref correspondences,
            ..
        } = *curr;

        let frame_rate = self.config.frame_rate;
        let mut objects = Vec::with_capacity(pairing.len());
        // a match is kept by the first paired box, in ascending id order, that accepts it
        let mut claimed = vec![false; correspondences.len()];
        for (&curr_id, &prev_id) in &pairing {
            let (Some(prev_box), Some(curr_box)) = (
                prev.box_by_id(prev_id),
                bounding_boxes.iter_mut().find(|b| b.id == curr_id),
            ) else {
                continue;
            };

            cluster_matches_with_roi(
                curr_box,
                correspondences,
                &prev.keypoints,
                keypoints,
                self.config.outlier_rule,
            )?;
            curr_box
                .correspondences
                .retain(|&i| !std::mem::replace(&mut claimed[i], true));
            let box_matches: Vec<_> = curr_box
                .correspondences
                .iter()
                .map(|&i| correspondences[i])
                .collect();

            let range = self.range_estimator.estimate(
                prev.box_range_points(prev_box),
                curr_box.range_points.iter().map(move |&i| &range_points[i]),
                frame_rate,
            );
            let vision =
                self.vision_estimator
                    .estimate(&prev.keypoints, keypoints, &box_matches, frame_rate)?;

            let ttc = TtcPair { range, vision };
            curr_box.ttc = Some(ttc);
            debug!(
                "box {} <- {}: range ttc {:?}, vision ttc {:?}",
                curr_id, prev_id, range, vision
            );
            objects.push(ObjectTtc {
                curr_box_id: curr_id,
                prev_box_id: prev_id,
                prev_range_points: prev_box.range_points.len(),
                curr_range_points: curr_box.range_points.len(),
                matches: box_matches.len(),
                ttc,
            });
        }

        info!(
            "frame {}: {} boxes, {} tracked objects",
            timestamp_ns,
            bounding_boxes.len(),
            objects.len()
        );
        Ok(StepReport {
            timestamp_ns,
            objects,
        })
    }
}
