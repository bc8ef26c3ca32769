//! Seams to the external keypoint detector, descriptor extractor, descriptor
//! matcher and object detector.
//!
//! The algorithm behind each seam is chosen once, when a [`FeatureFrontend`]
//! is built, and checked against the configured [`DetectorType`] and
//! [`DescriptorType`].

use std::fmt;

use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::detected_points::{Correspondence, ImageKeypoint};
use crate::error::{FusionError, Result};
use crate::types::BoundingBox;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DetectorType {
    ShiTomasi,
    Harris,
    Fast,
    Brisk,
    Orb,
    Akaze,
    Sift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorType {
    Brisk,
    Orb,
    Akaze,
    Sift,
}

/// Distance used to compare two descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DescriptorNorm {
    Hamming,
    L2,
}

impl DescriptorType {
    pub fn norm(&self) -> DescriptorNorm {
        match self {
            DescriptorType::Brisk | DescriptorType::Orb | DescriptorType::Akaze => {
                DescriptorNorm::Hamming
            }
            DescriptorType::Sift => DescriptorNorm::L2,
        }
    }

    pub fn is_binary(&self) -> bool {
        self.norm() == DescriptorNorm::Hamming
    }

    /// AKAZE descriptors need the scale-space layout only AKAZE keypoints carry.
    pub fn supports(&self, detector: DetectorType) -> bool {
        match self {
            DescriptorType::Akaze => detector == DetectorType::Akaze,
            _ => true,
        }
    }
}

impl fmt::Display for DetectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetectorType::ShiTomasi => "SHITOMASI",
            DetectorType::Harris => "HARRIS",
            DetectorType::Fast => "FAST",
            DetectorType::Brisk => "BRISK",
            DetectorType::Orb => "ORB",
            DetectorType::Akaze => "AKAZE",
            DetectorType::Sift => "SIFT",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for DescriptorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DescriptorType::Brisk => "BRISK",
            DescriptorType::Orb => "ORB",
            DescriptorType::Akaze => "AKAZE",
            DescriptorType::Sift => "SIFT",
        };
        write!(f, "{}", name)
    }
}

pub trait KeypointDetector<I> {
    fn kind(&self) -> DetectorType;
    fn detect(&self, image: &I) -> Vec<ImageKeypoint>;
}

pub trait DescriptorExtractor<I> {
    type Descriptor;
    fn kind(&self) -> DescriptorType;
    /// One descriptor per keypoint, in keypoint order.
    fn describe(&self, image: &I, keypoints: &[ImageKeypoint]) -> Vec<Self::Descriptor>;
}

pub trait DescriptorMatcher<D> {
    fn norm(&self) -> DescriptorNorm;
    /// Matches `prev` (query) against `curr` (train).
    fn match_descriptors(&self, prev: &[D], curr: &[D]) -> Vec<Correspondence>;
}

pub trait ObjectDetector<I> {
    /// Boxes with region and id set; ids unique within the image.
    fn detect_objects(&self, image: &I) -> Vec<BoundingBox>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendConfig {
    pub detector: DetectorType,
    pub descriptor: DescriptorType,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            detector: DetectorType::Fast,
            descriptor: DescriptorType::Brisk,
        }
    }
}

impl FrontendConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.descriptor.supports(self.detector) {
            return Err(FusionError::InvalidConfig(format!(
                "{} descriptors cannot be computed on {} keypoints",
                self.descriptor, self.detector
            )));
        }
        Ok(())
    }
}

/// Keypoints, descriptors and matches against the previous image for one frame.
#[derive(Debug, Clone)]
pub struct FrameFeatures<D> {
    pub keypoints: Vec<ImageKeypoint>,
    pub descriptors: Vec<D>,
    pub correspondences: Vec<Correspondence>,
}

pub struct FeatureFrontend<I, D> {
    config: FrontendConfig,
    detector: Box<dyn KeypointDetector<I>>,
    extractor: Box<dyn DescriptorExtractor<I, Descriptor = D>>,
    matcher: Box<dyn DescriptorMatcher<D>>,
}

impl<I, D> FeatureFrontend<I, D> {
    pub fn new(
        config: FrontendConfig,
        detector: Box<dyn KeypointDetector<I>>,
        extractor: Box<dyn DescriptorExtractor<I, Descriptor = D>>,
        matcher: Box<dyn DescriptorMatcher<D>>,
    ) -> Result<FeatureFrontend<I, D>> {
        config.validate()?;
        if detector.kind() != config.detector {
            return Err(FusionError::InvalidConfig(format!(
                "configured detector {} but got {}",
                config.detector,
                detector.kind()
            )));
        }
        if extractor.kind() != config.descriptor {
            return Err(FusionError::InvalidConfig(format!(
                "configured descriptor {} but got {}",
                config.descriptor,
                extractor.kind()
            )));
        }
        if matcher.norm() != config.descriptor.norm() {
            return Err(FusionError::InvalidConfig(format!(
                "{} descriptors need a {:?} matcher, got {:?}",
                config.descriptor,
                config.descriptor.norm(),
                matcher.norm()
            )));
        }
        Ok(FeatureFrontend {
            config,
            detector,
            extractor,
            matcher,
        })
    }

    pub fn config(&self) -> &FrontendConfig {
        &self.config
    }

    /// Detects and describes keypoints, then matches them against the previous
    /// frame's descriptors when there is one.
    pub fn process(&self, image: &I, prev_descriptors: Option<&[D]>) -> Result<FrameFeatures<D>> {
        let keypoints = self.detector.detect(image);
        let descriptors = self.extractor.describe(image, &keypoints);
        if descriptors.len() != keypoints.len() {
            return Err(FusionError::DescriptorCountMismatch {
                keypoints: keypoints.len(),
                descriptors: descriptors.len(),
            });
        }
        let correspondences = match prev_descriptors {
            Some(prev) => self.matcher.match_descriptors(prev, &descriptors),
            None => Vec::new(),
        };
        debug!(
            "{}/{}: {} keypoints, {} matches",
            self.config.detector,
            self.config.descriptor,
            keypoints.len(),
            correspondences.len()
        );
        Ok(FrameFeatures {
            keypoints,
            descriptors,
            correspondences,
        })
    }
}
