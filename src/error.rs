//! Error types for the fusion pipeline.
//!
//! Missing or degenerate measurements are not errors: they show up as an
//! undefined (`None`) TTC. Only broken collaborator contracts land here.

/// Result type alias
pub type Result<T> = std::result::Result<T, FusionError>;

#[derive(Debug, thiserror::Error)]
pub enum FusionError {
    /// Calibration matrices that cannot produce valid geometry
    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),

    /// Pipeline configuration out of range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A correspondence references a keypoint that does not exist
    #[error("{frame} keypoint index {index} out of range (frame has {len} keypoints)")]
    KeypointIndexOutOfRange {
        frame: &'static str,
        index: usize,
        len: usize,
    },

    /// The extractor must return exactly one descriptor per keypoint
    #[error("extractor returned {descriptors} descriptors for {keypoints} keypoints")]
    DescriptorCountMismatch { keypoints: usize, descriptors: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}
