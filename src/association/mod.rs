pub mod boxes;
pub mod keypoints;

pub use boxes::*;
pub use keypoints::*;
