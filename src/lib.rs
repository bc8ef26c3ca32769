pub mod association;
pub mod calibration;
pub mod crop;
pub mod data_loader;
pub mod detected_points;
pub mod error;
pub mod features;
pub mod frame_buffer;
pub mod io;
pub mod pipeline;
pub mod projection;
pub mod ttc;
pub mod types;
pub mod util;

pub use error::{FusionError, Result};
