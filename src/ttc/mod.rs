//! Time-to-collision estimators, one per sensing modality.
//!
//! Both follow a constant-velocity model over a two-frame window and report
//! `None` whenever the inputs cannot support a finite estimate.

pub mod range;
pub mod vision;

pub use range::*;
pub use vision::*;

pub(crate) fn finite(ttc: f64) -> Option<f64> {
    if ttc.is_finite() { Some(ttc) } else { None }
}
