use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};

const SINGULAR_DET: f64 = 1e-12;

/// Row-major calibration as stored on disk.
///
/// `r_rect` is the 3x3 rectifying rotation and `rt` the top 3x4 block of the
/// range-sensor-to-camera transform; both are padded to 4x4 homogeneous form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    pub p_rect: [[f64; 4]; 3],
    pub r_rect: [[f64; 3]; 3],
    pub rt: [[f64; 4]; 3],
    #[serde(default = "default_image_size")]
    pub image_size: (u32, u32),
}

fn default_image_size() -> (u32, u32) {
    (1242, 375)
}

impl Default for CalibrationConfig {
    /// KITTI camera 00 and velodyne extrinsics.
    fn default() -> Self {
        Self {
            p_rect: [
                [7.215377e+02, 0.0, 6.095593e+02, 0.0],
                [0.0, 7.215377e+02, 1.728540e+02, 0.0],
                [0.0, 0.0, 1.0, 0.0],
            ],
            r_rect: [
                [9.999239e-01, 9.837760e-03, -7.445048e-03],
                [-9.869795e-03, 9.999421e-01, -4.278459e-03],
                [7.402527e-03, 4.351614e-03, 9.999631e-01],
            ],
            rt: [
                [7.533745e-03, -9.999714e-01, -6.166020e-04, -4.069766e-03],
                [1.480249e-02, 7.280733e-04, -9.998902e-01, -7.631618e-02],
                [9.998621e-01, 7.523790e-03, 1.480755e-02, -2.717806e-01],
            ],
            image_size: default_image_size(),
        }
    }
}

/// Validated projection chain from range-sensor coordinates to pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub p_rect: na::Matrix3x4<f64>,
    pub r_rect: na::Matrix4<f64>,
    pub rt: na::Matrix4<f64>,
    pub image_size: (u32, u32),
    projection: na::Matrix3x4<f64>,
}

impl Calibration {
    pub fn new(
        p_rect: na::Matrix3x4<f64>,
        r_rect: na::Matrix4<f64>,
        rt: na::Matrix4<f64>,
        image_size: (u32, u32),
    ) -> Result<Calibration> {
        let all_finite = p_rect.iter().chain(r_rect.iter()).chain(rt.iter()).all(|v| v.is_finite());
        if !all_finite {
            return Err(FusionError::InvalidCalibration(
                "matrices contain non-finite values".to_string(),
            ));
        }
        if r_rect.determinant().abs() < SINGULAR_DET {
            return Err(FusionError::InvalidCalibration(
                "rectification matrix is singular".to_string(),
            ));
        }
        if rt.determinant().abs() < SINGULAR_DET {
            return Err(FusionError::InvalidCalibration(
                "extrinsic matrix is singular".to_string(),
            ));
        }
        let intrinsic: na::Matrix3<f64> = p_rect.fixed_view::<3, 3>(0, 0).into_owned();
        if intrinsic.determinant().abs() < SINGULAR_DET {
            return Err(FusionError::InvalidCalibration(
                "projection matrix is rank deficient".to_string(),
            ));
        }
        let projection = p_rect * r_rect * rt;
        Ok(Calibration {
            p_rect,
            r_rect,
            rt,
            image_size,
            projection,
        })
    }

    pub fn from_config(config: &CalibrationConfig) -> Result<Calibration> {
        let p_rect = na::Matrix3x4::from_fn(|r, c| config.p_rect[r][c]);
        let r_rect = na::Matrix4::from_fn(|r, c| {
            if r < 3 && c < 3 {
                config.r_rect[r][c]
            } else if r == c {
                1.0
            } else {
                0.0
            }
        });
        let rt = na::Matrix4::from_fn(|r, c| {
            if r < 3 {
                config.rt[r][c]
            } else if c == 3 {
                1.0
            } else {
                0.0
            }
        });
        Self::new(p_rect, r_rect, rt, config.image_size)
    }

    /// Ideal pinhole camera looking down +z with identity extrinsics.
    pub fn pinhole(focal: f64, cx: f64, cy: f64, image_size: (u32, u32)) -> Result<Calibration> {
        let p_rect = na::Matrix3x4::new(
            focal, 0.0, cx, 0.0, //
            0.0, focal, cy, 0.0, //
            0.0, 0.0, 1.0, 0.0,
        );
        Self::new(
            p_rect,
            na::Matrix4::identity(),
            na::Matrix4::identity(),
            image_size,
        )
    }

    /// `P_rect * R_rect * RT`
    pub fn projection_matrix(&self) -> &na::Matrix3x4<f64> {
        &self.projection
    }
}
