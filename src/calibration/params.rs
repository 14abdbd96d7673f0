// SPDX-License-Identifier: GPL-3.0-only

//! Calibration parameter types
//!
//! Intrinsics for the depth and color sensors, the lens distortion model and
//! the depth-to-color extrinsic transform, plus the clip settings that the
//! reprojection stage reads every frame.

use crate::constants::{self, kinect};
use crate::errors::{RenderError, RenderResult};
use crate::ingest::DepthFrame;
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Pinhole camera intrinsics (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinholeIntrinsics {
    /// Focal length (fx, fy)
    pub focal: Vec2,
    /// Principal point (cx, cy)
    pub principal_point: Vec2,
}

impl Default for PinholeIntrinsics {
    fn default() -> Self {
        Self {
            focal: Vec2::new(kinect::FX, kinect::FY),
            principal_point: Vec2::new(kinect::CX, kinect::CY),
        }
    }
}

impl PinholeIntrinsics {
    pub fn new(fx: f32, fy: f32, cx: f32, cy: f32) -> Self {
        Self {
            focal: Vec2::new(fx, fy),
            principal_point: Vec2::new(cx, cy),
        }
    }

    /// Kinect intrinsics scaled from the 640x480 base to the given resolution
    pub fn kinect_for_resolution(width: u32, height: u32) -> Self {
        let scale = Vec2::new(
            width as f32 / kinect::BASE_WIDTH,
            height as f32 / kinect::BASE_HEIGHT,
        );
        let base = Self::default();
        Self {
            focal: base.focal * scale,
            principal_point: base.principal_point * scale,
        }
    }

    /// Back-project a pixel at the given depth into camera space
    #[inline]
    pub fn unproject(&self, pixel: Vec2, depth: f32) -> Vec3 {
        let xy = (pixel - self.principal_point) * depth / self.focal;
        Vec3::new(xy.x, xy.y, depth)
    }

    /// Project a camera-space point onto the image plane
    ///
    /// Returns None for points on the z = 0 plane.
    #[inline]
    pub fn project(&self, point: Vec3) -> Option<Vec2> {
        if point.z == 0.0 {
            return None;
        }
        Some(point.truncate() / point.z * self.focal + self.principal_point)
    }

    /// World coordinate of a depth pixel, None when the sample is invalid
    pub fn world_coordinate_at(&self, frame: &DepthFrame, x: u32, y: u32) -> Option<Vec3> {
        let depth = frame.depth_at(x, y)?;
        if depth <= 0.0 {
            return None;
        }
        Some(self.unproject(Vec2::new(x as f32, y as f32), depth))
    }

    fn validate(&self, which: &str) -> RenderResult<()> {
        if !self.focal.is_finite() || self.focal.x == 0.0 || self.focal.y == 0.0 {
            return Err(RenderError::InvalidParameter(format!(
                "{} focal length must be finite and nonzero, got {}",
                which, self.focal
            )));
        }
        if !self.principal_point.is_finite() {
            return Err(RenderError::InvalidParameter(format!(
                "{} principal point must be finite",
                which
            )));
        }
        Ok(())
    }
}

/// Radial (k1, k2, k3) and tangential (p1, p2) lens distortion
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DistortionCoefficients {
    pub k1: f32,
    pub k2: f32,
    pub k3: f32,
    pub p1: f32,
    pub p2: f32,
}

impl DistortionCoefficients {
    /// Radial terms as a vector
    pub fn radial(&self) -> Vec3 {
        Vec3::new(self.k1, self.k2, self.k3)
    }

    /// Tangential terms as a vector
    pub fn tangential(&self) -> Vec2 {
        Vec2::new(self.p1, self.p2)
    }

    pub fn is_zero(&self) -> bool {
        self.radial() == Vec3::ZERO && self.tangential() == Vec2::ZERO
    }
}

/// Normalized border clip fractions of the depth image
///
/// Samples outside `[left*w, right*w] x [top*h, bottom*h]` read as zero depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorderClip {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for BorderClip {
    fn default() -> Self {
        Self {
            left: 0.0,
            right: 1.0,
            top: 0.0,
            bottom: 1.0,
        }
    }
}

/// Color texture placement corrections
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureMapping {
    /// Scale from calibrated color pixels to texture pixels
    pub texture_scale: Vec2,
    /// Scale applied about the texture center after projection
    pub correction_scale: Vec2,
}

impl Default for TextureMapping {
    fn default() -> Self {
        Self {
            texture_scale: Vec2::ONE,
            correction_scale: Vec2::ONE,
        }
    }
}

/// Full calibration set for one depth/color sensor pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationParameters {
    /// Depth sensor intrinsics
    pub depth: PinholeIntrinsics,
    /// Color sensor intrinsics
    pub color: PinholeIntrinsics,
    /// Color lens distortion
    pub distortion: DistortionCoefficients,
    /// Depth camera space to color camera space
    pub extrinsics: Mat4,
    /// Samples at or below this depth are invalid
    pub near_clip: f32,
    /// Samples at or above this depth are invalid
    pub far_clip: f32,
    /// Maximum depth step to any neighbor before a vertex is rejected
    pub edge_clip: f32,
    pub border: BorderClip,
    /// Euler rotation applied at bind, degrees about x, y, z
    pub world_rotation: Vec3,
    /// Keep the sensor's horizontal orientation instead of flipping it
    pub mirror: bool,
    pub texture: TextureMapping,
}

impl Default for CalibrationParameters {
    fn default() -> Self {
        Self {
            depth: PinholeIntrinsics::default(),
            color: PinholeIntrinsics::default(),
            distortion: DistortionCoefficients::default(),
            extrinsics: Mat4::IDENTITY,
            near_clip: constants::DEFAULT_NEAR_CLIP,
            far_clip: constants::DEFAULT_FAR_CLIP,
            edge_clip: constants::DEFAULT_EDGE_CLIP,
            border: BorderClip::default(),
            world_rotation: Vec3::ZERO,
            mirror: false,
            texture: TextureMapping::default(),
        }
    }
}

impl CalibrationParameters {
    /// Check the invariants the reprojection stage relies on
    pub fn validate(&self) -> RenderResult<()> {
        for (name, value) in [
            ("near_clip", self.near_clip),
            ("far_clip", self.far_clip),
            ("edge_clip", self.edge_clip),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(RenderError::InvalidParameter(format!(
                    "{} must be a non-negative distance, got {}",
                    name, value
                )));
            }
        }

        self.depth.validate("depth")?;
        self.color.validate("color")?;

        let border = [
            self.border.left,
            self.border.right,
            self.border.top,
            self.border.bottom,
        ];
        if border.iter().any(|v| !v.is_finite()) {
            return Err(RenderError::InvalidParameter(
                "border clip fractions must be finite".to_string(),
            ));
        }

        if !self.distortion.radial().is_finite() || !self.distortion.tangential().is_finite() {
            return Err(RenderError::InvalidParameter(
                "distortion coefficients must be finite".to_string(),
            ));
        }

        if !self.texture.texture_scale.is_finite() || !self.texture.correction_scale.is_finite()
        {
            return Err(RenderError::InvalidParameter(
                "texture mapping scales must be finite".to_string(),
            ));
        }

        if !self.world_rotation.is_finite() {
            return Err(RenderError::InvalidParameter(
                "world rotation must be finite".to_string(),
            ));
        }

        let det = self.extrinsics.determinant();
        if !det.is_finite() || det.abs() <= f32::EPSILON {
            return Err(RenderError::InvalidParameter(format!(
                "extrinsic transform is not invertible (determinant {})",
                det
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_parameters_validate() {
        assert!(CalibrationParameters::default().validate().is_ok());
    }

    #[test]
    fn test_zero_focal_rejected() {
        let mut params = CalibrationParameters::default();
        params.depth.focal.y = 0.0;
        assert!(matches!(
            params.validate(),
            Err(RenderError::InvalidParameter(_))
        ));

        let mut params = CalibrationParameters::default();
        params.color.focal.x = 0.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_negative_distance_rejected() {
        let mut params = CalibrationParameters::default();
        params.edge_clip = -1.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_singular_extrinsics_rejected() {
        let mut params = CalibrationParameters::default();
        params.extrinsics = Mat4::ZERO;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_unproject_project_round_trip() {
        let intrinsics = PinholeIntrinsics::new(525.0, 520.0, 319.5, 239.5);
        let pixel = Vec2::new(102.0, 377.0);
        let point = intrinsics.unproject(pixel, 1234.0);
        assert_relative_eq!(point.z, 1234.0);

        let back = intrinsics.project(point).unwrap();
        assert_relative_eq!(back.x, pixel.x, epsilon = 1e-3);
        assert_relative_eq!(back.y, pixel.y, epsilon = 1e-3);
    }

    #[test]
    fn test_project_on_zero_plane() {
        let intrinsics = PinholeIntrinsics::default();
        assert!(intrinsics.project(Vec3::new(1.0, 1.0, 0.0)).is_none());
    }

    #[test]
    fn test_kinect_scaling() {
        let half = PinholeIntrinsics::kinect_for_resolution(320, 240);
        assert_relative_eq!(half.focal.x, kinect::FX / 2.0);
        assert_relative_eq!(half.principal_point.y, kinect::CY / 2.0);
    }
}
