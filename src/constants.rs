// SPDX-License-Identifier: GPL-3.0-only

//! Depth pipeline constants - Single source of truth
//!
//! Default clip ranges, sensor intrinsics and conversion coefficients used
//! across ingest, calibration and reprojection.

/// Default near clip (depth units, millimeters for native depth)
pub const DEFAULT_NEAR_CLIP: f32 = 400.0;
/// Default far clip (depth units)
pub const DEFAULT_FAR_CLIP: f32 = 4000.0;
/// Default maximum depth step between neighboring samples (depth units)
pub const DEFAULT_EDGE_CLIP: f32 = 100.0;

/// Invalid depth marker value
pub const DEPTH_INVALID: u16 = 0;
/// Largest millimeter value produced by disparity conversion
pub const DEPTH_MAX_VALID_MM: u16 = 10000;

/// Disparity samples at or above this value carry no measurement
/// (10-bit saturation after the 6-bit left shift)
pub const DISPARITY_INVALID: u16 = 65472;
/// Smallest disparity denominator accepted before conversion is rejected
pub const DISPARITY_MIN_DENOMINATOR: f32 = 0.01;

/// Number of quantization bands for depth colormap visualization
pub const DEPTH_COLORMAP_BANDS: f32 = 32.0;

/// Kinect camera intrinsics and depth coefficients
///
/// Used as the depth intrinsics before a calibration has been provided,
/// and for disparity-to-millimeter conversion at ingest.
///
/// Reference resolution: 640x480 (medium resolution depth mode)
pub mod kinect {
    /// Focal length X (pixels) at 640x480 base resolution
    pub const FX: f32 = 594.21;
    /// Focal length Y (pixels) at 640x480 base resolution
    pub const FY: f32 = 591.04;
    /// Principal point X (pixels) at 640x480 base resolution
    pub const CX: f32 = 339.5;
    /// Principal point Y (pixels) at 640x480 base resolution
    pub const CY: f32 = 242.7;

    /// Used in formula: depth_m = 1.0 / (raw * DEPTH_COEFF_A + DEPTH_COEFF_B)
    pub const DEPTH_COEFF_A: f32 = -0.0030711;
    /// Used in formula: depth_m = 1.0 / (raw * DEPTH_COEFF_A + DEPTH_COEFF_B)
    pub const DEPTH_COEFF_B: f32 = 3.3309495;

    /// Base width for intrinsics calculation
    pub const BASE_WIDTH: f32 = 640.0;
    /// Base height for intrinsics calculation
    pub const BASE_HEIGHT: f32 = 480.0;
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}
