// SPDX-License-Identifier: GPL-3.0-only

//! Calibration model
//!
//! Holds the intrinsic/extrinsic parameters supplied by the calibration
//! collaborator and tracks whether they are ready for color compositing.

mod params;

pub use params::{
    BorderClip, CalibrationParameters, DistortionCoefficients, PinholeIntrinsics, TextureMapping,
};

use crate::errors::RenderResult;
use tracing::{info, warn};

/// Calibration state owned by the renderer
///
/// Until [`CalibrationModel::set`] succeeds the model carries default
/// parameters and reports not-ready; the color path must not run on them.
#[derive(Debug, Clone, Default)]
pub struct CalibrationModel {
    params: CalibrationParameters,
    ready: bool,
}

impl CalibrationModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a model that is already populated and ready
    pub fn with_parameters(params: CalibrationParameters) -> RenderResult<Self> {
        let mut model = Self::new();
        model.set(params)?;
        Ok(model)
    }

    /// Replace the parameters; an invalid set keeps the previous state
    pub fn set(&mut self, params: CalibrationParameters) -> RenderResult<()> {
        if let Err(e) = params.validate() {
            warn!(error = %e, "Rejected calibration parameters");
            return Err(e);
        }

        info!(
            depth_focal = %params.depth.focal,
            color_focal = %params.color.focal,
            near_clip = params.near_clip,
            far_clip = params.far_clip,
            "Calibration updated"
        );
        self.params = params;
        self.ready = true;
        Ok(())
    }

    /// Drop back to the not-ready state
    pub fn clear(&mut self) {
        self.params = CalibrationParameters::default();
        self.ready = false;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Current parameters, defaults when not ready
    pub fn parameters(&self) -> &CalibrationParameters {
        &self.params
    }

    /// Parameters only when a calibration has been provided
    pub fn ready_parameters(&self) -> Option<&CalibrationParameters> {
        self.ready.then_some(&self.params)
    }

    pub fn depth_intrinsics(&self) -> &PinholeIntrinsics {
        &self.params.depth
    }

    pub fn color_intrinsics(&self) -> &PinholeIntrinsics {
        &self.params.color
    }

    pub fn distortion(&self) -> &DistortionCoefficients {
        &self.params.distortion
    }

    pub fn extrinsics(&self) -> glam::Mat4 {
        self.params.extrinsics
    }

    pub fn near_clip(&self) -> f32 {
        self.params.near_clip
    }

    pub fn far_clip(&self) -> f32 {
        self.params.far_clip
    }

    pub fn edge_clip(&self) -> f32 {
        self.params.edge_clip
    }

    pub fn border(&self) -> &BorderClip {
        &self.params.border
    }

    pub fn world_rotation(&self) -> glam::Vec3 {
        self.params.world_rotation
    }

    pub fn mirror(&self) -> bool {
        self.params.mirror
    }

    pub fn texture_mapping(&self) -> &TextureMapping {
        &self.params.texture
    }
}
