// SPDX-License-Identifier: GPL-3.0-only

//! Human-readable dump of the active render parameters

use crate::calibration::{BorderClip, CalibrationParameters, DistortionCoefficients};
use crate::mesh::SimplificationFactor;
use glam::{Mat4, Vec2};
use std::fmt;

/// Snapshot of every parameter that influences the next draw
#[derive(Debug, Clone, PartialEq)]
pub struct RenderDiagnostics {
    pub use_texture: bool,
    pub calibration_ready: bool,
    pub depth_only: bool,
    pub bound: bool,
    pub depth_dimensions: Option<(u32, u32)>,
    pub color_dimensions: Option<(u32, u32)>,
    pub texture_scale: Vec2,
    pub correction_scale: Vec2,
    pub distortion: DistortionCoefficients,
    pub color_focal: Vec2,
    pub color_principal_point: Vec2,
    pub depth_focal: Vec2,
    pub depth_principal_point: Vec2,
    pub near_clip: f32,
    pub far_clip: f32,
    pub edge_clip: f32,
    pub border: BorderClip,
    pub simplification: SimplificationFactor,
    pub extrinsics: Mat4,
    pub vertex_count: usize,
    pub triangle_count: usize,
}

impl RenderDiagnostics {
    /// Collect from calibration parameters; frame and state fields start empty
    pub fn from_parameters(
        params: &CalibrationParameters,
        simplification: SimplificationFactor,
    ) -> Self {
        Self {
            use_texture: false,
            calibration_ready: false,
            depth_only: false,
            bound: false,
            depth_dimensions: None,
            color_dimensions: None,
            texture_scale: params.texture.texture_scale,
            correction_scale: params.texture.correction_scale,
            distortion: params.distortion,
            color_focal: params.color.focal,
            color_principal_point: params.color.principal_point,
            depth_focal: params.depth.focal,
            depth_principal_point: params.depth.principal_point,
            near_clip: params.near_clip,
            far_clip: params.far_clip,
            edge_clip: params.edge_clip,
            border: params.border,
            simplification,
            extrinsics: params.extrinsics,
            vertex_count: 0,
            triangle_count: 0,
        }
    }
}

fn dimensions(dims: Option<(u32, u32)>) -> String {
    match dims {
        Some((w, h)) => format!("{}x{}", w, h),
        None => "none".to_string(),
    }
}

impl fmt::Display for RenderDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Use texture: {}", self.use_texture)?;
        writeln!(f, "Calibration ready: {}", self.calibration_ready)?;
        writeln!(f, "Depth only: {}", self.depth_only)?;
        writeln!(f, "Bound: {}", self.bound)?;
        writeln!(f, "Depth dims: {}", dimensions(self.depth_dimensions))?;
        writeln!(f, "Color dims: {}", dimensions(self.color_dimensions))?;
        writeln!(f, "Texture scale: {}", self.texture_scale)?;
        writeln!(f, "Correction scale: {}", self.correction_scale)?;
        let d = &self.distortion;
        writeln!(f, "Distortion K: [{}, {}, {}]", d.k1, d.k2, d.k3)?;
        writeln!(f, "Distortion P: [{}, {}]", d.p1, d.p2)?;
        writeln!(f, "Color FOV: {}", self.color_focal)?;
        writeln!(f, "Color PP: {}", self.color_principal_point)?;
        writeln!(f, "Depth FOV: {}", self.depth_focal)?;
        writeln!(f, "Depth PP: {}", self.depth_principal_point)?;
        writeln!(f, "Near clip: {}", self.near_clip)?;
        writeln!(f, "Far clip: {}", self.far_clip)?;
        writeln!(f, "Edge clip: {}", self.edge_clip)?;
        let b = &self.border;
        writeln!(
            f,
            "Border clip: left {} right {} top {} bottom {}",
            b.left, b.right, b.top, b.bottom
        )?;
        writeln!(
            f,
            "Simplify: {} x {}",
            self.simplification.x, self.simplification.y
        )?;
        writeln!(f, "Extrinsics:")?;
        // Row-major for reading
        for row in 0..4 {
            let r = self.extrinsics.row(row);
            writeln!(f, "  [{:>10.4} {:>10.4} {:>10.4} {:>10.4}]", r.x, r.y, r.z, r.w)?;
        }
        write!(
            f,
            "Topology: {} vertices, {} triangles",
            self.vertex_count, self.triangle_count
        )
    }
}
