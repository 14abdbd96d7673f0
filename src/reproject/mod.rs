// SPDX-License-Identifier: GPL-3.0-only

//! Per-vertex depth reprojection
//!
//! For every grid vertex: sample its depth neighborhood, decide validity,
//! back-project through the depth pinhole model, then project through the
//! extrinsics and lens distortion into the color texture.
//!
//! [`reproject_vertex`] is a pure function of the vertex, the depth frame and
//! an explicit parameter snapshot; [`reproject_vertices`] maps it over the
//! whole topology in parallel.

pub mod distortion;
mod neighborhood;

pub use distortion::distort;
pub use neighborhood::Neighborhood;

use crate::calibration::{
    BorderClip, CalibrationParameters, DistortionCoefficients, PinholeIntrinsics,
};
use crate::ingest::DepthFrame;
use crate::mesh::{MeshTopology, SimplificationFactor};
use glam::{Mat4, Vec2, Vec3};
use rayon::prelude::*;

/// Depth-to-color texture projection, present only when a color texture is bound
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorProjection {
    pub extrinsics: Mat4,
    pub intrinsics: PinholeIntrinsics,
    pub distortion: DistortionCoefficients,
    pub texture_scale: Vec2,
    pub correction_scale: Vec2,
    /// Color texture dimensions (pixels)
    pub dim: Vec2,
}

impl ColorProjection {
    pub fn new(calibration: &CalibrationParameters, dim: Vec2) -> Self {
        Self {
            extrinsics: calibration.extrinsics,
            intrinsics: calibration.color,
            distortion: calibration.distortion,
            texture_scale: calibration.texture.texture_scale,
            correction_scale: calibration.texture.correction_scale,
            dim,
        }
    }

    /// Color texture coordinate (pixels) of a depth-camera-space point
    ///
    /// Points that land on the color camera's z = 0 plane map to the origin.
    pub fn texture_coordinate(&self, position: Vec3) -> Vec2 {
        let projection = self.extrinsics * position.extend(1.0);
        if projection.z == 0.0 {
            return Vec2::ZERO;
        }

        let xy = projection.truncate().truncate() / projection.z;
        let distorted = distort(xy, &self.distortion);
        let uv = (self.intrinsics.focal * distorted + self.intrinsics.principal_point)
            * self.texture_scale;
        let half = self.dim / 2.0;
        (uv - half) * self.correction_scale + half
    }
}

/// Snapshot of everything the per-vertex stage reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReprojectionParams {
    pub depth: PinholeIntrinsics,
    pub near_clip: f32,
    pub far_clip: f32,
    pub edge_clip: f32,
    pub border: BorderClip,
    pub simplify: Vec2,
    pub color: Option<ColorProjection>,
}

impl ReprojectionParams {
    /// Depth-only parameters; texture coordinates stay zero
    pub fn new(calibration: &CalibrationParameters, simplification: SimplificationFactor) -> Self {
        Self {
            depth: calibration.depth,
            near_clip: calibration.near_clip,
            far_clip: calibration.far_clip,
            edge_clip: calibration.edge_clip,
            border: calibration.border,
            simplify: simplification.as_vec2(),
            color: None,
        }
    }

    /// Enable color projection onto a texture of the given size
    pub fn with_color_texture(mut self, calibration: &CalibrationParameters, dim: Vec2) -> Self {
        self.color = Some(ColorProjection::new(calibration, dim));
        self
    }

    pub fn uses_texture(&self) -> bool {
        self.color.is_some()
    }
}

/// Per-frame output for one vertex
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerVertexResult {
    pub valid: bool,
    /// Center depth sample (clip units)
    pub depth: f32,
    /// Depth-camera-space position
    pub position: Vec3,
    /// Color texture coordinate (pixels), zero without a texture
    pub tex_coord: Vec2,
}

/// Reproject a single grid vertex
pub fn reproject_vertex(
    vertex: Vec3,
    frame: &DepthFrame,
    params: &ReprojectionParams,
) -> PerVertexResult {
    let pixel = vertex.truncate();
    let neighborhood = Neighborhood::sample(pixel, frame, &params.border, params.simplify);
    let valid = neighborhood.is_valid(params.near_clip, params.far_clip, params.edge_clip);

    let depth = neighborhood.center;
    let position = params.depth.unproject(pixel, depth);
    let tex_coord = params
        .color
        .as_ref()
        .map_or(Vec2::ZERO, |color| color.texture_coordinate(position));

    PerVertexResult {
        valid,
        depth,
        position,
        tex_coord,
    }
}

/// Reproject every vertex of the topology, in vertex order
pub fn reproject_vertices(
    topology: &MeshTopology,
    frame: &DepthFrame,
    params: &ReprojectionParams,
) -> Vec<PerVertexResult> {
    topology
        .vertices()
        .par_iter()
        .map(|&vertex| reproject_vertex(vertex, frame, params))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TopologyGenerator;
    use approx::assert_relative_eq;

    const D: u16 = 1000;

    fn params() -> ReprojectionParams {
        let calibration = CalibrationParameters {
            near_clip: 500.0,
            far_clip: 2000.0,
            edge_clip: 50.0,
            ..Default::default()
        };
        ReprojectionParams::new(&calibration, SimplificationFactor::default())
    }

    fn frame_with(overrides: &[(u32, u32, u16)]) -> DepthFrame {
        let mut samples = vec![D; 25];
        for &(x, y, value) in overrides {
            samples[(y * 5 + x) as usize] = value;
        }
        DepthFrame::new(5, 5, samples).unwrap()
    }

    fn validity(frame: &DepthFrame) -> bool {
        reproject_vertex(Vec3::new(2.0, 2.0, 0.0), frame, &params()).valid
    }

    #[test]
    fn test_constant_neighborhood_is_valid() {
        assert!(validity(&frame_with(&[])));
    }

    #[test]
    fn test_edge_step_invalidates() {
        // Each of the six neighbors in turn
        for (x, y) in [(3, 2), (2, 3), (1, 2), (2, 1), (1, 3), (3, 1)] {
            assert!(!validity(&frame_with(&[(x, y, D + 50)])), "({}, {})", x, y);
            assert!(validity(&frame_with(&[(x, y, D + 49)])), "({}, {})", x, y);
        }
    }

    #[test]
    fn test_out_of_range_invalidates() {
        assert!(!validity(&frame_with(&[(2, 2, 2000)])));
        assert!(!validity(&frame_with(&[(1, 3, 500)])));
        assert!(!validity(&frame_with(&[(3, 1, 0)])));
    }

    #[test]
    fn test_non_neighbor_is_ignored() {
        // Upper-left and lower-right are not part of the neighborhood
        assert!(validity(&frame_with(&[(1, 1, 0), (3, 3, 0)])));
    }

    #[test]
    fn test_back_projection_round_trip() {
        let frame = frame_with(&[]);
        let params = params();
        let result = reproject_vertex(Vec3::new(3.0, 1.0, 0.0), &frame, &params);
        assert_relative_eq!(result.position.z, D as f32);

        let pixel = params.depth.project(result.position).unwrap();
        assert_relative_eq!(pixel.x, 3.0, epsilon = 1e-3);
        assert_relative_eq!(pixel.y, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_identity_texture_coordinate() {
        // Identity extrinsics, zero distortion and matching intrinsics map
        // every vertex onto its own depth pixel
        let calibration = CalibrationParameters::default();
        let params = ReprojectionParams::new(&calibration, SimplificationFactor::default())
            .with_color_texture(&calibration, Vec2::new(5.0, 5.0));
        let result = reproject_vertex(Vec3::new(1.0, 4.0, 0.0), &frame_with(&[]), &params);
        assert_relative_eq!(result.tex_coord.x, 1.0, epsilon = 1e-3);
        assert_relative_eq!(result.tex_coord.y, 4.0, epsilon = 1e-3);
    }

    #[test]
    fn test_correction_scale_about_center() {
        let mut calibration = CalibrationParameters::default();
        calibration.texture.correction_scale = Vec2::splat(2.0);
        let projection = ColorProjection::new(&calibration, Vec2::new(640.0, 480.0));
        let position = calibration.depth.unproject(Vec2::new(330.0, 250.0), 1000.0);
        let tex = projection.texture_coordinate(position);
        assert_relative_eq!(tex.x, 340.0, epsilon = 1e-2);
        assert_relative_eq!(tex.y, 260.0, epsilon = 1e-2);
    }

    #[test]
    fn test_zero_depth_gives_zero_texture_coordinate() {
        let calibration = CalibrationParameters::default();
        let params = ReprojectionParams::new(&calibration, SimplificationFactor::default())
            .with_color_texture(&calibration, Vec2::new(5.0, 5.0));
        let frame = DepthFrame::filled(5, 5, 0);
        let result = reproject_vertex(Vec3::new(2.0, 2.0, 0.0), &frame, &params);
        assert!(!result.valid);
        assert_eq!(result.tex_coord, Vec2::ZERO);
    }

    #[test]
    fn test_depth_only_has_no_texture_coordinate() {
        let result = reproject_vertex(Vec3::new(2.0, 2.0, 0.0), &frame_with(&[]), &params());
        assert_eq!(result.tex_coord, Vec2::ZERO);
    }

    #[test]
    fn test_parallel_map_preserves_order() {
        let mut generator = TopologyGenerator::new();
        generator.rebuild(5, 5, SimplificationFactor::default());
        let frame = frame_with(&[]);
        let params = params();
        let results = reproject_vertices(generator.topology(), &frame, &params);
        assert_eq!(results.len(), 25);
        for (vertex, result) in generator.topology().vertices().iter().zip(&results) {
            assert_eq!(*result, reproject_vertex(*vertex, &frame, &params));
        }
        // Only the 3x3 interior has a complete neighborhood
        assert_eq!(results.iter().filter(|r| r.valid).count(), 9);
    }
}
