// SPDX-License-Identifier: GPL-3.0-only

//! Decimated grid triangulation over the depth image
//!
//! The grid only depends on the depth dimensions and the simplification step,
//! so it is built once and reused; per-frame depth only changes which vertices
//! are visible.

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Grid step in depth pixels along each axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimplificationFactor {
    pub x: f32,
    pub y: f32,
}

impl Default for SimplificationFactor {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

impl SimplificationFactor {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Same step on both axes
    pub fn uniform(step: f32) -> Self {
        Self { x: step, y: step }
    }

    /// Both steps must be finite and strictly positive
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x > 0.0 && self.y > 0.0
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Outcome of a topology rebuild request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyChange {
    /// A new topology replaced the old one
    Rebuilt,
    /// Arguments matched the last rebuild, nothing was recomputed
    Unchanged,
    /// Simplification was not strictly positive, or the grid would not fit
    /// 32-bit indices; topology kept as is
    Rejected,
    /// Simplification stored, applied once a depth frame arrives
    Deferred,
}

/// Static grid mesh: vertex positions in depth-pixel space plus triangle indices
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshTopology {
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
    colors: Option<Vec<Vec4>>,
    columns: u32,
    rows: u32,
    simplification: SimplificationFactor,
    depth_width: u32,
    depth_height: u32,
    generation: u64,
}

/// Grid columns and rows for a depth image, `None` when the vertex count
/// exceeds the 32-bit index range
fn grid_size(
    depth_width: u32,
    depth_height: u32,
    simplification: SimplificationFactor,
) -> Option<(u32, u32)> {
    if depth_width == 0 || depth_height == 0 {
        return Some((0, 0));
    }
    let columns = (depth_width as f32 / simplification.x).ceil();
    let rows = (depth_height as f32 / simplification.y).ceil();
    if f64::from(columns) * f64::from(rows) > f64::from(u32::MAX) {
        return None;
    }
    Some((columns as u32, rows as u32))
}

impl MeshTopology {
    fn build(
        (columns, rows): (u32, u32),
        depth_width: u32,
        depth_height: u32,
        simplification: SimplificationFactor,
        with_colors: bool,
        generation: u64,
    ) -> Self {

        let cell_columns = columns.saturating_sub(1);
        let cell_rows = rows.saturating_sub(1);
        let mut indices = Vec::with_capacity(cell_columns as usize * cell_rows as usize * 6);
        for y in 0..cell_rows {
            for x in 0..cell_columns {
                let current = x + y * columns;
                let right = (x + 1) + y * columns;
                let down = x + (y + 1) * columns;
                let diagonal = (x + 1) + (y + 1) * columns;

                // Winding is fixed for consistent front-face culling
                indices.extend_from_slice(&[current, right, down]);
                indices.extend_from_slice(&[diagonal, down, right]);
            }
        }

        let vertex_count = columns as usize * rows as usize;
        let mut vertices = Vec::with_capacity(vertex_count);
        for row in 0..rows {
            for col in 0..columns {
                vertices.push(Vec3::new(
                    col as f32 * simplification.x,
                    row as f32 * simplification.y,
                    0.0,
                ));
            }
        }

        // Placeholder white, modulated by the color texture at draw time
        let colors = with_colors.then(|| vec![Vec4::ONE; vertex_count]);

        Self {
            vertices,
            indices,
            colors,
            columns,
            rows,
            simplification,
            depth_width,
            depth_height,
            generation,
        }
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Per-vertex color slots when color compositing is enabled
    pub fn colors(&self) -> Option<&[Vec4]> {
        self.colors.as_deref()
    }

    /// Iterate triangles as index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn simplification(&self) -> SimplificationFactor {
        self.simplification
    }

    pub fn depth_dimensions(&self) -> (u32, u32) {
        (self.depth_width, self.depth_height)
    }

    /// Incremented on every rebuild, unchanged by no-op requests
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Raw bytes of the vertex positions
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw bytes of the index buffer
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TopologyKey {
    depth_width: u32,
    depth_height: u32,
    simplification: SimplificationFactor,
    with_colors: bool,
}

/// Owns the mesh topology and regenerates it only when its inputs change
#[derive(Debug, Clone, Default)]
pub struct TopologyGenerator {
    topology: Arc<MeshTopology>,
    last: Option<TopologyKey>,
    with_colors: bool,
}

impl TopologyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit placeholder color slots on the next rebuild
    pub fn with_colors(mut self, with_colors: bool) -> Self {
        self.with_colors = with_colors;
        self
    }

    pub fn set_colors_enabled(&mut self, with_colors: bool) {
        self.with_colors = with_colors;
    }

    pub fn colors_enabled(&self) -> bool {
        self.with_colors
    }

    pub fn topology(&self) -> &MeshTopology {
        self.topology.as_ref()
    }

    /// Shared handle to the current topology; later rebuilds leave it intact
    pub fn shared(&self) -> Arc<MeshTopology> {
        Arc::clone(&self.topology)
    }

    /// Rebuild the grid for the given depth dimensions and step
    pub fn rebuild(
        &mut self,
        depth_width: u32,
        depth_height: u32,
        simplification: SimplificationFactor,
    ) -> TopologyChange {
        if !simplification.is_valid() {
            debug!(
                x = simplification.x,
                y = simplification.y,
                "Ignoring non-positive simplification"
            );
            return TopologyChange::Rejected;
        }

        let key = TopologyKey {
            depth_width,
            depth_height,
            simplification,
            with_colors: self.with_colors,
        };
        if self.last == Some(key) {
            return TopologyChange::Unchanged;
        }

        let Some(grid) = grid_size(depth_width, depth_height, simplification) else {
            debug!(
                depth_width,
                depth_height,
                x = simplification.x,
                y = simplification.y,
                "Ignoring simplification, grid exceeds the index range"
            );
            return TopologyChange::Rejected;
        };

        let topology = MeshTopology::build(
            grid,
            depth_width,
            depth_height,
            simplification,
            self.with_colors,
            self.topology.generation + 1,
        );

        info!(
            depth_width,
            depth_height,
            step_x = simplification.x,
            step_y = simplification.y,
            columns = topology.columns,
            rows = topology.rows,
            triangles = topology.triangle_count(),
            "Mesh topology rebuilt"
        );

        self.topology = Arc::new(topology);
        self.last = Some(key);
        TopologyChange::Rebuilt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_counts() {
        let mut generator = TopologyGenerator::new();
        assert_eq!(
            generator.rebuild(10, 7, SimplificationFactor::new(3.0, 2.0)),
            TopologyChange::Rebuilt
        );
        let topology = generator.topology();
        assert_eq!(topology.columns(), 4);
        assert_eq!(topology.rows(), 4);
        assert_eq!(topology.vertex_count(), 16);
        assert_eq!(topology.triangle_count(), 2 * 3 * 3);
    }

    #[test]
    fn test_winding() {
        let mut generator = TopologyGenerator::new();
        generator.rebuild(2, 2, SimplificationFactor::default());
        let triangles: Vec<[u32; 3]> = generator.topology().triangles().collect();
        // current, right, down / diagonal, down, right
        assert_eq!(triangles, vec![[0, 1, 2], [3, 2, 1]]);
    }

    #[test]
    fn test_vertex_positions_follow_step() {
        let mut generator = TopologyGenerator::new();
        generator.rebuild(5, 3, SimplificationFactor::new(2.0, 2.0));
        let topology = generator.topology();
        assert_eq!(topology.columns(), 3);
        assert_eq!(topology.vertices()[1], Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(topology.vertices()[4], Vec3::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn test_fractional_step() {
        let mut generator = TopologyGenerator::new();
        generator.rebuild(4, 4, SimplificationFactor::new(1.5, 1.0));
        assert_eq!(generator.topology().columns(), 3);
        assert_eq!(generator.topology().vertices()[2].x, 3.0);
    }

    #[test]
    fn test_colors_placeholder() {
        let mut generator = TopologyGenerator::new().with_colors(true);
        generator.rebuild(3, 3, SimplificationFactor::default());
        let colors = generator.topology().colors().unwrap();
        assert_eq!(colors.len(), 9);
        assert!(colors.iter().all(|c| *c == Vec4::ONE));
    }

    #[test]
    fn test_toggling_colors_regenerates() {
        let mut generator = TopologyGenerator::new();
        generator.rebuild(3, 3, SimplificationFactor::default());
        generator.set_colors_enabled(true);
        assert_eq!(
            generator.rebuild(3, 3, SimplificationFactor::default()),
            TopologyChange::Rebuilt
        );
        assert!(generator.topology().colors().is_some());
    }

    #[test]
    fn test_empty_dimensions() {
        let mut generator = TopologyGenerator::new();
        generator.rebuild(0, 480, SimplificationFactor::default());
        assert!(generator.topology().is_empty());
        assert_eq!(generator.topology().triangle_count(), 0);
    }

    #[test]
    fn test_grid_beyond_index_range_rejected() {
        assert_eq!(
            grid_size(640, 480, SimplificationFactor::uniform(1e-6)),
            None
        );
        assert_eq!(
            grid_size(640, 480, SimplificationFactor::uniform(0.5)),
            Some((1280, 960))
        );
    }

    #[test]
    fn test_shared_topology_survives_rebuild() {
        let mut generator = TopologyGenerator::new();
        generator.rebuild(8, 8, SimplificationFactor::default());
        let shared = generator.shared();
        generator.rebuild(16, 16, SimplificationFactor::default());
        assert_eq!(shared.vertex_count(), 64);
        assert_eq!(generator.topology().vertex_count(), 256);
    }

    #[test]
    fn test_single_column_has_no_triangles() {
        let mut generator = TopologyGenerator::new();
        generator.rebuild(4, 4, SimplificationFactor::new(8.0, 1.0));
        assert_eq!(generator.topology().columns(), 1);
        assert_eq!(generator.topology().triangle_count(), 0);
    }
}
