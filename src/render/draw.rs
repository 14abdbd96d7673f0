// SPDX-License-Identifier: GPL-3.0-only

//! Draw modes and primitive assembly
//!
//! Invalid vertices stay in the vertex list (the mesh is static) but never
//! appear in the primitive list of any mode.

use crate::mesh::MeshTopology;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mesh presentation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawMode {
    /// Vertices only
    Points,
    /// Triangle edges
    Wireframe,
    /// Filled triangles
    #[default]
    Filled,
}

impl DrawMode {
    pub const ALL: [DrawMode; 3] = [DrawMode::Points, DrawMode::Wireframe, DrawMode::Filled];

    /// Indices per primitive
    pub fn primitive_size(&self) -> usize {
        match self {
            DrawMode::Points => 1,
            DrawMode::Wireframe => 2,
            DrawMode::Filled => 3,
        }
    }
}

impl fmt::Display for DrawMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawMode::Points => write!(f, "points"),
            DrawMode::Wireframe => write!(f, "wireframe"),
            DrawMode::Filled => write!(f, "filled"),
        }
    }
}

impl FromStr for DrawMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "points" | "point" => Ok(DrawMode::Points),
            "wireframe" | "wire" | "lines" => Ok(DrawMode::Wireframe),
            "filled" | "fill" | "faces" => Ok(DrawMode::Filled),
            other => Err(format!(
                "unknown draw mode '{}', expected points, wireframe or filled",
                other
            )),
        }
    }
}

/// One vertex as handed to the compositor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawVertex {
    /// Position after the bound model transform
    pub position: Vec3,
    pub color: [u8; 4],
    pub valid: bool,
}

/// Everything one draw call produced
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOutput {
    pub mode: DrawMode,
    /// Every topology vertex, in topology order
    pub vertices: Vec<DrawVertex>,
    /// Primitive indices into `vertices`, grouped by `mode.primitive_size()`
    pub indices: Vec<u32>,
    /// Whether colors were sampled from the color texture
    pub uses_texture: bool,
}

impl DrawOutput {
    pub fn valid_vertex_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.valid).count()
    }

    pub fn primitive_count(&self) -> usize {
        self.indices.len() / self.mode.primitive_size()
    }

    /// Iterate primitives as index slices
    pub fn primitives(&self) -> impl Iterator<Item = &[u32]> + '_ {
        self.indices.chunks_exact(self.mode.primitive_size())
    }
}

/// Build the primitive index list for a mode from per-vertex validity
pub fn assemble_primitives(mode: DrawMode, topology: &MeshTopology, valid: &[bool]) -> Vec<u32> {
    let is_valid = |i: u32| valid.get(i as usize).copied().unwrap_or(false);

    match mode {
        DrawMode::Points => (0..valid.len() as u32).filter(|&i| is_valid(i)).collect(),
        DrawMode::Wireframe => {
            let mut edges: Vec<(u32, u32)> = Vec::with_capacity(topology.indices().len());
            for [a, b, c] in topology.triangles() {
                for (p, q) in [(a, b), (b, c), (c, a)] {
                    if is_valid(p) && is_valid(q) {
                        edges.push((p.min(q), p.max(q)));
                    }
                }
            }
            // Neighboring triangles share edges
            edges.sort_unstable();
            edges.dedup();
            edges.into_iter().flat_map(|(p, q)| [p, q]).collect()
        }
        DrawMode::Filled => topology
            .triangles()
            .filter(|t| t.iter().all(|&i| is_valid(i)))
            .flatten()
            .collect(),
    }
}
