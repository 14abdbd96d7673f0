// SPDX-License-Identifier: GPL-3.0-only

//! Mesh topology generation for depth visualization
//!
//! Uses grid-based triangulation over the depth image at a configurable
//! decimation step. Depth discontinuities are handled later, per frame, by
//! the reprojection validity test.

mod topology;

pub use topology::{MeshTopology, SimplificationFactor, TopologyChange, TopologyGenerator};
