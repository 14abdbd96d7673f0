// SPDX-License-Identifier: GPL-3.0-only

//! RGB-D mesh reprojection
//!
//! Turns a depth-camera stream plus an optionally registered color image into
//! a textured point cloud or triangle mesh.
//!
//! # Architecture
//!
//! - [`calibration`]: depth/color intrinsics, extrinsics, distortion and clips
//! - [`ingest`]: depth and color frame containers plus depth visualization
//! - [`mesh`]: static grid topology over the depth image
//! - [`reproject`]: per-vertex validity, back-projection and texture lookup
//! - [`render`]: bind/draw/unbind renderer and the software compositor
//! - [`config`]: persisted renderer settings
//!
//! # Example
//!
//! ```no_run
//! use rgbd_mesh::{DepthFrame, DrawMode, RgbdRenderer};
//!
//! let mut renderer = RgbdRenderer::new();
//! renderer.set_depth_only(true);
//! renderer.provide_depth_frame(DepthFrame::filled(640, 480, 1000));
//! let output = renderer.render_frame(DrawMode::Points)?;
//! println!("{} points", output.primitive_count());
//! # Ok::<(), rgbd_mesh::RenderError>(())
//! ```

pub mod calibration;
pub mod config;
pub mod constants;
pub mod errors;
pub mod ingest;
pub mod mesh;
pub mod render;
pub mod reproject;

// Re-export commonly used types
pub use calibration::{CalibrationModel, CalibrationParameters};
pub use config::Config;
pub use errors::{ProtocolError, RenderError, RenderResult};
pub use ingest::{ColorFrame, DepthFormat, DepthFrame};
pub use mesh::{MeshTopology, SimplificationFactor, TopologyChange};
pub use render::{DrawMode, DrawOutput, RgbdRenderer, ViewParams};
