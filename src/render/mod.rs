// SPDX-License-Identifier: GPL-3.0-only

//! Renderer state machine, draw modes and the software compositor

pub mod compositor;
pub mod diagnostics;
mod draw;
mod renderer;
pub mod transform;

pub use compositor::{Compositor, ViewParams};
pub use diagnostics::RenderDiagnostics;
pub use draw::{DrawMode, DrawOutput, DrawVertex, assemble_primitives};
pub use renderer::RgbdRenderer;
pub use transform::{TransformStack, bind_transform};
