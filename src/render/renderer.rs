// SPDX-License-Identifier: GPL-3.0-only

//! RGB-D mesh renderer
//!
//! Owns calibration, topology and the current frames, and drives one
//! bind/draw/unbind cycle per frame:
//!
//! ```text
//! provide_depth_frame ─► topology rebuild (no-op if unchanged)
//! bind   ─► snapshot parameters and topology, push model transform
//! draw   ─► reproject (parallel) ─► color ─► assemble primitives ─► composite
//! unbind ─► pop model transform
//! ```

use super::compositor::{Compositor, ViewParams};
use super::diagnostics::RenderDiagnostics;
use super::draw::{DrawMode, DrawOutput, DrawVertex, assemble_primitives};
use super::transform::{TransformStack, bind_transform};
use crate::calibration::{CalibrationModel, CalibrationParameters, PinholeIntrinsics};
use crate::errors::{ProtocolError, RenderError, RenderResult};
use crate::ingest::visualization::{DepthColormap, depth_color};
use crate::ingest::{ColorFrame, DepthFrame};
use crate::mesh::{MeshTopology, SimplificationFactor, TopologyChange, TopologyGenerator};
use crate::reproject::{ReprojectionParams, reproject_vertices};
use glam::{Mat4, Vec4};
use image::RgbaImage;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Frame inputs captured at bind time
#[derive(Debug, Clone)]
struct BoundFrame {
    depth: Arc<DepthFrame>,
    topology: Arc<MeshTopology>,
    /// Present only when the color path is active
    color: Option<Arc<ColorFrame>>,
    params: ReprojectionParams,
    colormap: DepthColormap,
}

#[derive(Debug, Clone, Default)]
enum RenderState {
    #[default]
    Unbound,
    Bound(BoundFrame),
}

/// Depth-to-mesh renderer with optional color texturing
#[derive(Debug, Default)]
pub struct RgbdRenderer {
    calibration: CalibrationModel,
    topology: TopologyGenerator,
    simplification: SimplificationFactor,
    depth_frame: Option<Arc<DepthFrame>>,
    color_frame: Option<Arc<ColorFrame>>,
    depth_only: bool,
    colormap: DepthColormap,
    transforms: TransformStack,
    state: RenderState,
    compositor: Option<Compositor>,
    generated_texture: Option<RgbaImage>,
}

impl RgbdRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    // Ingest

    /// Replace the current depth frame and refresh the topology for its size
    ///
    /// A bound frame keeps drawing the depth and topology it was bound with.
    pub fn provide_depth_frame(&mut self, frame: impl Into<Arc<DepthFrame>>) {
        let frame = frame.into();
        self.topology
            .rebuild(frame.width(), frame.height(), self.simplification);
        self.depth_frame = Some(frame);
    }

    pub fn provide_color_frame(&mut self, frame: impl Into<Arc<ColorFrame>>) {
        self.color_frame = Some(frame.into());
    }

    pub fn clear_color_frame(&mut self) {
        self.color_frame = None;
    }

    // Configuration

    /// Replace calibration; takes effect on the next bind
    pub fn set_calibration(&mut self, params: CalibrationParameters) -> RenderResult<()> {
        self.calibration.set(params)
    }

    pub fn clear_calibration(&mut self) {
        info!("Calibration cleared");
        self.calibration.clear();
    }

    /// Allow binding without calibration; the color path stays off
    pub fn set_depth_only(&mut self, depth_only: bool) {
        self.depth_only = depth_only;
    }

    pub fn set_colormap(&mut self, colormap: DepthColormap) {
        self.colormap = colormap;
    }

    /// Emit per-vertex color slots that modulate the sampled color
    pub fn set_vertex_colors(&mut self, enabled: bool) {
        self.topology.set_colors_enabled(enabled);
        self.refresh_topology();
    }

    /// Rasterize every draw into [`RgbdRenderer::generated_texture`]
    pub fn set_preview(&mut self, view: Option<ViewParams>) -> RenderResult<()> {
        self.compositor = view.map(Compositor::new).transpose()?;
        if self.compositor.is_none() {
            self.generated_texture = None;
        }
        Ok(())
    }

    /// Change the grid step; non-positive steps keep the current topology
    ///
    /// Without a depth frame the step is only stored and
    /// [`TopologyChange::Deferred`] is returned. While bound, the new grid
    /// takes effect on the next bind.
    pub fn set_simplification(&mut self, simplification: SimplificationFactor) -> TopologyChange {
        if !simplification.is_valid() {
            debug!(
                x = simplification.x,
                y = simplification.y,
                "Ignoring non-positive simplification"
            );
            return TopologyChange::Rejected;
        }
        self.simplification = simplification;
        self.refresh_topology()
    }

    fn refresh_topology(&mut self) -> TopologyChange {
        match &self.depth_frame {
            Some(frame) => self
                .topology
                .rebuild(frame.width(), frame.height(), self.simplification),
            None => TopologyChange::Deferred,
        }
    }

    // Bind / draw / unbind

    /// Enter the bound state for one frame
    ///
    /// Requires a depth frame and either a ready calibration or depth-only
    /// mode. On failure nothing changes.
    pub fn bind(&mut self) -> RenderResult<()> {
        if self.is_bound() {
            error!("Refusing to bind: renderer already bound");
            return Err(ProtocolError::AlreadyBound.into());
        }

        let Some(depth) = self.depth_frame.clone() else {
            error!("Refusing to bind: no depth frame provided");
            return Err(RenderError::MissingInput("no depth frame provided".to_string()));
        };

        let calibration = match self.calibration.ready_parameters() {
            Some(params) => params.clone(),
            None if self.depth_only => {
                warn!(
                    width = depth.width(),
                    height = depth.height(),
                    "No calibration, reprojecting with default depth intrinsics"
                );
                CalibrationParameters {
                    depth: PinholeIntrinsics::kinect_for_resolution(depth.width(), depth.height()),
                    ..Default::default()
                }
            }
            None => {
                error!("Refusing to bind: no calibration and depth-only mode not selected");
                return Err(RenderError::MissingCalibration);
            }
        };

        let topology = self.topology.shared();
        let simplification = topology.simplification();
        let mut params = ReprojectionParams::new(&calibration, simplification);
        let color = if self.depth_only {
            None
        } else {
            if self.color_frame.is_none() {
                debug!("No color frame, coloring vertices by depth");
            }
            self.color_frame.clone()
        };
        if let Some(frame) = &color {
            params = params.with_color_texture(&calibration, frame.dimensions());
        }

        self.transforms.push();
        self.transforms
            .apply(bind_transform(calibration.mirror, calibration.world_rotation));

        debug!(
            depth_width = depth.width(),
            depth_height = depth.height(),
            use_texture = params.uses_texture(),
            mirror = calibration.mirror,
            "Renderer bound"
        );
        self.state = RenderState::Bound(BoundFrame {
            depth,
            topology,
            color,
            params,
            colormap: self.colormap,
        });
        Ok(())
    }

    /// Reproject the bound frame and assemble primitives for `mode`
    pub fn draw(&mut self, mode: DrawMode) -> RenderResult<DrawOutput> {
        let RenderState::Bound(frame) = &self.state else {
            error!(%mode, "Refusing to draw: renderer not bound");
            return Err(ProtocolError::DrawWithoutBind.into());
        };

        let topology = frame.topology.as_ref();
        let results = reproject_vertices(topology, &frame.depth, &frame.params);

        let transform = self.transforms.current();
        let slots = topology.colors();
        let colormap = frame.colormap;
        let (near, far) = (frame.params.near_clip, frame.params.far_clip);

        let vertices: Vec<DrawVertex> = results
            .par_iter()
            .enumerate()
            .map(|(i, result)| {
                let base = match &frame.color {
                    Some(color) => color.sample(result.tex_coord),
                    None => depth_color(result.depth, near, far, colormap, false),
                };
                let color = match slots.and_then(|s| s.get(i)) {
                    Some(slot) => modulate(base, *slot),
                    None => base,
                };
                DrawVertex {
                    position: transform.transform_point3(result.position),
                    color,
                    valid: result.valid,
                }
            })
            .collect();

        let valid: Vec<bool> = vertices.iter().map(|v| v.valid).collect();
        let indices = assemble_primitives(mode, topology, &valid);
        let output = DrawOutput {
            mode,
            vertices,
            indices,
            uses_texture: frame.color.is_some(),
        };

        debug!(
            %mode,
            vertices = output.vertices.len(),
            valid = output.valid_vertex_count(),
            primitives = output.primitive_count(),
            "Frame drawn"
        );

        if let Some(compositor) = &self.compositor {
            self.generated_texture = Some(compositor.composite(&output));
        }

        Ok(output)
    }

    /// Leave the bound state and restore the previous model transform
    pub fn unbind(&mut self) -> RenderResult<()> {
        if !self.is_bound() {
            error!("Refusing to unbind: renderer not bound");
            return Err(ProtocolError::UnbindWithoutBind.into());
        }
        self.state = RenderState::Unbound;
        self.transforms.pop();
        Ok(())
    }

    /// One full bind/draw/unbind cycle
    pub fn render_frame(&mut self, mode: DrawMode) -> RenderResult<DrawOutput> {
        self.bind()?;
        let output = self.draw(mode);
        self.unbind()?;
        output
    }

    // Accessors

    pub fn topology(&self) -> &MeshTopology {
        self.topology.topology()
    }

    pub fn depth_frame(&self) -> Option<&Arc<DepthFrame>> {
        self.depth_frame.as_ref()
    }

    pub fn color_frame(&self) -> Option<&Arc<ColorFrame>> {
        self.color_frame.as_ref()
    }

    pub fn calibration(&self) -> &CalibrationModel {
        &self.calibration
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, RenderState::Bound(_))
    }

    pub fn depth_only(&self) -> bool {
        self.depth_only
    }

    pub fn simplification(&self) -> SimplificationFactor {
        self.simplification
    }

    /// Last composited preview, if a preview target is configured
    pub fn generated_texture(&self) -> Option<&RgbaImage> {
        self.generated_texture.as_ref()
    }

    /// Current model transform (identity while unbound)
    pub fn model_transform(&self) -> Mat4 {
        self.transforms.current()
    }

    pub fn diagnostics(&self) -> RenderDiagnostics {
        let mut diagnostics =
            RenderDiagnostics::from_parameters(self.calibration.parameters(), self.simplification);
        diagnostics.calibration_ready = self.calibration.is_ready();
        diagnostics.depth_only = self.depth_only;
        diagnostics.bound = self.is_bound();
        diagnostics.use_texture = match &self.state {
            RenderState::Bound(frame) => frame.params.uses_texture(),
            RenderState::Unbound => {
                !self.depth_only && self.calibration.is_ready() && self.color_frame.is_some()
            }
        };
        diagnostics.depth_dimensions = self.depth_frame.as_ref().map(|f| f.dimensions());
        diagnostics.color_dimensions = self
            .color_frame
            .as_ref()
            .map(|f| (f.width(), f.height()));
        diagnostics.vertex_count = self.topology().vertex_count();
        diagnostics.triangle_count = self.topology().triangle_count();
        diagnostics
    }
}

/// Multiply an RGBA8 color by a normalized per-vertex color
fn modulate(color: [u8; 4], slot: Vec4) -> [u8; 4] {
    let scaled = Vec4::from(color.map(f32::from)) * slot;
    scaled
        .to_array()
        .map(|c| c.round().clamp(0.0, 255.0) as u8)
}
