// SPDX-License-Identifier: GPL-3.0-only

//! Software compositor for draw output
//!
//! Rasterizes points, lines and triangles into an RGBA preview image with a
//! z-buffer. The view orbits around a pivot on the optical axis so the mesh
//! can be inspected from the side.

use super::draw::{DrawMode, DrawOutput, DrawVertex};
use crate::constants::kinect;
use crate::errors::{RenderError, RenderResult};
use glam::{Mat3, Vec2, Vec3};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Preview camera and target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewParams {
    pub width: u32,
    pub height: u32,
    /// Focal length of the preview camera (pixels)
    pub focal: f32,
    /// Orbit angle about the horizontal axis (degrees)
    pub pitch: f32,
    /// Orbit angle about the vertical axis (degrees)
    pub yaw: f32,
    /// Distance of the orbit pivot along the optical axis
    pub pivot_depth: f32,
    /// Side length of point splats (pixels)
    pub point_size: f32,
    pub background: [u8; 4],
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            width: kinect::BASE_WIDTH as u32,
            height: kinect::BASE_HEIGHT as u32,
            focal: kinect::FX,
            pitch: 0.0,
            yaw: 0.0,
            pivot_depth: 1500.0,
            point_size: 2.0,
            background: [0, 0, 0, 255],
        }
    }
}

impl ViewParams {
    pub fn validate(&self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidParameter(format!(
                "preview size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.focal.is_finite() || self.focal <= 0.0 {
            return Err(RenderError::InvalidParameter(format!(
                "preview focal length must be positive, got {}",
                self.focal
            )));
        }
        let angles_finite = [self.pitch, self.yaw, self.pivot_depth, self.point_size]
            .iter()
            .all(|v| v.is_finite());
        if !angles_finite {
            return Err(RenderError::InvalidParameter(
                "preview orbit parameters must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Vertex after view transform: screen position plus view depth
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    screen: Vec2,
    z: f32,
    color: [f32; 4],
}

struct Target {
    image: RgbaImage,
    depth: Vec<f32>,
}

impl Target {
    fn new(view: &ViewParams) -> Self {
        Self {
            image: RgbaImage::from_pixel(view.width, view.height, Rgba(view.background)),
            depth: vec![f32::INFINITY; view.width as usize * view.height as usize],
        }
    }

    fn plot(&mut self, x: i64, y: i64, z: f32, color: [f32; 4]) {
        let (width, height) = self.image.dimensions();
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            return;
        }
        let index = y as usize * width as usize + x as usize;
        if z >= self.depth[index] {
            return;
        }
        self.depth[index] = z;
        self.image
            .put_pixel(x as u32, y as u32, Rgba(color.map(|c| c.round().clamp(0.0, 255.0) as u8)));
    }
}

/// Rasterizes [`DrawOutput`]s for one preview configuration
#[derive(Debug, Clone)]
pub struct Compositor {
    view: ViewParams,
    orbit: Mat3,
    pivot: Vec3,
}

impl Compositor {
    pub fn new(view: ViewParams) -> RenderResult<Self> {
        view.validate()?;
        let orbit = Mat3::from_rotation_y(view.yaw.to_radians())
            * Mat3::from_rotation_x(view.pitch.to_radians());
        Ok(Self {
            view,
            orbit,
            pivot: Vec3::new(0.0, 0.0, view.pivot_depth),
        })
    }

    pub fn view(&self) -> &ViewParams {
        &self.view
    }

    /// Render the primitives of one draw into a new image
    pub fn composite(&self, output: &DrawOutput) -> RgbaImage {
        let mut target = Target::new(&self.view);
        let screen: Vec<Option<ScreenVertex>> =
            output.vertices.iter().map(|v| self.project(v)).collect();
        let fetch = |i: u32| screen.get(i as usize).copied().flatten();

        for primitive in output.primitives() {
            match output.mode {
                DrawMode::Points => {
                    if let Some(v) = fetch(primitive[0]) {
                        self.splat(&mut target, v);
                    }
                }
                DrawMode::Wireframe => {
                    if let (Some(a), Some(b)) = (fetch(primitive[0]), fetch(primitive[1])) {
                        line(&mut target, a, b);
                    }
                }
                DrawMode::Filled => {
                    if let (Some(a), Some(b), Some(c)) =
                        (fetch(primitive[0]), fetch(primitive[1]), fetch(primitive[2]))
                    {
                        triangle(&mut target, a, b, c);
                    }
                }
            }
        }

        target.image
    }

    /// Orbit about the pivot, then project; None behind the camera
    fn project(&self, vertex: &DrawVertex) -> Option<ScreenVertex> {
        let p = self.orbit * (vertex.position - self.pivot) + self.pivot;
        if p.z <= 0.0 || !p.is_finite() {
            return None;
        }
        let half = Vec2::new(self.view.width as f32, self.view.height as f32) / 2.0;
        let screen = half - self.view.focal * Vec2::new(p.x, p.y) / p.z;
        if !screen.is_finite() {
            return None;
        }
        Some(ScreenVertex {
            screen,
            z: p.z,
            color: vertex.color.map(f32::from),
        })
    }

    fn splat(&self, target: &mut Target, v: ScreenVertex) {
        let extent = self.view.point_size.max(1.0);
        let size = extent.round() as i64;
        let x0 = (v.screen.x - extent / 2.0).round() as i64;
        let y0 = (v.screen.y - extent / 2.0).round() as i64;
        for y in y0..y0 + size {
            for x in x0..x0 + size {
                target.plot(x, y, v.z, v.color);
            }
        }
    }
}

fn lerp_color(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    [0, 1, 2, 3].map(|i| a[i] + (b[i] - a[i]) * t)
}

/// Parametric range of the segment `a + t * (b - a)` inside `[min, max]`
fn clip_segment(a: Vec2, b: Vec2, min: Vec2, max: Vec2) -> Option<(f32, f32)> {
    let delta = b - a;
    let (mut t0, mut t1) = (0.0_f32, 1.0_f32);
    for (p, q) in [
        (-delta.x, a.x - min.x),
        (delta.x, max.x - a.x),
        (-delta.y, a.y - min.y),
        (delta.y, max.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

fn line(target: &mut Target, a: ScreenVertex, b: ScreenVertex) {
    let (width, height) = target.image.dimensions();
    // One pixel of slack so endpoints on the border still round inside
    let min = Vec2::splat(-1.0);
    let max = Vec2::new(width as f32 + 1.0, height as f32 + 1.0);
    let Some((t0, t1)) = clip_segment(a.screen, b.screen, min, max) else {
        return;
    };

    let full = b.screen - a.screen;
    let start = a.screen + full * t0;
    let delta = full * t1 - full * t0;
    let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0);
    for i in 0..=steps as i64 {
        let p = start + delta * i as f32 / steps;
        let t = t0 + (t1 - t0) * i as f32 / steps;
        target.plot(
            p.x.floor() as i64,
            p.y.floor() as i64,
            a.z + (b.z - a.z) * t,
            lerp_color(a.color, b.color, t),
        );
    }
}

#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)
}

/// Two-sided barycentric fill
fn triangle(target: &mut Target, a: ScreenVertex, b: ScreenVertex, c: ScreenVertex) {
    let area = edge(a.screen, b.screen, c.screen);
    if area.abs() < f32::EPSILON {
        return;
    }

    let (width, height) = target.image.dimensions();
    let min = a.screen.min(b.screen).min(c.screen).floor().max(Vec2::ZERO);
    let max = a
        .screen
        .max(b.screen)
        .max(c.screen)
        .ceil()
        .min(Vec2::new(width as f32, height as f32));

    for y in min.y as i64..max.y as i64 {
        for x in min.x as i64..max.x as i64 {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let wa = edge(b.screen, c.screen, p) / area;
            let wb = edge(c.screen, a.screen, p) / area;
            let wc = edge(a.screen, b.screen, p) / area;
            if wa < 0.0 || wb < 0.0 || wc < 0.0 {
                continue;
            }
            let z = wa * a.z + wb * b.z + wc * c.z;
            let color = [0, 1, 2, 3].map(|i| wa * a.color[i] + wb * b.color[i] + wc * c.color[i]);
            target.plot(x, y, z, color);
        }
    }
}
