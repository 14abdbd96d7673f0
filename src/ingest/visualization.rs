// SPDX-License-Identifier: GPL-3.0-only

//! Depth visualization helpers
//!
//! Provides functions for converting depth data to viewable formats:
//! - Turbo colormap (blue=near, red=far)
//! - Grayscale (bright=near, dark=far)
//! - RGB to RGBA conversion
//!
//! The same colors shade reprojected vertices when no color texture is bound.

use super::DepthFrame;
use crate::constants::DEPTH_COLORMAP_BANDS;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Color ramp used for depth shading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepthColormap {
    #[default]
    Turbo,
    Grayscale,
}

/// Turbo colormap: perceptually uniform rainbow (blue=near, red=far)
///
/// Based on: https://ai.googleblog.com/2019/08/turbo-improved-rainbow-colormap-for.html
/// Simplified version with polynomial approximation.
#[inline]
fn turbo(t: f32) -> [u8; 4] {
    let r = (0.13572138
        + t * (4.6153926 + t * (-42.66032 + t * (132.13108 + t * (-152.54825 + t * 59.28144)))))
        .clamp(0.0, 1.0);
    let g = (0.09140261
        + t * (2.19418 + t * (4.84296 + t * (-14.18503 + t * (4.27805 + t * 2.53377)))))
        .clamp(0.0, 1.0);
    let b = (0.1066733
        + t * (12.64194 + t * (-60.58204 + t * (109.99648 + t * (-82.52904 + t * 20.43388)))))
        .clamp(0.0, 1.0);
    [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8, 255]
}

/// Color for a single depth value within `[near, far]`
///
/// Depths outside the range (including 0) are black.
pub fn depth_color(
    depth: f32,
    near: f32,
    far: f32,
    colormap: DepthColormap,
    quantize: bool,
) -> [u8; 4] {
    if depth <= 0.0 || depth < near || depth > far || far <= near {
        return [0, 0, 0, 255];
    }

    // Normalize to 0.0-1.0 range (near=0.0, far=1.0)
    let mut t = ((depth - near) / (far - near)).clamp(0.0, 1.0);
    if quantize {
        t = (t * DEPTH_COLORMAP_BANDS).floor() / DEPTH_COLORMAP_BANDS;
    }

    match colormap {
        DepthColormap::Turbo => turbo(t),
        DepthColormap::Grayscale => {
            let gray = ((1.0 - t) * 255.0) as u8;
            [gray, gray, gray, 255]
        }
    }
}

/// Render a whole depth frame as an RGBA preview image
pub fn depth_to_rgba(
    frame: &DepthFrame,
    near: f32,
    far: f32,
    colormap: DepthColormap,
    quantize: bool,
) -> RgbaImage {
    let scale = frame.units_per_sample();
    let mut rgba = Vec::with_capacity(frame.samples().len() * 4);
    for &raw in frame.samples() {
        let color = depth_color(raw as f32 * scale, near, far, colormap, quantize);
        rgba.extend_from_slice(&color);
    }
    RgbaImage::from_raw(frame.width(), frame.height(), rgba)
        .unwrap_or_else(|| RgbaImage::new(frame.width(), frame.height()))
}

/// Convert RGB pixel data to RGBA (add alpha channel)
pub fn rgb_to_rgba(rgb: &[u8]) -> Vec<u8> {
    let pixel_count = rgb.len() / 3;
    let mut rgba = Vec::with_capacity(pixel_count * 4);
    for chunk in rgb.chunks_exact(3) {
        rgba.extend_from_slice(&[chunk[0], chunk[1], chunk[2], 255]);
    }
    rgba
}
