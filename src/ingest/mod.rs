// SPDX-License-Identifier: GPL-3.0-only

//! Depth and color frame ingest
//!
//! Frames arrive from the acquisition collaborator and are replaced wholesale
//! every frame. Downstream stages share them read-only through `Arc`.

pub mod visualization;

use crate::constants::{self, kinect};
use crate::errors::{RenderError, RenderResult};
use glam::Vec2;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Encoding of incoming 16-bit depth samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepthFormat {
    /// Range samples stored as-is (millimeters from native depth backends)
    #[default]
    Millimeters,
    /// 10-bit disparity shifted to 16-bit (Kinect Y10B), converted at ingest
    Disparity16,
}

/// Convert one Kinect disparity sample to millimeters (0 = invalid)
pub fn disparity_to_mm(raw: u16) -> u16 {
    if raw >= constants::DISPARITY_INVALID {
        return constants::DEPTH_INVALID;
    }
    let disparity = (raw >> 6) as f32;
    let denom = disparity * kinect::DEPTH_COEFF_A + kinect::DEPTH_COEFF_B;
    if denom <= constants::DISPARITY_MIN_DENOMINATOR {
        return constants::DEPTH_INVALID;
    }
    let mm = 1000.0 / denom;
    if mm >= constants::DEPTH_MAX_VALID_MM as f32 {
        return constants::DEPTH_INVALID;
    }
    mm as u16
}

/// One frame of 16-bit range samples
#[derive(Debug, Clone, PartialEq)]
pub struct DepthFrame {
    width: u32,
    height: u32,
    samples: Vec<u16>,
    units_per_sample: f32,
}

impl DepthFrame {
    /// Wrap row-major samples; the count must equal `width * height`
    pub fn new(width: u32, height: u32, samples: Vec<u16>) -> RenderResult<Self> {
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(RenderError::InvalidParameter(format!(
                "depth frame {}x{} expects {} samples, got {}",
                width,
                height,
                expected,
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            samples,
            units_per_sample: 1.0,
        })
    }

    /// Frame with every sample set to `value`
    pub fn filled(width: u32, height: u32, value: u16) -> Self {
        Self {
            width,
            height,
            samples: vec![value; width as usize * height as usize],
            units_per_sample: 1.0,
        }
    }

    /// Decode samples in the given device format
    pub fn from_format(
        width: u32,
        height: u32,
        raw: &[u16],
        format: DepthFormat,
    ) -> RenderResult<Self> {
        let samples = match format {
            DepthFormat::Millimeters => raw.to_vec(),
            DepthFormat::Disparity16 => raw.iter().map(|&d| disparity_to_mm(d)).collect(),
        };
        Self::new(width, height, samples)
    }

    /// Decode a native-endian byte buffer straight from a driver
    pub fn from_ne_bytes(width: u32, height: u32, bytes: &[u8]) -> RenderResult<Self> {
        if bytes.len() % 2 != 0 {
            return Err(RenderError::InvalidParameter(format!(
                "depth buffer length {} is not a whole number of 16-bit samples",
                bytes.len()
            )));
        }
        let samples: Vec<u16> = bytemuck::pod_collect_to_vec(bytes);
        Self::new(width, height, samples)
    }

    /// Set the multiplier that maps stored samples to clip-distance units
    pub fn with_units_per_sample(mut self, units_per_sample: f32) -> RenderResult<Self> {
        if !units_per_sample.is_finite() || units_per_sample <= 0.0 {
            return Err(RenderError::InvalidParameter(format!(
                "units per sample must be positive, got {}",
                units_per_sample
            )));
        }
        self.units_per_sample = units_per_sample;
        Ok(self)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn units_per_sample(&self) -> f32 {
        self.units_per_sample
    }

    /// Stored sample, None outside the frame
    #[inline]
    pub fn raw_at(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.samples[y as usize * self.width as usize + x as usize])
    }

    /// Sample scaled to clip-distance units, None outside the frame
    #[inline]
    pub fn depth_at(&self, x: u32, y: u32) -> Option<f32> {
        self.raw_at(x, y)
            .map(|raw| raw as f32 * self.units_per_sample)
    }
}

/// Color image registered (through calibration) to the depth frame
#[derive(Debug, Clone, PartialEq)]
pub struct ColorFrame {
    image: RgbaImage,
}

impl ColorFrame {
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Wrap packed RGBA bytes
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> RenderResult<Self> {
        let len = rgba.len();
        RgbaImage::from_raw(width, height, rgba)
            .map(Self::from_image)
            .ok_or_else(|| {
                RenderError::InvalidParameter(format!(
                    "color frame {}x{} cannot hold {} RGBA bytes",
                    width, height, len
                ))
            })
    }

    /// Wrap packed RGB bytes, adding an opaque alpha channel
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> RenderResult<Self> {
        Self::from_rgba(width, height, visualization::rgb_to_rgba(rgb))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Texture dimensions as used by the projection math
    pub fn dimensions(&self) -> Vec2 {
        Vec2::new(self.image.width() as f32, self.image.height() as f32)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Nearest texel at a pixel-space texture coordinate, clamped to the edge
    pub fn sample(&self, tex_coord: Vec2) -> [u8; 4] {
        if self.image.width() == 0 || self.image.height() == 0 {
            return [0, 0, 0, 0];
        }
        let max_x = (self.image.width() - 1) as f32;
        let max_y = (self.image.height() - 1) as f32;
        // NaN clamps to 0 through the float-to-int cast
        let x = tex_coord.x.floor().clamp(0.0, max_x) as u32;
        let y = tex_coord.y.floor().clamp(0.0, max_y) as u32;
        self.image.get_pixel(x, y).0
    }
}
