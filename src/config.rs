// SPDX-License-Identifier: GPL-3.0-only

//! Persistent renderer configuration (JSON)

use crate::calibration::CalibrationParameters;
use crate::errors::{RenderError, RenderResult};
use crate::ingest::DepthFormat;
use crate::ingest::visualization::DepthColormap;
use crate::mesh::SimplificationFactor;
use crate::render::{DrawMode, RgbdRenderer, ViewParams};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory name under the user config dir
const CONFIG_DIR: &str = "rgbd-mesh";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sensor calibration; `None` until one has been captured
    pub calibration: Option<CalibrationParameters>,
    /// Grid step in depth pixels
    pub simplification: SimplificationFactor,
    /// Render geometry without a calibration or color texture
    pub depth_only: bool,
    /// Encoding of incoming depth samples
    pub depth_format: DepthFormat,
    /// Multiplier from raw samples to clip units
    pub units_per_sample: f32,
    /// Vertex coloring when no color texture is bound
    pub colormap: DepthColormap,
    pub draw_mode: DrawMode,
    /// Emit per-vertex color slots
    pub vertex_colors: bool,
    /// Software preview target
    pub preview: ViewParams,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calibration: None,
            simplification: SimplificationFactor::default(),
            depth_only: false,
            depth_format: DepthFormat::default(),
            units_per_sample: 1.0,
            colormap: DepthColormap::default(),
            draw_mode: DrawMode::default(),
            vertex_colors: false,
            preview: ViewParams::default(),
        }
    }
}

impl Config {
    /// Default location: `<config dir>/rgbd-mesh/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn load(path: &Path) -> RenderResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RenderError::Storage(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load from `path`, or the default location; a missing file yields defaults
    pub fn load_or_default(path: Option<&Path>) -> RenderResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => {
                    debug!("No config directory available, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    pub fn save(&self, path: &Path) -> RenderResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    pub fn validate(&self) -> RenderResult<()> {
        if let Some(calibration) = &self.calibration {
            calibration.validate()?;
        }
        if !self.units_per_sample.is_finite() || self.units_per_sample <= 0.0 {
            return Err(RenderError::Config(format!(
                "units_per_sample must be positive, got {}",
                self.units_per_sample
            )));
        }
        Ok(())
    }

    /// Renderer configured from this file; frames still have to be provided
    pub fn build_renderer(&self) -> RenderResult<RgbdRenderer> {
        let mut renderer = RgbdRenderer::new();
        if let Some(calibration) = &self.calibration {
            renderer.set_calibration(calibration.clone())?;
        }
        renderer.set_depth_only(self.depth_only);
        renderer.set_colormap(self.colormap);
        renderer.set_vertex_colors(self.vertex_colors);
        renderer.set_simplification(self.simplification);
        Ok(renderer)
    }
}
