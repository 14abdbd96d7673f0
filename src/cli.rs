// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Rendering a depth (and optional color) image into a mesh preview
//! - Running a synthetic constant-depth frame end to end
//! - Printing the parameters a configuration resolves to
//! - Colorizing a depth image

use rgbd_mesh::calibration::CalibrationParameters;
use rgbd_mesh::ingest::visualization::{DepthColormap, depth_to_rgba};
use rgbd_mesh::render::DrawOutput;
use rgbd_mesh::{
    ColorFrame, Config, DepthFrame, DrawMode, RgbdRenderer, SimplificationFactor, ViewParams,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub struct RenderArgs {
    pub depth: PathBuf,
    pub color: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub mode: Option<DrawMode>,
    pub simplify: Option<String>,
    pub depth_only: bool,
    pub output: PathBuf,
    pub dump: bool,
}

/// Render one depth frame and write the composited preview
pub fn render(args: RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default(args.config.as_deref())?;
    if args.depth_only {
        config.depth_only = true;
    }
    if let Some(simplify) = args.simplify.as_deref() {
        config.simplification = parse_simplification(simplify)?;
    }
    let mode = args.mode.unwrap_or(config.draw_mode);

    let mut renderer = config.build_renderer()?;
    renderer.set_preview(Some(config.preview))?;

    let depth = load_depth(&args.depth, &config)?;
    println!(
        "Depth frame: {}x{} ({})",
        depth.width(),
        depth.height(),
        args.depth.display()
    );
    renderer.provide_depth_frame(depth);

    if let Some(path) = &args.color {
        let color = ColorFrame::from_image(image::open(path)?.to_rgba8());
        println!(
            "Color frame: {}x{} ({})",
            color.width(),
            color.height(),
            path.display()
        );
        renderer.provide_color_frame(color);
    }

    if args.dump {
        println!();
        println!("{}", renderer.diagnostics());
        println!();
    }

    let start = Instant::now();
    let output = renderer.render_frame(mode)?;
    print_summary(&output, start);

    save_preview(&renderer, &args.output)
}

/// Constant-depth frame through identity calibration
pub fn synthetic(
    width: u32,
    height: u32,
    depth: u16,
    mode: DrawMode,
    simplify: Option<&str>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let simplification = match simplify {
        Some(s) => parse_simplification(s)?,
        None => SimplificationFactor::default(),
    };

    let mut renderer = RgbdRenderer::new();
    renderer.set_calibration(CalibrationParameters::default())?;
    renderer.set_simplification(simplification);
    if output.is_some() {
        renderer.set_preview(Some(ViewParams {
            width,
            height,
            ..Default::default()
        }))?;
    }
    renderer.provide_depth_frame(DepthFrame::filled(width, height, depth));

    println!("Synthetic frame: {}x{} at depth {}", width, height, depth);
    println!(
        "Topology: {}x{} grid, {} triangles",
        renderer.topology().columns(),
        renderer.topology().rows(),
        renderer.topology().triangle_count()
    );

    let start = Instant::now();
    let result = renderer.render_frame(mode)?;
    print_summary(&result, start);

    match output {
        Some(path) => save_preview(&renderer, &path),
        None => Ok(()),
    }
}

/// Print the diagnostics dump for a configuration
pub fn params(config: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default(config.as_deref())?;
    let renderer = config.build_renderer()?;
    println!("{}", renderer.diagnostics());
    Ok(())
}

/// Colorize a depth image with the configured clip range
pub fn preview(
    depth: PathBuf,
    output: PathBuf,
    grayscale: bool,
    config: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default(config.as_deref())?;
    let frame = load_depth(&depth, &config)?;
    let calibration = config.calibration.unwrap_or_default();
    let colormap = if grayscale {
        DepthColormap::Grayscale
    } else {
        config.colormap
    };

    let image = depth_to_rgba(
        &frame,
        calibration.near_clip,
        calibration.far_clip,
        colormap,
        false,
    );
    ensure_parent(&output)?;
    image.save(&output)?;
    println!("Saved: {}", output.display());
    Ok(())
}

/// Load a 16-bit depth image and decode it per the configured format
fn load_depth(path: &Path, config: &Config) -> Result<DepthFrame, Box<dyn std::error::Error>> {
    let image = image::open(path)?.to_luma16();
    let (width, height) = image.dimensions();
    let frame = DepthFrame::from_format(width, height, image.as_raw(), config.depth_format)?
        .with_units_per_sample(config.units_per_sample)?;
    Ok(frame)
}

/// Parse "N" or "X,Y"
fn parse_simplification(value: &str) -> Result<SimplificationFactor, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let factor = match parts.as_slice() {
        [step] => SimplificationFactor::uniform(step.parse()?),
        [x, y] => SimplificationFactor::new(x.parse()?, y.parse()?),
        _ => return Err(format!("Invalid simplification '{}', expected N or X,Y", value).into()),
    };
    if !factor.is_valid() {
        return Err(format!("Simplification must be positive, got '{}'", value).into());
    }
    Ok(factor)
}

fn print_summary(output: &DrawOutput, start: Instant) {
    println!(
        "Mode: {}, vertices: {}, valid: {}, primitives: {}, textured: {}",
        output.mode,
        output.vertices.len(),
        output.valid_vertex_count(),
        output.primitive_count(),
        output.uses_texture
    );
    println!("Rendered in {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);
}

fn save_preview(renderer: &RgbdRenderer, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let texture = renderer
        .generated_texture()
        .ok_or("No preview was generated")?;
    ensure_parent(path)?;
    texture.save(path)?;
    println!("Saved: {}", path.display());
    Ok(())
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => std::fs::create_dir_all(parent),
        None => Ok(()),
    }
}
