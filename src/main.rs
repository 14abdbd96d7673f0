// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use rgbd_mesh::DrawMode;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "rgbd-mesh")]
#[command(about = "Reproject depth camera frames into textured meshes")]
#[command(version = rgbd_mesh::constants::app_info::version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one depth frame (16-bit PNG) into a preview image
    Render {
        /// 16-bit grayscale depth image
        #[arg(short, long)]
        depth: PathBuf,

        /// Registered color image
        #[arg(short, long)]
        color: Option<PathBuf>,

        /// Configuration file (default: ~/.config/rgbd-mesh/config.json)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Draw mode: points, wireframe or filled
        #[arg(short, long)]
        mode: Option<DrawMode>,

        /// Grid step, either "N" or "X,Y"
        #[arg(short, long)]
        simplify: Option<String>,

        /// Render without calibration or color texture
        #[arg(long)]
        depth_only: bool,

        /// Output PNG path
        #[arg(short, long, default_value = "mesh.png")]
        output: PathBuf,

        /// Print the active parameters
        #[arg(long)]
        dump: bool,
    },

    /// Render a constant-depth frame with identity calibration
    Synthetic {
        #[arg(long, default_value = "640")]
        width: u32,

        #[arg(long, default_value = "480")]
        height: u32,

        /// Depth value of every sample
        #[arg(long, default_value = "1000")]
        depth: u16,

        #[arg(short, long, default_value = "points")]
        mode: DrawMode,

        /// Grid step, either "N" or "X,Y"
        #[arg(short, long)]
        simplify: Option<String>,

        /// Output PNG path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the parameters a configuration resolves to
    Params {
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Colorize a depth image
    Preview {
        /// 16-bit grayscale depth image
        #[arg(short, long)]
        depth: PathBuf,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        /// Grayscale instead of turbo
        #[arg(long)]
        grayscale: bool,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG to control log level, e.g. RUST_LOG=rgbd_mesh=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            depth,
            color,
            config,
            mode,
            simplify,
            depth_only,
            output,
            dump,
        } => cli::render(cli::RenderArgs {
            depth,
            color,
            config,
            mode,
            simplify,
            depth_only,
            output,
            dump,
        }),
        Commands::Synthetic {
            width,
            height,
            depth,
            mode,
            simplify,
            output,
        } => cli::synthetic(width, height, depth, mode, simplify.as_deref(), output),
        Commands::Params { config } => cli::params(config),
        Commands::Preview {
            depth,
            output,
            grayscale,
            config,
        } => cli::preview(depth, output, grayscale, config),
    }
}
