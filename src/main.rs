// Click to place vertices over the background, close shapes into polygons,
// press E to write one PNG mask per polygon (plus their union).
// • Left click near the first vertex, or N, closes the polygon.
// • R clears everything. ESC quits.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use polygon_mask::app;
use polygon_mask::config::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "polygon-mask", version, about = "Draw polygons and export binary masks")]
struct Args {
    /// TOML config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Background image shown under the polygons
    #[arg(long)]
    background: Option<PathBuf>,

    #[arg(long)]
    canvas_width: Option<usize>,
    #[arg(long)]
    canvas_height: Option<usize>,

    /// Width of exported masks
    #[arg(long)]
    raster_width: Option<usize>,
    /// Height of exported masks
    #[arg(long)]
    raster_height: Option<usize>,

    /// Distance to the first vertex that closes a polygon
    #[arg(long)]
    close_threshold: Option<f32>,

    /// Directory for exported PNG masks
    #[arg(long, short)]
    out: Option<PathBuf>,

    /// Export vertices in canvas coordinates instead of rescaling to the raster
    #[arg(long)]
    no_scale: bool,

    #[arg(long, short)]
    verbose: bool,

    #[arg(long)]
    debug: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(v) = self.background {
            config.background = Some(v);
        }
        if let Some(v) = self.canvas_width {
            config.canvas_width = v;
        }
        if let Some(v) = self.canvas_height {
            config.canvas_height = v;
        }
        if let Some(v) = self.raster_width {
            config.raster_width = v;
        }
        if let Some(v) = self.raster_height {
            config.raster_height = v;
        }
        if let Some(v) = self.close_threshold {
            config.close_threshold = v;
        }
        if let Some(v) = self.out {
            config.output_dir = v;
        }
        if self.no_scale {
            config.scale_to_raster = false;
        }
        config.validate()?;
        Ok(config)
    }
}

/// `RUST_LOG` wins when set and parseable; otherwise -v/--debug pick the level.
fn log_filter(verbose: bool, debug: bool, rust_log: Option<&str>) -> EnvFilter {
    let level = if debug {
        tracing::Level::DEBUG
    } else if verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    match rust_log.filter(|s| !s.trim().is_empty()).map(EnvFilter::try_new) {
        Some(Ok(filter)) => filter,
        _ => EnvFilter::default().add_directive(level.into()),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(args.verbose, args.debug, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let config = args.into_config()?;
    tracing::debug!(?config, "starting");

    app::run(&config).context("polygon session failed")?;
    Ok(())
}
