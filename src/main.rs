//! `compare-maps`: clip two rasters to a matching extent, write their
//! difference and a scatterplot of their pixel values.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use compare_maps::config::{
    parse_config_option, parse_plot_size, BoundaryMap, ClipperKind, CompareConfig, MapInput,
    PlotStyle, ProjectionPolicy, DEFAULT_CLIP_PROGRAM, DEFAULT_DRIVER,
};

#[derive(Parser, Debug)]
#[command(name = "compareMaps", bin_name = "compare-maps")]
#[command(about = "Clips maps to matching extent, generates a difference image, & generates a scatterplot.")]
struct Args {
    /// First map; its geotransform and projection are used for the difference map
    mappath1: PathBuf,

    /// Second map
    mappath2: PathBuf,

    /// Directory for clipped maps, the difference map and the scatterplot (created if absent)
    outputdir: PathBuf,

    /// Band of map #1
    #[arg(long = "map1_band", value_name = "B1", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    map1_band: u32,

    /// Band of map #2
    #[arg(long = "map2_band", value_name = "B2", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    map2_band: u32,

    /// Multiply each pixel in map1 by a scale factor
    #[arg(long = "map1_scale", value_name = "S1", default_value_t = 1.0, allow_negative_numbers = true)]
    map1_scale: f64,

    /// Multiply each pixel in map2 by a scale factor
    #[arg(long = "map2_scale", value_name = "S2", default_value_t = 1.0, allow_negative_numbers = true)]
    map2_scale: f64,

    /// Map to base boundaries on (1 or 2)
    #[arg(long = "boundarymap", value_name = "BM", default_value = "1")]
    boundarymap: BoundaryMap,

    /// Additional notes for meta.txt files
    #[arg(long = "meta", value_name = "TEXT")]
    meta: Option<String>,

    /// Clip implementation: `command` runs --clip-program, `window` clips in process
    #[arg(long, value_name = "KIND", default_value = "command", value_parser = ["command", "window"])]
    clipper: String,

    /// Program used by the `command` clipper
    #[arg(long = "clip-program", value_name = "PATH", default_value = DEFAULT_CLIP_PROGRAM)]
    clip_program: String,

    /// GDAL driver for the difference map
    #[arg(long, value_name = "NAME", default_value = DEFAULT_DRIVER)]
    driver: String,

    /// What to do when the maps' projections differ: off, warn or strict
    #[arg(long = "projection-check", value_name = "POLICY", default_value = "warn")]
    projection_check: ProjectionPolicy,

    /// Scatterplot size in pixels
    #[arg(long = "plot-size", value_name = "WxH", default_value = "800x600", value_parser = parse_plot_size)]
    plot_size: (u32, u32),

    /// Scatterplot marker radius in pixels
    #[arg(long = "point-size", value_name = "PX", default_value_t = 2)]
    point_size: u32,

    /// GDAL config option, may be repeated
    #[arg(long = "config", value_name = "KEY=VALUE")]
    config: Vec<String>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self, command_line: Vec<String>) -> Result<CompareConfig> {
        let clipper = match self.clipper.as_str() {
            "window" => ClipperKind::Window,
            _ => ClipperKind::Command {
                program: self.clip_program,
            },
        };
        let mut config = CompareConfig::new(
            MapInput::new(self.mappath1)
                .with_band(self.map1_band as usize)
                .with_scale(self.map1_scale),
            MapInput::new(self.mappath2)
                .with_band(self.map2_band as usize)
                .with_scale(self.map2_scale),
            self.outputdir,
        )
        .with_boundary(self.boundarymap)
        .with_clipper(clipper)
        .with_driver(self.driver)
        .with_projection_policy(self.projection_check)
        .with_command_line(command_line);

        config.plot = PlotStyle {
            width: self.plot_size.0,
            height: self.plot_size.1,
            point_size: self.point_size,
        };
        config.notes = self.meta;
        for option in &self.config {
            config.gdal_options.push(parse_config_option(option)?);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt().with_env_filter(filter).with_target(false).init();
    compare_maps::cpl::forward_to_tracing();

    let config = args.into_config(std::env::args().collect())?;
    let report = compare_maps::run(&config).context("map comparison failed")?;

    if let Some(stats) = report.stats {
        info!(
            min = stats.min,
            max = stats.max,
            mean = stats.mean,
            pixels = stats.valid,
            "Difference statistics"
        );
    }
    info!(
        difference = %report.difference.display(),
        metadata = %report.metadata.display(),
        scatter = %report.scatter.display(),
        "Done"
    );
    Ok(())
}
