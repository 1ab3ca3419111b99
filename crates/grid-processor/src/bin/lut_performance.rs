//! Compare look-up table and local-search indexing on a synthetic swath.
//!
//! Builds a curved swath grid, then maps several output tiles with both
//! curvilinear index modes and reports build and mapping times.
//!
//! Run with: cargo run --release --bin lut-performance -- --ni 2000 --nj 1000

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use grid_common::{BoundingBox, CrsCode, OutputGrid};
use grid_index::{CurvilinearIndexMode, HorizontalIndex, LookupTable, SourceGrid};
use grid_processor::{GridProcessorConfig, PixelMapper};
use projection::CrsTransform;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "lut-performance")]
#[command(about = "Compare look-up table and local-search indexing on a synthetic swath")]
struct Args {
    /// Swath points across track
    #[arg(long, default_value = "1000")]
    ni: usize,

    /// Swath scan lines
    #[arg(long, default_value = "500")]
    nj: usize,

    /// Point spacing in degrees
    #[arg(long, default_value = "0.02")]
    spacing: f64,

    /// Output tile size in pixels (square)
    #[arg(long, default_value = "256")]
    tile_size: usize,

    /// Mapping iterations per tile
    #[arg(long, default_value = "5")]
    iterations: u32,

    /// Look-up table oversampling (defaults to RESAMPLE_LUT_OVERSAMPLING)
    #[arg(long, env = "RESAMPLE_LUT_OVERSAMPLING")]
    oversampling: Option<f64>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt().with_env_filter(filter).with_target(true).init();

    let mut config = GridProcessorConfig::from_env();
    if let Some(oversampling) = args.oversampling {
        config.lut_oversampling = oversampling;
    }
    config.validate().map_err(anyhow::Error::msg)?;
    info!(config = %serde_json::to_string(&config)?, "Configuration loaded");

    info!(ni = args.ni, nj = args.nj, spacing = args.spacing, "Generating swath");
    let grid = swath(args.ni, args.nj, args.spacing).context("building swath grid")?;
    let SourceGrid::Curvilinear(curvilinear) = &grid else {
        anyhow::bail!("swath grid is not curvilinear");
    };

    let start = Instant::now();
    let lut_index = HorizontalIndex::build(&grid, &config.index_options())
        .context("building look-up table")?;
    let lut_build_ms = start.elapsed().as_millis();
    let resolution = LookupTable::suggested_resolution(curvilinear, config.lut_oversampling)?;

    let mut local_options = config.index_options();
    local_options.curvilinear = CurvilinearIndexMode::LocalSearch;
    let local_index = HorizontalIndex::build(&grid, &local_options)?;

    println!("LUT Performance Test");
    println!("====================\n");
    println!(
        "Swath: {} x {} points, LUT resolution {:.4} deg, built in {} ms\n",
        args.ni, args.nj, resolution, lut_build_ms
    );

    let half_width = args.ni as f64 * args.spacing / 2.0;
    let length = args.nj as f64 * args.spacing;
    let tiles = [
        ("centre", 0.0, length * 0.5, half_width * 0.5),
        ("start", 0.0, length * 0.1, half_width * 0.3),
        ("edge", half_width * 0.8, length * 0.5, half_width * 0.4),
        ("whole", 0.0, length * 0.5, half_width.max(length * 0.6)),
    ];

    let transform = CrsTransform::to_geographic(CrsCode::Epsg4326);

    println!("{:-<78}", "");
    println!(
        "{:<10} {:>12} {:>12} {:>10} {:>14} {:>14}",
        "Tile", "LUT", "Local", "Speedup", "Mapped (LUT)", "Mapped (Local)"
    );
    println!("{:-<78}", "");

    for (name, centre_lon, centre_lat, half) in tiles {
        let bbox = BoundingBox::new(
            centre_lon - half,
            centre_lat - half,
            centre_lon + half,
            centre_lat + half,
        );
        let output = OutputGrid::new(CrsCode::Epsg4326, args.tile_size, args.tile_size, bbox)?;

        let (lut_us, lut_mapped) =
            time_mapping(&output, &lut_index, &transform, &config, args.iterations);
        let (local_us, local_mapped) =
            time_mapping(&output, &local_index, &transform, &config, args.iterations);

        println!(
            "{:<10} {:>9} µs {:>9} µs {:>9.1}x {:>14} {:>14}",
            name,
            lut_us,
            local_us,
            local_us as f64 / lut_us.max(1) as f64,
            lut_mapped,
            local_mapped
        );
    }

    println!("{:-<78}", "");
    Ok(())
}

fn time_mapping(
    output: &OutputGrid,
    index: &HorizontalIndex,
    transform: &CrsTransform,
    config: &GridProcessorConfig,
    iterations: u32,
) -> (u128, usize) {
    let mapper =
        PixelMapper::for_output(index, transform, output).with_parallel(config.parallel_mapping);
    let iterations = iterations.max(1);
    let mut mapped = 0;
    let start = Instant::now();
    for _ in 0..iterations {
        mapped = mapper.map(output).mapped_pixel_count();
    }
    (start.elapsed().as_micros() / iterations as u128, mapped)
}

/// A swath bowing across track and drifting west along track, centred on
/// longitude 0.
fn swath(ni: usize, nj: usize, spacing: f64) -> Result<SourceGrid> {
    let ci = (ni as f64 - 1.0) / 2.0;
    let mut lon = Vec::with_capacity(ni * nj);
    let mut lat = Vec::with_capacity(ni * nj);
    for j in 0..nj {
        for i in 0..ni {
            let across = (i as f64 - ci) * spacing;
            let along = j as f64 * spacing;
            lon.push(across - 0.15 * along + 0.15 * nj as f64 * spacing / 2.0);
            lat.push(along + 0.002 * across * across / spacing);
        }
    }
    Ok(SourceGrid::curvilinear(ni, nj, lon, lat)?)
}
