//! Cache capacity and line size inference via random pointer chasing
//!
//! Every (working-set length, stride) pair gets a fresh page-aligned buffer linked into a
//! single random cycle, which defeats spatial and stride prefetchers. The per-access latency
//! of each pair, trimmed over many trials, is scanned for the jumps that mark a cache
//! level's capacity and its line size.

use cache_geometry_rs::affinity::prepare_measurement_thread;
use cache_geometry_rs::aggregate::collect_grid;
use cache_geometry_rs::config::Config;
use cache_geometry_rs::harness::Harness;
use cache_geometry_rs::heuristics::CacheGeometry;
use cache_geometry_rs::probe::DiscardSink;
use cache_geometry_rs::report::{write_estimate, write_report};
use log::{error, info};
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Instant;

// use faster/smaller `mimalloc` allocator
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::detect();
    info!(
        "Sweeping {} strides x {} lengths, {} trials, page size {}",
        config.stride_sizes.len(),
        config.length_sizes.len(),
        config.trials,
        config.page_size
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = write_estimate(&mut out, config.estimated_runtime()).and_then(|_| out.flush()) {
        error!("Couldn't write to stdout: {}", e);
        return ExitCode::FAILURE;
    }

    prepare_measurement_thread(config.cpu_core);

    let start = Instant::now();
    let mut harness = Harness::new(config.page_size, DiscardSink::default());
    let grid = match collect_grid(
        &mut harness,
        &config.stride_sizes,
        &config.length_sizes,
        config.trials,
    ) {
        Ok(grid) => grid,
        Err(e) => {
            error!("Measurement aborted: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Measurements completed in {:?}", start.elapsed());

    let geometry = CacheGeometry::infer(&grid, &config.stride_sizes, &config.length_sizes);
    if let Err(e) = write_report(
        &mut out,
        &config.stride_sizes,
        &config.length_sizes,
        &grid,
        &geometry,
    ) {
        error!("Couldn't write to stdout: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
