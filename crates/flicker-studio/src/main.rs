//! Grid flicker eye test.
//!
//! A checkerboard that swaps its two colors at a configurable rate, throttled by
//! the engine's frame governor on top of the display refresh.

mod app;
mod controls;
mod error;
mod grid;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;

use flicker_engine::device::GpuInit;
use flicker_engine::logging::{init_logging, LoggingConfig};
use flicker_engine::window::Runtime;

use crate::app::EyeTest;
use crate::settings::{Cli, Settings};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(match cli.log.clone() {
        Some(filter) => LoggingConfig::with_filter(filter),
        None => LoggingConfig::default(),
    });

    let settings = Settings::load(&cli).context("invalid settings")?;
    let grid = &settings.grid;
    log::info!(
        "fps {} | grid {}x{} cells of {}px | colors {} / {} | host {} Hz ({})",
        settings.fps,
        grid.cols,
        grid.rows,
        grid.cell_size,
        grid.color1,
        grid.color2,
        settings.host.refresh_rate,
        if settings.host.measure { "measured" } else { "fixed" }
    );
    log::info!("keys: up/down fps (shift x10), left/right cols, pgup/pgdn rows, x/z cell size, 1/2 colors, space pause, esc quit");

    let app = EyeTest::new(&settings);
    let config = app.runtime_config();

    Runtime::run(config, GpuInit::default(), app)
}
