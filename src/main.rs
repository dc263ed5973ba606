mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use eframe::egui;

use app::CareMapApp;
use caremap::AppConfig;
use state::AppState;

/// Interactive map of primary care facilities.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Facility table to open at startup (.xlsx, .csv, .json, .parquet).
    data: Option<PathBuf>,

    /// GeoJSON file with district boundaries for the overlay.
    #[arg(long)]
    boundary: Option<PathBuf>,

    /// JSON configuration file (column names, matching, colours).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };

    let mut state = AppState::new(config);
    if let Some(path) = &args.data {
        if let Err(e) = state.load_data(path) {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
    if let Some(path) = &args.boundary {
        state.load_boundary(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Primary Care Sites – Facility Map",
        options,
        Box::new(|_cc| Ok(Box::new(CareMapApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
    .context("running the viewer")
}
