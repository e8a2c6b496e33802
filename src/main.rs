//! Candy Dash - Halloween Candy Power Ranking Explorer
//!
//! Loads the candy ranking CSV once, then lets the user filter, rank and
//! compare candies in an egui dashboard.

mod charts;
mod config;
mod data;
mod gui;
mod stats;

use anyhow::Context;
use config::AppConfig;
use data::CandyLoader;
use eframe::egui;
use gui::CandyDashApp;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = AppConfig::load().context("loading configuration")?;

    // A missing or malformed dataset is fatal before any window opens.
    let mut loader = CandyLoader::new(&config.data_path);
    let dataset = loader
        .load()
        .with_context(|| format!("loading candy data from {}", loader.file_path().display()))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1500.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Candy Dash"),
        ..Default::default()
    };

    eframe::run_native(
        "Candy Dash",
        options,
        Box::new(move |cc| {
            let app = CandyDashApp::new(cc, dataset, config)?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("UI error: {e}"))
}
