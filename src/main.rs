mod app;
mod color;
mod config;
mod state;
mod ui;

use anyhow::{Context, Result};
use app::SnapshotApp;
use at_snapshot::SnapshotPipeline;
use clap::Parser;
use config::Args;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    if args.json {
        return print_json(&args);
    }

    let mut state = AppState::new(&args);
    state.reload();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "AT Market Snapshot",
        options,
        Box::new(|_cc| Ok(Box::new(SnapshotApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("dashboard window failed: {e}"))
}

fn init_logging(filter: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }
    builder.init();
}

/// Headless mode: run the pipeline once and print the report.
fn print_json(args: &Args) -> Result<()> {
    let report = SnapshotPipeline::new(args.scope())
        .run_path(&args.data, &args.sheets())
        .with_context(|| format!("building snapshot from {}", args.data.display()))?;
    let json = serde_json::to_string_pretty(&report).context("serializing snapshot")?;
    println!("{json}");
    Ok(())
}
