//! OEE Production Dashboard - desktop entry point.

use anyhow::Context;
use eframe::egui;
use oee_dashboard::config::DashboardConfig;
use oee_dashboard::gui::OeeDashboardApp;
use oee_dashboard::logging;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::load().context("failed to load dashboard config")?;
    logging::init(&config.log_level);
    info!(?config, "starting OEE dashboard");

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([1100.0, 700.0])
            .with_title("OEE Production Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "OEE Production Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(OeeDashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start the dashboard window: {}", e))
}
