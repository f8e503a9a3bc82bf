//! Global Stock Trading Dashboard - desktop entry point.

use anyhow::Context;
use eframe::egui;
use market_dashboard::config::DashboardConfig;
use market_dashboard::data::DataLoader;
use market_dashboard::gui::DashboardApp;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = DashboardConfig::resolve_path();
    let config = DashboardConfig::load(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;
    tracing::info!(
        "Using {} data sources from {}",
        config.sources.len(),
        config_path.display()
    );

    // A failed load is fatal; the table never changes after this point.
    let mut loader = DataLoader::new(config.sources.clone()).with_policy(config.date_policy);
    let table = loader.load().context("loading price data")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title(&config.title),
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, table, &config)))),
    )
    .map_err(|e| anyhow::anyhow!("dashboard window failed: {e}"))
}
