//! Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::analysis::{analyze, Analysis};
use crate::config::DashboardConfig;
use crate::data::{DataProcessor, PriceTable};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use std::sync::Arc;

/// Main application window.
///
/// The price table is loaded before the window opens and shared read-only;
/// every interaction reruns `analyze` synchronously on the UI thread.
pub struct DashboardApp {
    table: Arc<PriceTable>,
    default_company_count: usize,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    analysis: Analysis,
}

impl DashboardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        table: Arc<PriceTable>,
        config: &DashboardConfig,
    ) -> Self {
        let mut control_panel = ControlPanel::new(&config.title);
        control_panel.filter.markets = DataProcessor::market_candidates(&table)
            .into_iter()
            .collect();

        let analysis = analyze(&table, &control_panel.filter);
        let mut app = Self {
            table,
            default_company_count: config.default_company_count,
            control_panel,
            chart_viewer: ChartViewer::new(),
            analysis,
        };
        app.handle_markets_changed();
        app
    }

    /// Company choices cascade from the markets, so reseed them first.
    fn handle_markets_changed(&mut self) {
        let by_market =
            DataProcessor::narrow_by_market(&self.table, &self.control_panel.filter.markets);
        let candidates = DataProcessor::company_candidates(&by_market);
        self.control_panel
            .reset_companies(&candidates, self.default_company_count);
        self.recompute();
    }

    fn handle_dates_edited(&mut self) {
        let valid = self.control_panel.apply_date_text();
        self.recompute();
        if !valid {
            self.control_panel
                .set_status("Invalid date range, reset to the available range");
        }
    }

    fn recompute(&mut self) {
        self.analysis = analyze(&self.table, &self.control_panel.filter);
        self.control_panel.sync_dates(self.analysis.range);

        let status = if self.analysis.is_empty() {
            "No data for the current selection".to_string()
        } else {
            format!(
                "{} rows, {} series",
                self.analysis.rows.len(),
                self.analysis.series.len()
            )
        };
        self.control_panel.set_status(&status);
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui, &self.analysis);

                    match action {
                        ControlPanelAction::MarketsChanged => self.handle_markets_changed(),
                        ControlPanelAction::SelectionChanged => self.recompute(),
                        ControlPanelAction::DatesEdited => self.handle_dates_edited(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer
                .show(ui, &self.analysis, self.control_panel.chart_mode);
        });
    }
}
