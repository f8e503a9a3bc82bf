//! Chart Viewer Widget
//! Central panel with the headline figures, the selected chart and the growth ranking.

use crate::analysis::{Analysis, Headline, Kpi};
use crate::charts::{ChartMode, ChartPlotter};
use egui::{Color32, RichText, ScrollArea};

const KPI_CARD_WIDTH: f32 = 150.0;
const SECTION_SPACING: f32 = 15.0;

/// Scrollable display of the current analysis.
#[derive(Default)]
pub struct ChartViewer;

impl ChartViewer {
    pub fn new() -> Self {
        Self
    }

    pub fn show(&self, ui: &mut egui::Ui, analysis: &Analysis, mode: ChartMode) {
        let (kpis, notice) = match analysis.headline() {
            Headline::NoData(message) => {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new(message).size(20.0).color(Color32::GRAY));
                });
                return;
            }
            Headline::Kpis { kpis, notice } => (kpis, notice),
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("📊 Live Market Style Analysis");
                if let Some((start, end)) = analysis.range {
                    ui.label(
                        RichText::new(format!(
                            "{} rows from {} to {}",
                            analysis.rows.len(),
                            start.format("%Y-%m-%d"),
                            end.format("%Y-%m-%d")
                        ))
                        .color(Color32::GRAY),
                    );
                }
                ui.add_space(8.0);

                Self::draw_kpis(ui, &kpis);
                if let Some(notice) = notice {
                    ui.label(
                        RichText::new(format!("⚠ {notice}"))
                            .color(Color32::from_rgb(243, 156, 18)),
                    );
                }
                ui.add_space(SECTION_SPACING);

                match mode {
                    ChartMode::Line => {
                        ui.label(RichText::new("📈 Stock Price Comparison").size(16.0).strong());
                        ChartPlotter::draw_comparison_chart(ui, &analysis.comparison);
                    }
                    ChartMode::Candlestick => match &analysis.focus {
                        Some(focus) => {
                            ui.label(
                                RichText::new(format!("🕯 Candlestick: {}", focus.label))
                                    .size(16.0)
                                    .strong(),
                            );
                            ChartPlotter::draw_candlestick_chart(ui, focus);
                            ui.add_space(SECTION_SPACING);
                            ui.label(RichText::new("📊 Volume Analysis").size(14.0).strong());
                            ChartPlotter::draw_volume_chart(ui, focus, false);
                        }
                        None => {
                            ui.label("No series to chart");
                        }
                    },
                    ChartMode::Bar => match &analysis.focus {
                        Some(focus) => {
                            ui.label(
                                RichText::new(format!("📊 Volume Analysis: {}", focus.label))
                                    .size(16.0)
                                    .strong(),
                            );
                            ChartPlotter::draw_volume_chart(ui, focus, true);
                        }
                        None => {
                            ui.label("No series to chart");
                        }
                    },
                    ChartMode::Pie => {
                        ui.label(RichText::new("🥧 Volume Share").size(16.0).strong());
                        ui.horizontal(|ui| {
                            ui.vertical(|ui| {
                                ui.set_width(ui.available_width() * 0.65);
                                ChartPlotter::draw_volume_pie(ui, &analysis.volume_share);
                            });
                            ui.vertical(|ui| {
                                ChartPlotter::draw_volume_table(ui, &analysis.volume_share);
                            });
                        });
                    }
                }

                ui.add_space(SECTION_SPACING);
                ui.separator();
                ui.label(RichText::new("🏆 Growth Ranking").size(16.0).strong());
                if analysis.ranking.is_empty() {
                    ui.label(RichText::new("No ranking available").color(Color32::GRAY));
                } else {
                    ChartPlotter::draw_ranking_table(ui, &analysis.ranking);
                }
            });
    }

    fn draw_kpis(ui: &mut egui::Ui, kpis: &[Kpi]) {
        ui.horizontal_wrapped(|ui| {
            for kpi in kpis {
                egui::Frame::none()
                    .fill(ui.visuals().widgets.noninteractive.bg_fill)
                    .rounding(8.0)
                    .inner_margin(10.0)
                    .show(ui, |ui| {
                        ui.set_width(KPI_CARD_WIDTH);
                        ui.vertical(|ui| {
                            ui.label(RichText::new(kpi.label).size(12.0).color(Color32::GRAY));
                            ui.label(RichText::new(&kpi.value).size(18.0).strong());
                        });
                    });
            }
        });
    }
}
