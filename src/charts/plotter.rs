//! Chart Plotter Module
//! Draws the price charts with egui_plot from an already computed analysis.

use crate::analysis::{group_thousands, ComparisonSeries, FocusSeries};
use crate::stats::{Growth, MA_LONG, MA_SHORT};
use chrono::{Datelike, NaiveDate};
use egui::{Color32, RichText, Stroke};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints, Polygon,
};
use std::ops::RangeInclusive;

pub const UP_COLOR: Color32 = Color32::from_rgb(38, 166, 154);
pub const DOWN_COLOR: Color32 = Color32::from_rgb(239, 83, 80);
pub const MA_SHORT_COLOR: Color32 = Color32::from_rgb(243, 156, 18);
pub const MA_LONG_COLOR: Color32 = Color32::from_rgb(155, 89, 182);

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(255, 87, 34),   // Deep Orange
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

const CHART_HEIGHT: f32 = 420.0;
const VOLUME_HEIGHT: f32 = 180.0;
const PIE_SEGMENTS: usize = 96;

/// Which chart the viewer shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartMode {
    #[default]
    Line,
    Candlestick,
    Bar,
    Pie,
}

impl ChartMode {
    pub const ALL: [ChartMode; 4] = [
        ChartMode::Line,
        ChartMode::Candlestick,
        ChartMode::Bar,
        ChartMode::Pie,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartMode::Line => "Line",
            ChartMode::Candlestick => "Candlestick",
            ChartMode::Bar => "Volume Bars",
            ChartMode::Pie => "Volume Share",
        }
    }
}

/// Dates are plotted as days since 0001-01-01.
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

fn date_axis(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    x_to_date(mark.value)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Color for the n-th series.
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Close price of every compared company over time.
    pub fn draw_comparison_chart(ui: &mut egui::Ui, series: &[ComparisonSeries]) {
        Plot::new("comparison_chart")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Date")
            .y_axis_label("Close")
            .x_axis_formatter(date_axis)
            .show(ui, |plot_ui| {
                for (i, s) in series.iter().enumerate() {
                    let points: PlotPoints = s
                        .points
                        .iter()
                        .map(|&(date, close)| [date_to_x(date), close])
                        .collect();
                    plot_ui.line(
                        Line::new(points)
                            .color(Self::series_color(i))
                            .width(1.5)
                            .name(&s.label),
                    );
                }
            });
    }

    /// Candlesticks for the focus series with both moving averages.
    pub fn draw_candlestick_chart(ui: &mut egui::Ui, focus: &FocusSeries) {
        let mut rising = Vec::new();
        let mut falling = Vec::new();

        for r in &focus.rows {
            let (body_low, body_high) = if r.close >= r.open {
                (r.open, r.close)
            } else {
                (r.close, r.open)
            };
            let color = if r.close >= r.open { UP_COLOR } else { DOWN_COLOR };
            let elem = BoxElem::new(
                date_to_x(r.date),
                BoxSpread::new(r.low, body_low, (body_low + body_high) / 2.0, body_high, r.high),
            )
            .box_width(0.7)
            .whisker_width(0.0)
            .fill(color)
            .stroke(Stroke::new(1.0, color))
            .name(r.date.format("%Y-%m-%d").to_string());

            if r.close >= r.open {
                rising.push(elem);
            } else {
                falling.push(elem);
            }
        }

        let ma_points = |values: &[Option<f64>]| -> PlotPoints {
            focus
                .rows
                .iter()
                .zip(values)
                .filter_map(|(r, v)| v.map(|v| [date_to_x(r.date), v]))
                .collect()
        };

        Plot::new(("candles", &focus.key))
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Date")
            .y_axis_label("Price")
            .x_axis_formatter(date_axis)
            .show(ui, |plot_ui| {
                plot_ui.box_plot(BoxPlot::new(rising).name("Up"));
                plot_ui.box_plot(BoxPlot::new(falling).name("Down"));
                plot_ui.line(
                    Line::new(ma_points(&focus.ma_short))
                        .color(MA_SHORT_COLOR)
                        .width(1.5)
                        .name(format!("MA{MA_SHORT}")),
                );
                plot_ui.line(
                    Line::new(ma_points(&focus.ma_long))
                        .color(MA_LONG_COLOR)
                        .width(1.5)
                        .name(format!("MA{MA_LONG}")),
                );
            });
    }

    /// Daily volume of the focus series.
    pub fn draw_volume_chart(ui: &mut egui::Ui, focus: &FocusSeries, full_size: bool) {
        let bars: Vec<Bar> = focus
            .rows
            .iter()
            .map(|r| {
                let color = if r.close >= r.open { UP_COLOR } else { DOWN_COLOR };
                Bar::new(date_to_x(r.date), r.volume as f64)
                    .width(0.8)
                    .fill(color)
            })
            .collect();

        let height = if full_size { CHART_HEIGHT } else { VOLUME_HEIGHT };

        Plot::new(("volume", &focus.key))
            .height(height)
            .allow_scroll(false)
            .x_axis_label("Date")
            .y_axis_label("Volume")
            .x_axis_formatter(date_axis)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("Volume"));
            });
    }

    /// Share of traded volume per company as a pie.
    pub fn draw_volume_pie(ui: &mut egui::Ui, shares: &[(String, u64)]) {
        let total: f64 = shares.iter().map(|(_, v)| *v as f64).sum();
        if total <= 0.0 {
            ui.label("No volume traded in the selected range");
            return;
        }

        Plot::new("volume_pie")
            .height(CHART_HEIGHT)
            .data_aspect(1.0)
            .legend(Legend::default())
            .show_axes(false)
            .show_grid(false)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                let mut start = 0.0f64;
                for (i, (company, volume)) in shares.iter().enumerate() {
                    let fraction = *volume as f64 / total;
                    if fraction <= 0.0 {
                        continue;
                    }
                    let color = Self::series_color(i);
                    plot_ui.polygon(
                        Polygon::new(Self::pie_slice(start, fraction))
                            .fill_color(color.gamma_multiply(0.8))
                            .stroke(Stroke::new(1.0, Color32::WHITE))
                            .name(format!("{} ({:.1}%)", company, fraction * 100.0)),
                    );
                    start += fraction;
                }
            });
    }

    /// Unit-circle wedge from `start` covering `fraction` of the turn.
    fn pie_slice(start: f64, fraction: f64) -> PlotPoints {
        let steps = ((PIE_SEGMENTS as f64 * fraction).ceil() as usize).max(1);
        let tau = std::f64::consts::TAU;
        let mut points = Vec::with_capacity(steps + 2);
        points.push([0.0, 0.0]);
        for step in 0..=steps {
            let angle = tau * (start + fraction * step as f64 / steps as f64);
            points.push([angle.cos(), angle.sin()]);
        }
        PlotPoints::new(points)
    }

    /// Growth ranking of the selected markets.
    pub fn draw_ranking_table(ui: &mut egui::Ui, ranking: &[Growth]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("growth_ranking")
                    .striped(true)
                    .min_col_width(70.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("#").strong().size(12.0));
                        ui.label(RichText::new("Company").strong().size(12.0));
                        ui.label(RichText::new("Market").strong().size(12.0));
                        ui.label(RichText::new("First").strong().size(12.0));
                        ui.label(RichText::new("Latest").strong().size(12.0));
                        ui.label(RichText::new("Change %").strong().size(12.0));
                        ui.end_row();

                        for (rank, g) in ranking.iter().enumerate() {
                            let color = if g.percent_change >= 0.0 {
                                UP_COLOR
                            } else {
                                DOWN_COLOR
                            };
                            ui.label(RichText::new((rank + 1).to_string()).size(12.0));
                            ui.label(RichText::new(&g.company).size(12.0));
                            ui.label(RichText::new(&g.market).size(12.0));
                            ui.label(RichText::new(format!("{:.2}", g.first_close)).size(12.0));
                            ui.label(RichText::new(format!("{:.2}", g.latest_close)).size(12.0));
                            ui.label(
                                RichText::new(format!("{:+.2}%", g.percent_change))
                                    .size(12.0)
                                    .color(color),
                            );
                            ui.end_row();
                        }
                    });
            });
    }

    /// Volume totals next to the pie.
    pub fn draw_volume_table(ui: &mut egui::Ui, shares: &[(String, u64)]) {
        egui::Grid::new("volume_share_table")
            .striped(true)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                for (i, (company, volume)) in shares.iter().enumerate() {
                    let (rect, _) =
                        ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                    ui.painter().rect_filled(rect, 2.0, Self::series_color(i));
                    ui.label(RichText::new(company).size(12.0));
                    ui.label(RichText::new(group_thousands(*volume)).size(12.0));
                    ui.end_row();
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_axis_round_trip() {
        let date = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap();
        assert_eq!(x_to_date(date_to_x(date)), Some(date));
        assert_eq!(x_to_date(date_to_x(date) + 0.4), Some(date));
    }

    #[test]
    fn test_pie_slice_stays_on_unit_circle() {
        let slice = ChartPlotter::pie_slice(0.25, 0.5);
        let points = slice.points();
        assert_eq!(points[0].x, 0.0);
        for p in &points[1..] {
            assert!(((p.x * p.x + p.y * p.y) - 1.0).abs() < 1e-9);
        }
        // A quarter turn in, the wedge starts straight up.
        assert!((points[1].y - 1.0).abs() < 1e-9);
    }
}
