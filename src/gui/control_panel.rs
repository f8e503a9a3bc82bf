//! Control Panel Widget
//! Left side panel with the market, company, date and chart selectors.

use crate::analysis::Analysis;
use crate::charts::ChartMode;
use crate::data::{parse_date, SelectionFilter};
use chrono::NaiveDate;
use egui::{Color32, ComboBox, RichText, ScrollArea};
use std::collections::BTreeSet;

/// Left side control panel. Owns the selection the engine is run with.
pub struct ControlPanel {
    pub filter: SelectionFilter,
    pub chart_mode: ChartMode,
    pub start_text: String,
    pub end_text: String,
    pub status: String,
    title: String,
}

impl ControlPanel {
    pub fn new(title: &str) -> Self {
        Self {
            filter: SelectionFilter::default(),
            chart_mode: ChartMode::default(),
            start_text: String::new(),
            end_text: String::new(),
            status: "Ready".to_string(),
            title: title.to_string(),
        }
    }

    /// Preselect the first `count` companies of a new market selection and
    /// widen the date range to everything available.
    pub fn reset_companies(&mut self, candidates: &[String], count: usize) {
        self.filter.companies = candidates.iter().take(count).cloned().collect();
        self.filter.comparison.clear();
        self.filter.focus = None;
        self.reset_dates();
    }

    pub fn reset_dates(&mut self) {
        self.filter.start = None;
        self.filter.end = None;
    }

    /// Copy the date fields into the filter. Unparseable text clears that
    /// endpoint, which falls back to the available bound.
    pub fn apply_date_text(&mut self) -> bool {
        let start = parse_date(&self.start_text);
        let end = parse_date(&self.end_text);
        self.filter.start = start;
        self.filter.end = end;
        match (start, end) {
            (Some(s), Some(e)) => s <= e,
            _ => false,
        }
    }

    /// Show the range the engine actually used.
    pub fn sync_dates(&mut self, range: Option<(NaiveDate, NaiveDate)>) {
        match range {
            Some((start, end)) => {
                self.filter.start = Some(start);
                self.filter.end = Some(end);
                self.start_text = start.format("%Y-%m-%d").to_string();
                self.end_text = end.format("%Y-%m-%d").to_string();
            }
            None => {
                self.reset_dates();
                self.start_text.clear();
                self.end_text.clear();
            }
        }
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, analysis: &Analysis) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new(format!("🌍 {}", self.title))
                    .size(18.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Market Section =====
        ui.label(RichText::new("🗺 Markets").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            if ui.small_button("Select All").clicked() {
                self.filter.markets = analysis.market_candidates.iter().cloned().collect();
                action = ControlPanelAction::MarketsChanged;
            }
            if ui.small_button("Clear All").clicked() {
                self.filter.markets.clear();
                action = ControlPanelAction::MarketsChanged;
            }
        });
        Self::framed(ui, |ui| {
            ScrollArea::vertical()
                .id_salt("markets")
                .max_height(140.0)
                .show(ui, |ui| {
                    for market in &analysis.market_candidates {
                        if Self::toggle(ui, &mut self.filter.markets, market, market) {
                            action = ControlPanelAction::MarketsChanged;
                        }
                    }
                });
        });

        ui.add_space(10.0);

        // ===== Company Section =====
        ui.label(RichText::new("🏢 Companies").size(14.0).strong());
        ui.add_space(5.0);

        Self::framed(ui, |ui| {
            if analysis.company_candidates.is_empty() {
                ui.label(RichText::new("Select a market first").color(Color32::GRAY));
            }
            ScrollArea::vertical()
                .id_salt("companies")
                .max_height(180.0)
                .show(ui, |ui| {
                    for company in &analysis.company_candidates {
                        if Self::toggle(ui, &mut self.filter.companies, company, company) {
                            self.reset_dates();
                            action = ControlPanelAction::SelectionChanged;
                        }
                    }
                });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Date Range Section =====
        ui.label(RichText::new("📅 Date Range").size(14.0).strong());
        ui.add_space(5.0);

        let label_width = 50.0;
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Start:"));
            if ui.text_edit_singleline(&mut self.start_text).lost_focus() {
                action = ControlPanelAction::DatesEdited;
            }
        });
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("End:"));
            if ui.text_edit_singleline(&mut self.end_text).lost_focus() {
                action = ControlPanelAction::DatesEdited;
            }
        });
        ui.horizontal(|ui| {
            if ui.small_button("Apply").clicked() {
                action = ControlPanelAction::DatesEdited;
            }
            if ui.small_button("Full Range").clicked() {
                self.reset_dates();
                action = ControlPanelAction::SelectionChanged;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Chart Section =====
        ui.label(RichText::new("📈 Chart").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal_wrapped(|ui| {
            for mode in ChartMode::ALL {
                ui.radio_value(&mut self.chart_mode, mode, mode.label());
            }
        });

        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Focus:"));
            let current = analysis
                .focus
                .as_ref()
                .map(|f| f.label.clone())
                .unwrap_or_default();
            ComboBox::from_id_salt("focus_series")
                .width(160.0)
                .selected_text(current)
                .show_ui(ui, |ui| {
                    for (key, label) in &analysis.series {
                        let is_current = self.filter.focus.as_ref() == Some(key);
                        if ui.selectable_label(is_current, label.as_str()).clicked() {
                            self.filter.focus = Some(key.clone());
                            action = ControlPanelAction::SelectionChanged;
                        }
                    }
                });
        });

        if self.chart_mode == ChartMode::Line && analysis.series.len() > 1 {
            ui.add_space(5.0);
            ui.label("Compare (none checked = all):");
            Self::framed(ui, |ui| {
                for (key, label) in &analysis.series {
                    if Self::toggle(ui, &mut self.filter.comparison, key, label) {
                        action = ControlPanelAction::SelectionChanged;
                    }
                }
            });
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        let status_color = if self.status.contains("Invalid") || self.status.contains("No data") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Checkbox bound to set membership; returns true when it changed.
    fn toggle<T: Ord + Clone>(
        ui: &mut egui::Ui,
        set: &mut BTreeSet<T>,
        item: &T,
        label: &str,
    ) -> bool {
        let mut checked = set.contains(item);
        if ui.checkbox(&mut checked, label).changed() {
            if checked {
                set.insert(item.clone());
            } else {
                set.remove(item);
            }
            return true;
        }
        false
    }

    fn framed(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, add_contents);
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    MarketsChanged,
    SelectionChanged,
    DatesEdited,
}
