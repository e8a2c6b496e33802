//! Candy Comparison Tool
//! Pick candies, then compare them side by side as bars, radar and table.

use crate::charts::ChartPlotter;
use crate::data::{ComparisonSeries, ComparisonTable, DataProcessor};
use egui::{Color32, RichText, ScrollArea};
use polars::prelude::DataFrame;
use std::collections::BTreeSet;
use std::sync::Arc;

pub struct ComparisonPanel {
    dataset: Arc<DataFrame>,
    names: Vec<String>,
    selected: BTreeSet<String>,
    search: String,
    table: ComparisonTable,
    series: Vec<ComparisonSeries>,
    error: Option<String>,
}

impl ComparisonPanel {
    pub fn new(dataset: Arc<DataFrame>, mut names: Vec<String>) -> Self {
        names.sort();
        Self {
            dataset,
            names,
            selected: BTreeSet::new(),
            search: String::new(),
            table: ComparisonTable::default(),
            series: Vec::new(),
            error: None,
        }
    }

    /// Names currently picked, in alphabetical order.
    pub fn selected_names(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    /// Rebuild the table and chart series for the current selection.
    /// On failure nothing from the previous selection is kept.
    fn refresh(&mut self) {
        let names = self.selected_names();
        let result = DataProcessor::comparison_table(&self.dataset, &names).and_then(|table| {
            DataProcessor::comparison_series(&self.dataset, &names).map(|series| (table, series))
        });

        match result {
            Ok((table, series)) => {
                log::debug!("Comparing {} candies", series.len());
                self.table = table;
                self.series = series;
                self.error = None;
            }
            Err(e) => {
                log::error!("Comparison failed: {e}");
                self.table = ComparisonTable::default();
                self.series.clear();
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.separator();
        ui.label(RichText::new("🔍 Compare Candies").size(18.0).strong());
        ui.add_space(5.0);

        let mut changed = false;
        ui.horizontal(|ui| {
            ui.label("Search:");
            ui.text_edit_singleline(&mut self.search);
            if ui.small_button("Clear Selection").clicked() && !self.selected.is_empty() {
                self.selected.clear();
                changed = true;
            }
        });

        let needle = self.search.to_lowercase();
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("compare_pick")
                    .max_height(140.0)
                    .show(ui, |ui| {
                        ui.horizontal_wrapped(|ui| {
                            for name in &self.names {
                                if !needle.is_empty() && !name.to_lowercase().contains(&needle) {
                                    continue;
                                }
                                let mut checked = self.selected.contains(name);
                                if ui.checkbox(&mut checked, name).changed() {
                                    if checked {
                                        self.selected.insert(name.clone());
                                    } else {
                                        self.selected.remove(name);
                                    }
                                    changed = true;
                                }
                            }
                        });
                    });
            });

        if changed {
            self.refresh();
        }

        ui.add_space(8.0);
        if let Some(error) = &self.error {
            ui.label(RichText::new(format!("Comparison failed: {error}")).color(Color32::RED));
            return;
        }
        if self.series.is_empty() {
            ui.label(
                RichText::new("Please select at least one candy to compare.")
                    .color(Color32::GRAY),
            );
            return;
        }

        ui.columns(2, |cols| {
            cols[0].label(RichText::new("Candy Comparison").strong());
            ChartPlotter::draw_comparison_bars(&mut cols[0], "compare_bars", &self.series);
            cols[1].label(RichText::new("Attribute Profile").strong());
            ChartPlotter::draw_comparison_radar(&mut cols[1], "compare_radar", &self.series);
        });

        ui.add_space(8.0);
        ScrollArea::horizontal().id_salt("compare_table").show(ui, |ui| {
            egui::Grid::new("comparison_grid").striped(true).show(ui, |ui| {
                for header in &self.table.headers {
                    ui.label(RichText::new(header).strong().size(11.0));
                }
                ui.end_row();
                for row in &self.table.rows {
                    for cell in row {
                        ui.label(cell);
                    }
                    ui.end_row();
                }
            });
        });
    }
}
