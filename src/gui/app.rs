//! Candy Dash Main Application
//! Main window with filter panel, dashboard and comparison tool.

use crate::charts::ChartExporter;
use crate::config::AppConfig;
use crate::data::schema::candy_names;
use crate::gui::chart_viewer::{FilteredData, OverviewData};
use crate::gui::{ChartViewer, ComparisonPanel, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use polars::prelude::DataFrame;
use std::path::Path;
use std::sync::Arc;

/// Main application window.
pub struct CandyDashApp {
    config: AppConfig,
    dataset: Arc<DataFrame>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    comparison: ComparisonPanel,
}

impl CandyDashApp {
    /// Build the dashboard over an already loaded dataset.
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        dataset: Arc<DataFrame>,
        config: AppConfig,
    ) -> anyhow::Result<Self> {
        let control_panel = ControlPanel::new();
        let overview = OverviewData::compute(&dataset, &config)?;
        let filtered = FilteredData::compute(&dataset, &control_panel.settings)?;
        let comparison = ComparisonPanel::new(Arc::clone(&dataset), candy_names(&dataset)?);

        Ok(Self {
            config,
            dataset,
            control_panel,
            chart_viewer: ChartViewer::new(overview, filtered),
            comparison,
        })
    }

    /// Recompute the filtered views after a filter change.
    fn refilter(&mut self) {
        match FilteredData::compute(&self.dataset, &self.control_panel.settings) {
            Ok(filtered) => {
                let status = if filtered.is_empty() {
                    "No candies match the selected filters".to_string()
                } else {
                    format!("Showing {} candies", filtered.records.len())
                };
                self.chart_viewer.set_filtered(filtered);
                self.control_panel.set_status(&status);
            }
            Err(e) => {
                log::error!("Filtering failed: {e:#}");
                self.control_panel
                    .set_status(&format!("Error: {}", e));
            }
        }
    }

    /// Handle chart export - pick a folder, write PNGs and JSON, open the folder
    fn handle_export(&mut self) {
        let Some(analysis) = self.chart_viewer.overview.value.as_ref() else {
            self.control_panel.set_status("Error: nothing to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        let exporter = ChartExporter::new(self.config.export_width, self.config.export_height);
        match exporter.export_all(
            &dir,
            analysis,
            &self.chart_viewer.overview.top,
            &self.chart_viewer.filtered.records,
        ) {
            Ok(files) => {
                self.control_panel
                    .set_status(&format!("Exported {} files", files.len()));
                open_folder(&dir);
            }
            Err(e) => {
                log::error!("Export failed: {e}");
                self.control_panel
                    .set_status(&format!("Error: {}", e));
            }
        }
    }
}

fn open_folder(dir: &Path) {
    if let Err(e) = open::that(dir) {
        log::warn!("Could not open {}: {e}", dir.display());
    }
}

impl eframe::App for CandyDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Filters
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::FiltersChanged => self.refilter(),
                        ControlPanelAction::Reset => {
                            self.control_panel.reset();
                            self.refilter();
                        }
                        ControlPanelAction::ExportCharts => self.handle_export(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.heading("🎃 Maven Halloween Candy Challenge 🍬");
                    ui.label(
                        "Explore, analyze, and find the best Halloween candies to become \
                         the most popular house on the block.",
                    );
                    ui.add_space(10.0);

                    self.chart_viewer.show(ui);
                    ui.add_space(15.0);
                    self.comparison.show(ui);
                });
        });
    }
}
