//! Control Panel Widget
//! Left side panel with the candy filters.

use crate::data::{Attribute, Choice, FilterSettings};
use egui::{Color32, ComboBox, RichText, Slider};

/// Left side control panel holding the filter selections.
pub struct ControlPanel {
    pub settings: FilterSettings,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: FilterSettings::default(),
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;
        let before = self.settings.clone();

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🍬 Candy Dash")
                    .size(22.0)
                    .color(Color32::from_rgb(255, 107, 53)),
            );
            ui.label(
                RichText::new("Halloween Candy Explorer")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Attribute Section =====
        ui.label(RichText::new("Filter Your Candy").size(14.0).strong());
        ui.add_space(8.0);

        let label_width = 170.0;
        let combo_width = 80.0;

        for attribute in Attribute::ALL {
            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new(attribute.question()));
                let choice = self.settings.choice_mut(attribute);
                ComboBox::from_id_salt(attribute.column())
                    .width(combo_width)
                    .selected_text(choice.label())
                    .show_ui(ui, |ui| {
                        for option in Choice::OPTIONS {
                            ui.selectable_value(&mut *choice, option, option.label());
                        }
                    });
            });
            ui.add_space(2.0);
        }

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Range Section =====
        ui.label(RichText::new("Upper Limits").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            Slider::new(&mut self.settings.max_sugar, 0.0..=100.0)
                .step_by(1.0)
                .text("Max Sugar Percentile"),
        )
        .on_hover_text("Limit the sugar level of candies.");
        ui.add(
            Slider::new(&mut self.settings.max_price, 0.0..=100.0)
                .step_by(1.0)
                .text("Max Price Percentile"),
        )
        .on_hover_text("Set a price range for candies.");
        ui.add(
            Slider::new(&mut self.settings.max_win, 0.0..=100.0)
                .step_by(1.0)
                .text("Max Win Percent"),
        );

        ui.add_space(15.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            let reset_enabled = !self.settings.is_default();
            ui.add_enabled_ui(reset_enabled, |ui| {
                let button = egui::Button::new(RichText::new("↺ Reset Filters").size(14.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Reset;
                }
            });

            ui.add_space(8.0);

            let export = egui::Button::new(RichText::new("💾 Export Charts").size(14.0))
                .min_size(egui::vec2(180.0, 30.0));
            if ui.add(export).clicked() {
                action = ControlPanelAction::ExportCharts;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        if action == ControlPanelAction::None && self.settings != before {
            action = ControlPanelAction::FiltersChanged;
        }
        action
    }

    /// Return every filter to its default.
    pub fn reset(&mut self) {
        self.settings.reset();
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    FiltersChanged,
    Reset,
    ExportCharts,
}
