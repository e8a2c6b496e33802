//! GUI module - User interface components

mod app;
mod chart_viewer;
mod comparison;
mod control_panel;

pub use app::CandyDashApp;
pub use chart_viewer::ChartViewer;
pub use comparison::ComparisonPanel;
pub use control_panel::{ControlPanel, ControlPanelAction};
