//! Charts module - Chart data, interactive plots and static export

mod export;
mod plotter;

pub use export::ChartExporter;
pub use plotter::{ChartPlotter, ChartPoint};
