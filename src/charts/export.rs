//! Static Chart Export
//! Renders dashboard charts to PNG with plotters and dumps the filtered table as JSON.

use crate::charts::plotter::ChartPoint;
use crate::data::schema::CandyRecord;
use crate::stats::{Quadrant, QuadrantAnalysis};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

const ORANGE: RGBColor = RGBColor(255, 107, 53);
const DARK: RGBColor = RGBColor(26, 26, 26);

pub const VALUE_CHART_FILE: &str = "value_analysis.png";
pub const TOP_CHART_FILE: &str = "top_candies.png";
pub const TABLE_FILE: &str = "filtered_candies.json";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to encode table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Chart rendering failed: {0}")]
    Render(String),
    #[error("Nothing to export: {0}")]
    Empty(&'static str),
}

fn render_err<E: std::fmt::Display>(err: E) -> ExportError {
    ExportError::Render(err.to_string())
}

/// Writes static copies of the dashboard into a folder.
pub struct ChartExporter {
    pub width: u32,
    pub height: u32,
}

impl ChartExporter {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Export the value analysis, the top-candy bars and the filtered table.
    /// Returns the files written.
    pub fn export_all(
        &self,
        dir: &Path,
        analysis: &QuadrantAnalysis,
        top: &[CandyRecord],
        filtered: &[CandyRecord],
    ) -> Result<Vec<PathBuf>, ExportError> {
        std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let value_path = dir.join(VALUE_CHART_FILE);
        self.render_value_analysis(analysis, &value_path)?;

        let top_path = dir.join(TOP_CHART_FILE);
        self.render_win_bars(top, "Top Most Popular Candies", &top_path)?;

        let table_path = dir.join(TABLE_FILE);
        write_table_json(filtered, &table_path)?;

        let written = vec![value_path, top_path, table_path];
        log::info!("Exported {} files to {}", written.len(), dir.display());
        Ok(written)
    }

    /// Price vs win scatter with median lines and quadrant captions.
    pub fn render_value_analysis(
        &self,
        analysis: &QuadrantAnalysis,
        path: &Path,
    ) -> Result<(), ExportError> {
        if analysis.entries.is_empty() {
            return Err(ExportError::Empty("value analysis has no candies"));
        }
        let points = ChartPoint::value_analysis(analysis);
        let (mp, mw) = (analysis.median_price, analysis.median_win);

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                "Candy Value Analysis: Win Percent vs Price Percent",
                ("sans-serif", 28),
            )
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(0f64..100f64, 0f64..100f64)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_desc("Price Percent")
            .y_desc("Win Percent")
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(LineSeries::new(vec![(mp, 0.0), (mp, 100.0)], DARK.stroke_width(1)))
            .map_err(render_err)?;
        chart
            .draw_series(LineSeries::new(vec![(0.0, mw), (100.0, mw)], DARK.stroke_width(1)))
            .map_err(render_err)?;

        chart
            .draw_series(points.iter().map(|p| {
                Circle::new((p.x, p.y), 5, ORANGE.mix(0.4 + 0.6 * p.color_value / 100.0).filled())
            }))
            .map_err(render_err)?;
        chart
            .draw_series(points.iter().map(|p| {
                Text::new(p.label.clone(), (p.x + 0.8, p.y + 0.8), ("sans-serif", 12))
            }))
            .map_err(render_err)?;

        let captions = Quadrant::ALL.iter().map(|q| {
            let pos = match q {
                Quadrant::HighValue => (2.0, 97.0),
                Quadrant::PopularButExpensive => (mp + 2.0, 97.0),
                Quadrant::LowValue => (2.0, 5.0),
                Quadrant::Overpriced => (mp + 2.0, 5.0),
            };
            Text::new(q.label().to_string(), pos, ("sans-serif", 18))
        });
        chart.draw_series(captions).map_err(render_err)?;

        root.present().map_err(render_err)?;
        Ok(())
    }

    /// Bar chart of win percent per candy.
    pub fn render_win_bars(
        &self,
        records: &[CandyRecord],
        title: &str,
        path: &Path,
    ) -> Result<(), ExportError> {
        if records.is_empty() {
            return Err(ExportError::Empty("no candies to chart"));
        }
        let points = ChartPoint::win_bars(records);
        let labels: Vec<String> = points.iter().map(|p| p.label.clone()).collect();

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(55)
            .build_cartesian_2d(-0.5f64..(points.len() as f64 - 0.5), 0f64..100f64)
            .map_err(render_err)?;

        let label_of = |x: &f64| {
            let idx = x.round();
            if (x - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(points.len())
            .x_label_formatter(&label_of)
            .y_desc("Win Percent")
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(points.iter().map(|p| {
                Rectangle::new([(p.x - 0.35, 0.0), (p.x + 0.35, p.y)], ORANGE.filled())
            }))
            .map_err(render_err)?;
        chart
            .draw_series(points.iter().map(|p| {
                Text::new(format!("{:.1}", p.y), (p.x - 0.25, p.y + 2.5), ("sans-serif", 13))
            }))
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        Ok(())
    }
}

/// Write records as pretty JSON.
pub fn write_table_json(records: &[CandyRecord], path: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
