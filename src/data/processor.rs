//! Data Processor Module
//! Value selection, ranking and comparison-table projections.

use super::schema::{Attribute, CandyRecord, NAME_COL, PRICE_COL, WIN_COL};
use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Threshold {0} is outside 0..=100")]
    ThresholdOutOfRange(f64),
}

/// Handles projections and orderings of the candy table.
pub struct DataProcessor;

impl DataProcessor {
    /// Candies with win >= `win_threshold` and price <= `price_threshold`,
    /// most popular first. Ties keep their table order.
    pub fn best_value(
        df: &DataFrame,
        win_threshold: f64,
        price_threshold: f64,
    ) -> Result<DataFrame, ProcessorError> {
        for t in [win_threshold, price_threshold] {
            if !(0.0..=100.0).contains(&t) {
                return Err(ProcessorError::ThresholdOutOfRange(t));
            }
        }

        let out = df
            .clone()
            .lazy()
            .filter(
                col(WIN_COL)
                    .gt_eq(lit(win_threshold))
                    .and(col(PRICE_COL).lt_eq(lit(price_threshold))),
            )
            .sort([WIN_COL], Self::descending())
            .collect()?;
        Ok(out)
    }

    /// Name, win and price of every candy, for the value-analysis scatter.
    pub fn value_projection(df: &DataFrame) -> Result<DataFrame, ProcessorError> {
        let out = df
            .clone()
            .lazy()
            .select([col(NAME_COL), col(WIN_COL), col(PRICE_COL)])
            .collect()?;
        Ok(out)
    }

    /// The `n` most popular candies.
    pub fn top_by_win(df: &DataFrame, n: usize) -> Result<DataFrame, ProcessorError> {
        let out = df
            .clone()
            .lazy()
            .sort([WIN_COL], Self::descending())
            .limit(n as IdxSize)
            .collect()?;
        Ok(out)
    }

    /// Rows whose name is in `names`, in table order. Unknown names are ignored.
    pub fn select_candies(df: &DataFrame, names: &[String]) -> Result<DataFrame, ProcessorError> {
        let predicate = names
            .iter()
            .map(|n| col(NAME_COL).eq(lit(n.as_str())))
            .reduce(|acc, e| acc.or(e))
            .unwrap_or(lit(false));

        let out = df.clone().lazy().filter(predicate).collect()?;
        Ok(out)
    }

    /// Build the display table comparing the selected candies.
    pub fn comparison_table(
        df: &DataFrame,
        names: &[String],
    ) -> Result<ComparisonTable, ProcessorError> {
        let selected = Self::select_candies(df, names)?;
        let rows = CandyRecord::from_frame(&selected)?
            .iter()
            .map(|rec| {
                let mut cells = Vec::with_capacity(COMPARISON_HEADERS.len());
                cells.push(rec.name.clone());
                cells.extend(
                    Attribute::ALL
                        .iter()
                        .map(|a| yes_no(rec.has(*a)).to_string()),
                );
                cells.push(format_percent(rec.sugar_percent));
                cells.push(format_percent(rec.price_percent));
                cells.push(format_percent(rec.win_percent));
                cells
            })
            .collect();

        Ok(ComparisonTable {
            headers: COMPARISON_HEADERS.iter().map(|h| h.to_string()).collect(),
            rows,
        })
    }

    /// Win, sugar and price per selected candy, for grouped bars and radar charts.
    pub fn comparison_series(
        df: &DataFrame,
        names: &[String],
    ) -> Result<Vec<ComparisonSeries>, ProcessorError> {
        let selected = Self::select_candies(df, names)?;
        Ok(CandyRecord::from_frame(&selected)?
            .into_iter()
            .map(|rec| ComparisonSeries {
                values: [rec.win_percent, rec.sugar_percent, rec.price_percent],
                name: rec.name,
            })
            .collect())
    }

    fn descending() -> SortMultipleOptions {
        SortMultipleOptions::default()
            .with_order_descending(true)
            .with_maintain_order(true)
    }
}

/// Column labels of the comparison table.
pub const COMPARISON_HEADERS: [&str; 13] = [
    "Candy",
    "Chocolate",
    "Fruity",
    "Caramel",
    "Peanut/Almond",
    "Nougat",
    "Crisped Rice Wafer",
    "Hard",
    "Bar",
    "Pluribus",
    "Sugar %",
    "Price %",
    "Win %",
];

/// Axis labels of [`ComparisonSeries::values`].
pub const COMPARISON_AXES: [&str; 3] = ["Win %", "Sugar %", "Price %"];

/// Formatted comparison table: every cell is display text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ComparisonTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSeries {
    pub name: String,
    pub values: [f64; 3],
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Two decimals and a percent sign: `64.529` -> `"64.53%"`.
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::tests::sample_frame;
    use crate::data::schema::candy_names;

    fn names(df: &DataFrame) -> Vec<String> {
        candy_names(df).unwrap()
    }

    fn owned(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn best_value_filters_and_sorts_descending() {
        let df = sample_frame();
        let out = DataProcessor::best_value(&df, 50.0, 50.0).unwrap();
        assert_eq!(names(&out), vec!["Skittles original", "Haribo Gold Bears"]);

        let records = CandyRecord::from_frame(&out).unwrap();
        assert!(records
            .windows(2)
            .all(|w| w[0].win_percent >= w[1].win_percent));
        assert!(records
            .iter()
            .all(|r| r.win_percent >= 50.0 && r.price_percent <= 50.0));
    }

    #[test]
    fn best_value_price_threshold_is_inclusive() {
        let df = sample_frame();
        let out = DataProcessor::best_value(&df, 80.0, 90.6).unwrap();
        assert_eq!(names(&out), vec!["Reese's Peanut Butter cup", "Twix"]);
    }

    #[test]
    fn best_value_rejects_out_of_scale_thresholds() {
        let df = sample_frame();
        let err = DataProcessor::best_value(&df, 50.0, 150.0).unwrap_err();
        assert!(matches!(err, ProcessorError::ThresholdOutOfRange(t) if t == 150.0));
    }

    #[test]
    fn value_projection_keeps_all_rows_and_three_columns() {
        let df = sample_frame();
        let out = DataProcessor::value_projection(&df).unwrap();
        assert_eq!(out.height(), df.height());
        let cols: Vec<String> = out
            .get_column_names()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(cols, vec!["competitorname", "winpercent", "pricepercent"]);
    }

    #[test]
    fn top_by_win_orders_and_truncates() {
        let df = sample_frame();
        let out = DataProcessor::top_by_win(&df, 3).unwrap();
        assert_eq!(
            names(&out),
            vec!["Reese's Peanut Butter cup", "Twix", "Kit Kat"]
        );
        assert_eq!(DataProcessor::top_by_win(&df, 50).unwrap().height(), 12);
    }

    #[test]
    fn comparison_table_formats_flags_and_percentages() {
        let df = sample_frame();
        let table =
            DataProcessor::comparison_table(&df, &owned(&["Twix", "Unknown Bar", "Air Heads"]))
                .unwrap();

        assert_eq!(table.headers[0], "Candy");
        assert_eq!(table.headers[12], "Win %");
        assert_eq!(table.rows.len(), 2);

        let air_heads = &table.rows[0];
        assert_eq!(air_heads[0], "Air Heads");
        assert_eq!(air_heads[1], "No");
        assert_eq!(air_heads[2], "Yes");
        assert_eq!(air_heads[12], "52.34%");

        let twix = &table.rows[1];
        assert_eq!(twix[1], "Yes");
        assert_eq!(twix[10], "54.60%");
        assert_eq!(twix[11], "90.60%");
        assert_eq!(twix[12], "81.64%");
    }

    #[test]
    fn empty_selection_yields_empty_comparison() {
        let df = sample_frame();
        assert!(DataProcessor::comparison_table(&df, &[]).unwrap().is_empty());
        assert!(DataProcessor::comparison_series(&df, &[]).unwrap().is_empty());
    }

    #[test]
    fn comparison_series_orders_win_sugar_price() {
        let df = sample_frame();
        let series = DataProcessor::comparison_series(&df, &owned(&["Kit Kat"])).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, "Kit Kat");
        approx::assert_relative_eq!(series[0].values[0], 76.7686);
        approx::assert_relative_eq!(series[0].values[1], 31.3, epsilon = 1e-9);
    }

    #[test]
    fn percent_and_flag_formatting() {
        assert_eq!(format_percent(64.529), "64.53%");
        assert_eq!(format_percent(5.0), "5.00%");
        assert_eq!(yes_no(true), "Yes");
        assert_eq!(yes_no(false), "No");
    }
}
