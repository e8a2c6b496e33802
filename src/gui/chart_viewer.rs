//! Chart Viewer Widget
//! Central scrollable dashboard: headline figures, tables and charts.

use crate::charts::{ChartPlotter, ChartPoint};
use crate::config::AppConfig;
use crate::data::processor::format_percent;
use crate::data::{filter_candies, Attribute, CandyRecord, DataProcessor, FilterSettings};
use crate::stats::{
    AttributeBreakdown, GroupMean, Kpis, QuadrantAnalysis, StatsCalculator, SummaryStats,
    Trendline, ValuePoint,
};
use egui::{Color32, RichText, ScrollArea};
use polars::prelude::DataFrame;

const SECTION_SPACING: f32 = 15.0;
const TABLE_HEIGHT: f32 = 320.0;

/// Views over the whole dataset; computed once after loading.
pub struct OverviewData {
    pub kpis: Kpis,
    pub top: Vec<CandyRecord>,
    pub breakdowns: Vec<AttributeBreakdown>,
    pub value: Option<QuadrantAnalysis>,
    pub best_value: Vec<CandyRecord>,
    pub sugar_points: Vec<ChartPoint>,
    pub sugar_trend: Option<Trendline>,
    pub chocolate_fruity: Vec<GroupMean>,
}

impl OverviewData {
    pub fn compute(df: &DataFrame, config: &AppConfig) -> anyhow::Result<Self> {
        let records = CandyRecord::from_frame(df)?;
        let top = CandyRecord::from_frame(&DataProcessor::top_by_win(df, config.top_n)?)?;
        let best = DataProcessor::best_value(df, config.win_threshold, config.price_threshold)?;
        let projection = DataProcessor::value_projection(df)?;
        let points = ValuePoint::from_frame(&projection)?;

        Ok(Self {
            kpis: StatsCalculator::kpis(&records),
            top,
            breakdowns: StatsCalculator::all_attribute_breakdowns(&records),
            value: StatsCalculator::classify_quadrants(&points),
            best_value: CandyRecord::from_frame(&best)?,
            sugar_points: ChartPoint::sugar_vs_win(&records),
            sugar_trend: StatsCalculator::sugar_popularity_trend(&records),
            chocolate_fruity: StatsCalculator::chocolate_fruity_means(&records),
        })
    }

    pub fn breakdown(&self, attribute: Attribute) -> Option<&AttributeBreakdown> {
        self.breakdowns.iter().find(|b| b.attribute == attribute)
    }
}

/// Views that follow the current filters.
pub struct FilteredData {
    pub records: Vec<CandyRecord>,
    pub win_stats: SummaryStats,
    pub bars: Vec<ChartPoint>,
    pub sugar_price: Vec<ChartPoint>,
}

impl FilteredData {
    pub fn compute(df: &DataFrame, settings: &FilterSettings) -> anyhow::Result<Self> {
        let filtered = filter_candies(df, settings)?;
        let records = CandyRecord::from_frame(&filtered)?;
        let wins: Vec<f64> = records.iter().map(|r| r.win_percent).collect();

        Ok(Self {
            win_stats: StatsCalculator::compute_descriptive_stats(&wins),
            bars: ChartPoint::win_bars(&records),
            sugar_price: ChartPoint::sugar_vs_price(&records),
            records,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Scrollable dashboard area.
pub struct ChartViewer {
    pub overview: OverviewData,
    pub filtered: FilteredData,
}

impl ChartViewer {
    pub fn new(overview: OverviewData, filtered: FilteredData) -> Self {
        Self { overview, filtered }
    }

    pub fn set_filtered(&mut self, filtered: FilteredData) {
        self.filtered = filtered;
    }

    /// Draw everything above the comparison tool.
    pub fn show(&self, ui: &mut egui::Ui) {
        self.draw_kpis(ui);
        ui.add_space(SECTION_SPACING);

        ui.columns(2, |cols| {
            self.draw_filtered_table(&mut cols[0]);
            self.draw_filtered_distribution(&mut cols[1]);
        });
        ui.add_space(SECTION_SPACING);

        ui.columns(2, |cols| {
            Self::section_title(&mut cols[0], "Top Most Popular Candies");
            ChartPlotter::draw_win_bars(
                &mut cols[0],
                "top_candies",
                &ChartPoint::win_bars(&self.overview.top),
            );

            let attribute = Attribute::Chocolate;
            Self::section_title(&mut cols[1], &ChartPlotter::distribution_title(attribute));
            if let Some(b) = self.overview.breakdown(attribute) {
                ChartPlotter::draw_attribute_pie(&mut cols[1], "chocolate_pie", b);
            }
        });
        ui.add_space(SECTION_SPACING);

        Self::section_title(ui, "Sugar vs Price Comparison");
        if self.filtered.is_empty() {
            Self::empty_warning(ui, "No data available for sugar vs price chart.");
        } else {
            ChartPlotter::draw_sized_scatter(
                ui,
                "sugar_price",
                &self.filtered.sugar_price,
                "Sugar Percent",
                "Price Percent",
            );
            ui.label(
                RichText::new("Point size follows win percent.")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }
        ui.add_space(SECTION_SPACING);

        self.draw_value_section(ui);
        ui.add_space(SECTION_SPACING);

        ui.columns(2, |cols| {
            Self::section_title(&mut cols[0], "Sugar Content vs Candy Popularity");
            ChartPlotter::draw_trend_scatter(
                &mut cols[0],
                "sugar_popularity",
                &self.overview.sugar_points,
                self.overview.sugar_trend,
            );

            Self::section_title(&mut cols[1], "Fruity vs. Chocolate Candy Popularity");
            ChartPlotter::draw_chocolate_fruity(
                &mut cols[1],
                "chocolate_fruity",
                &self.overview.chocolate_fruity,
            );
        });
        ui.add_space(SECTION_SPACING);

        self.draw_breakdown_table(ui);
    }

    fn section_title(ui: &mut egui::Ui, title: &str) {
        ui.separator();
        ui.label(RichText::new(title).size(16.0).strong());
        ui.add_space(5.0);
    }

    fn empty_warning(ui: &mut egui::Ui, text: &str) {
        ui.label(
            RichText::new(format!("⚠ {text}"))
                .size(13.0)
                .color(Color32::from_rgb(255, 193, 7)),
        );
    }

    fn draw_kpis(&self, ui: &mut egui::Ui) {
        let kpis = &self.overview.kpis;
        let cards = [
            ("Total Candies Analyzed", kpis.total_candies.to_string()),
            ("Average Win Percentage", format_percent(kpis.average_win)),
            (
                "Top Candy",
                kpis.top_candy.clone().unwrap_or_else(|| "-".to_string()),
            ),
        ];

        ui.columns(3, |cols| {
            for (col, (title, value)) in cols.iter_mut().zip(cards) {
                egui::Frame::none()
                    .fill(col.visuals().widgets.noninteractive.bg_fill)
                    .rounding(8.0)
                    .inner_margin(12.0)
                    .show(col, |ui| {
                        ui.vertical_centered(|ui| {
                            ui.label(RichText::new(title).size(13.0).color(Color32::GRAY));
                            ui.label(
                                RichText::new(value)
                                    .size(22.0)
                                    .strong()
                                    .color(Color32::from_rgb(255, 107, 53)),
                            );
                        });
                    });
            }
        });
    }

    fn draw_filtered_table(&self, ui: &mut egui::Ui) {
        Self::section_title(ui, "Filtered Candies");
        if self.filtered.is_empty() {
            Self::empty_warning(
                ui,
                "No candies match the selected filters. Please adjust your criteria.",
            );
            return;
        }

        ui.label(win_summary(&self.filtered.win_stats));
        Self::draw_record_table(ui, "filtered_table", &self.filtered.records);
    }

    fn draw_filtered_distribution(&self, ui: &mut egui::Ui) {
        Self::section_title(ui, "Candy Popularity by Win Percent");
        if self.filtered.is_empty() {
            Self::empty_warning(ui, "No data available for candy distribution chart.");
            return;
        }
        ChartPlotter::draw_win_bars(ui, "filtered_distribution", &self.filtered.bars);
    }

    fn draw_value_section(&self, ui: &mut egui::Ui) {
        Self::section_title(ui, "Candy Value Analysis: Win Percent vs Price Percent");
        let Some(analysis) = &self.overview.value else {
            Self::empty_warning(ui, "No candies to analyse.");
            return;
        };

        ChartPlotter::draw_value_analysis(ui, "value_analysis", analysis);
        ui.label(
            RichText::new(format!(
                "Median price {:.1}, median win {:.1}. High Value: popular and cheap; \
                 Overpriced: unpopular and expensive.",
                analysis.median_price, analysis.median_win
            ))
            .size(11.0)
            .color(Color32::GRAY),
        );
        ui.add_space(8.0);

        ui.columns(2, |cols| {
            Self::section_title(&mut cols[0], "Quadrant Membership");
            egui::Grid::new("quadrant_table")
                .striped(true)
                .num_columns(2)
                .show(&mut cols[0], |ui| {
                    for quadrant in crate::stats::Quadrant::ALL {
                        ui.label(RichText::new(quadrant.label()).strong());
                        ui.label(analysis.count(quadrant).to_string());
                        ui.end_row();
                    }
                });

            Self::section_title(&mut cols[1], "Best Value Candies");
            if self.overview.best_value.is_empty() {
                Self::empty_warning(&mut cols[1], "No candy clears the value thresholds.");
            } else {
                Self::draw_record_table(&mut cols[1], "best_value_table", &self.overview.best_value);
            }
        });
    }

    fn draw_breakdown_table(&self, ui: &mut egui::Ui) {
        Self::section_title(ui, "Attribute Effect on Popularity");
        egui::Grid::new("breakdown_table")
            .striped(true)
            .min_col_width(70.0)
            .show(ui, |ui| {
                for header in ["Attribute", "Yes", "No", "Win % (Yes)", "Win % (No)", "P-value"] {
                    ui.label(RichText::new(header).strong().size(11.0));
                }
                ui.end_row();

                let default_text_color = ui.visuals().text_color();
                for b in &self.overview.breakdowns {
                    ui.label(b.attribute.label());
                    ui.label(b.yes_count.to_string());
                    ui.label(b.no_count.to_string());
                    ui.label(format_percent(b.yes_mean_win));
                    ui.label(format_percent(b.no_mean_win));
                    match b.p_value {
                        Some(p) => {
                            let color = if b.is_significant {
                                Color32::from_rgb(220, 53, 69)
                            } else {
                                default_text_color
                            };
                            ui.label(RichText::new(format!("{p:.4}")).color(color));
                        }
                        None => {
                            ui.label("-");
                        }
                    }
                    ui.end_row();
                }
            });
    }

    /// Table of candies with win, sugar and price columns.
    fn draw_record_table(ui: &mut egui::Ui, id: &str, records: &[CandyRecord]) {
        ScrollArea::vertical()
            .id_salt(id)
            .max_height(TABLE_HEIGHT)
            .show(ui, |ui| {
                egui::Grid::new(id).striped(true).show(ui, |ui| {
                    for header in ["Candy", "Win %", "Sugar %", "Price %"] {
                        ui.label(RichText::new(header).strong().size(11.0));
                    }
                    ui.end_row();

                    for r in records {
                        ui.label(&r.name);
                        ui.label(format_percent(r.win_percent));
                        ui.label(format_percent(r.sugar_percent));
                        ui.label(format_percent(r.price_percent));
                        ui.end_row();
                    }
                });
            });
    }
}

/// One-line description of the win percent spread in the filtered view.
fn win_summary(stats: &SummaryStats) -> String {
    format!(
        "Showing {} candies based on your filters. Win percent: median {}, \
         range {} - {}, middle 90% {} - {}, std dev {:.2}.",
        stats.count,
        format_percent(stats.median),
        format_percent(stats.min),
        format_percent(stats.max),
        format_percent(stats.p05),
        format_percent(stats.p95),
        stats.std,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::tests::sample_frame;
    use crate::data::Choice;

    #[test]
    fn overview_uses_config_thresholds() {
        let df = sample_frame();
        let config = AppConfig {
            top_n: 4,
            ..AppConfig::default()
        };
        let overview = OverviewData::compute(&df, &config).unwrap();

        assert_eq!(overview.top.len(), 4);
        assert_eq!(overview.kpis.total_candies, 12);
        assert_eq!(overview.best_value.len(), 2);
        assert_eq!(overview.breakdowns.len(), 9);
        assert!(overview.breakdown(Attribute::Chocolate).is_some());
        assert_eq!(overview.value.as_ref().unwrap().entries.len(), 12);
    }

    #[test]
    fn filtered_view_reports_empty_results() {
        let df = sample_frame();
        let settings = FilterSettings::default()
            .with_choice(Attribute::Chocolate, Choice::Yes)
            .with_choice(Attribute::Fruity, Choice::Yes);
        let filtered = FilteredData::compute(&df, &settings).unwrap();
        assert!(filtered.is_empty());
        assert!(filtered.bars.is_empty());
        assert_eq!(filtered.win_stats.count, 0);
    }

    #[test]
    fn win_summary_reports_spread() {
        let stats = StatsCalculator::compute_descriptive_stats(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        assert_eq!(
            win_summary(&stats),
            "Showing 5 candies based on your filters. Win percent: median 30.00%, \
             range 10.00% - 50.00%, middle 90% 12.00% - 48.00%, std dev 15.81."
        );
    }
}
