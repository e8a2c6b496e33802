//! Statistics Calculator Module
//! Medians, value quadrants, headline figures and per-attribute comparisons.

use crate::data::schema::{Attribute, CandyRecord, NAME_COL, PRICE_COL, WIN_COL};
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::{Data, Median, Statistics};

/// Significance threshold for t-test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Descriptive statistics of a set of values.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub p05: f64,
}

impl Default for SummaryStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            p95: f64::NAN,
            p05: f64::NAN,
        }
    }
}

/// One point of the value-analysis scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuePoint {
    pub name: String,
    pub win_percent: f64,
    pub price_percent: f64,
}

impl ValuePoint {
    /// Read points from a frame holding name, win and price columns.
    pub fn from_frame(df: &DataFrame) -> PolarsResult<Vec<ValuePoint>> {
        let names = df.column(NAME_COL)?.str()?;
        let win = df.column(WIN_COL)?.f64()?;
        let price = df.column(PRICE_COL)?.f64()?;

        Ok(names
            .into_iter()
            .zip(win)
            .zip(price)
            .filter_map(|((n, w), p)| {
                Some(ValuePoint {
                    name: n?.to_string(),
                    win_percent: w?,
                    price_percent: p?,
                })
            })
            .collect())
    }
}

/// Position relative to the price and popularity medians.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Quadrant {
    HighValue,
    PopularButExpensive,
    LowValue,
    Overpriced,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::HighValue,
        Quadrant::PopularButExpensive,
        Quadrant::LowValue,
        Quadrant::Overpriced,
    ];

    /// A price on the median counts as cheap, a win on the median as popular.
    pub fn classify(price: f64, win: f64, median_price: f64, median_win: f64) -> Quadrant {
        match (price <= median_price, win >= median_win) {
            (true, true) => Quadrant::HighValue,
            (false, true) => Quadrant::PopularButExpensive,
            (true, false) => Quadrant::LowValue,
            (false, false) => Quadrant::Overpriced,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quadrant::HighValue => "High Value",
            Quadrant::PopularButExpensive => "Popular but Expensive",
            Quadrant::LowValue => "Low Value",
            Quadrant::Overpriced => "Overpriced",
        }
    }
}

/// Medians of both axes and the quadrant of every point.
#[derive(Debug, Clone, Serialize)]
pub struct QuadrantAnalysis {
    pub median_win: f64,
    pub median_price: f64,
    pub entries: Vec<(ValuePoint, Quadrant)>,
}

impl QuadrantAnalysis {
    pub fn count(&self, quadrant: Quadrant) -> usize {
        self.entries.iter().filter(|(_, q)| *q == quadrant).count()
    }

    pub fn quadrant_of(&self, name: &str) -> Option<Quadrant> {
        self.entries
            .iter()
            .find(|(p, _)| p.name == name)
            .map(|(_, q)| *q)
    }
}

/// Headline figures shown above the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Kpis {
    pub total_candies: usize,
    pub average_win: f64,
    pub top_candy: Option<String>,
}

/// Win-percent comparison between candies with and without an attribute.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeBreakdown {
    pub attribute: Attribute,
    pub yes_count: usize,
    pub no_count: usize,
    pub yes_mean_win: f64,
    pub no_mean_win: f64,
    pub p_value: Option<f64>,
    pub is_significant: bool,
}

/// Mean win percent of one chocolate/fruity combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub chocolate: bool,
    pub fruity: bool,
    pub count: usize,
    pub mean_win: f64,
}

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trendline {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl Trendline {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Handles statistical calculations over the candy table.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Median of `values`, `None` when empty.
    pub fn median(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(Data::new(values.to_vec()).median())
    }

    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> SummaryStats {
        let n = values.len();
        if n == 0 {
            return SummaryStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = values.iter().mean();
        let std = if n > 1 { values.iter().std_dev() } else { 0.0 };

        SummaryStats {
            count: n,
            mean,
            median: Self::median(values).unwrap_or(f64::NAN),
            std,
            min: sorted[0],
            max: sorted[n - 1],
            p95: Self::percentile(&sorted, 95.0),
            p05: Self::percentile(&sorted, 5.0),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Classify every point against the medians of price and win percent.
    pub fn classify_quadrants(points: &[ValuePoint]) -> Option<QuadrantAnalysis> {
        let wins: Vec<f64> = points.iter().map(|p| p.win_percent).collect();
        let prices: Vec<f64> = points.iter().map(|p| p.price_percent).collect();
        let median_win = Self::median(&wins)?;
        let median_price = Self::median(&prices)?;

        let entries = points
            .iter()
            .map(|p| {
                let q = Quadrant::classify(p.price_percent, p.win_percent, median_price, median_win);
                (p.clone(), q)
            })
            .collect();

        Some(QuadrantAnalysis {
            median_win,
            median_price,
            entries,
        })
    }

    /// Total count, mean win percent and the most popular candy.
    pub fn kpis(records: &[CandyRecord]) -> Kpis {
        let top_candy = records
            .iter()
            .max_by(|a, b| a.win_percent.total_cmp(&b.win_percent))
            .map(|r| r.name.clone());

        Kpis {
            total_candies: records.len(),
            average_win: if records.is_empty() {
                f64::NAN
            } else {
                records.iter().map(|r| r.win_percent).mean()
            },
            top_candy,
        }
    }

    /// Compare win percent of candies with and without `attribute` (Welch's t-test).
    pub fn attribute_breakdown(records: &[CandyRecord], attribute: Attribute) -> AttributeBreakdown {
        let (yes, no): (Vec<&CandyRecord>, Vec<&CandyRecord>) =
            records.iter().partition(|r| r.has(attribute));
        let yes_wins: Vec<f64> = yes.iter().map(|r| r.win_percent).collect();
        let no_wins: Vec<f64> = no.iter().map(|r| r.win_percent).collect();

        let (p_value, is_significant) = Self::perform_ttest(&yes_wins, &no_wins);
        AttributeBreakdown {
            attribute,
            yes_count: yes_wins.len(),
            no_count: no_wins.len(),
            yes_mean_win: Self::compute_descriptive_stats(&yes_wins).mean,
            no_mean_win: Self::compute_descriptive_stats(&no_wins).mean,
            p_value: (!p_value.is_nan()).then_some(p_value),
            is_significant,
        }
    }

    /// Breakdowns for all nine attributes, computed in parallel.
    pub fn all_attribute_breakdowns(records: &[CandyRecord]) -> Vec<AttributeBreakdown> {
        Attribute::ALL
            .par_iter()
            .map(|attr| Self::attribute_breakdown(records, *attr))
            .collect()
    }

    /// Perform Welch's t-test (independent samples, unequal variance).
    pub fn perform_ttest(group_values: &[f64], control_values: &[f64]) -> (f64, bool) {
        let n1 = group_values.len() as f64;
        let n2 = control_values.len() as f64;

        if n1 < 2.0 || n2 < 2.0 {
            return (f64::NAN, false);
        }

        let mean1 = group_values.iter().mean();
        let mean2 = control_values.iter().mean();
        let var1 = group_values.iter().variance();
        let var2 = control_values.iter().variance();

        let se = (var1 / n1 + var2 / n2).sqrt();
        if se == 0.0 {
            return (1.0, false);
        }

        let t = (mean1 - mean2) / se;

        // Welch-Satterthwaite degrees of freedom
        let df_num = (var1 / n1 + var2 / n2).powi(2);
        let df_denom = (var1 / n1).powi(2) / (n1 - 1.0) + (var2 / n2).powi(2) / (n2 - 1.0);
        let df = df_num / df_denom;

        if let Ok(dist) = StudentsT::new(0.0, 1.0, df) {
            let p_value = 2.0 * (1.0 - dist.cdf(t.abs()));
            (p_value, p_value <= SIGNIFICANCE_THRESHOLD)
        } else {
            (f64::NAN, false)
        }
    }

    /// Mean win percent per (chocolate, fruity) combination present in the data.
    pub fn chocolate_fruity_means(records: &[CandyRecord]) -> Vec<GroupMean> {
        let mut groups = Vec::new();
        for chocolate in [false, true] {
            for fruity in [false, true] {
                let wins: Vec<f64> = records
                    .iter()
                    .filter(|r| {
                        r.has(Attribute::Chocolate) == chocolate && r.has(Attribute::Fruity) == fruity
                    })
                    .map(|r| r.win_percent)
                    .collect();
                if wins.is_empty() {
                    continue;
                }
                groups.push(GroupMean {
                    chocolate,
                    fruity,
                    count: wins.len(),
                    mean_win: wins.iter().mean(),
                });
            }
        }
        groups
    }

    /// Ordinary least squares fit of `ys` on `xs`.
    ///
    /// `None` for fewer than two points or when every x is identical.
    pub fn linear_trend(xs: &[f64], ys: &[f64]) -> Option<Trendline> {
        let n = xs.len().min(ys.len());
        if n < 2 {
            return None;
        }
        let (xs, ys) = (&xs[..n], &ys[..n]);

        let mean_x = xs.iter().mean();
        let mean_y = ys.iter().mean();
        let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
        if sxx == 0.0 {
            return None;
        }
        let sxy: f64 = xs
            .iter()
            .zip(ys)
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();
        let syy: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        let r_squared = if syy == 0.0 {
            1.0
        } else {
            (sxy * sxy) / (sxx * syy)
        };

        Some(Trendline {
            slope,
            intercept,
            r_squared,
        })
    }

    /// Trendline of win percent against sugar percentile.
    pub fn sugar_popularity_trend(records: &[CandyRecord]) -> Option<Trendline> {
        let sugar: Vec<f64> = records.iter().map(|r| r.sugar_percent).collect();
        let win: Vec<f64> = records.iter().map(|r| r.win_percent).collect();
        Self::linear_trend(&sugar, &win)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::tests::sample_frame;
    use crate::data::processor::DataProcessor;
    use approx::assert_relative_eq;

    fn point(name: &str, win: f64, price: f64) -> ValuePoint {
        ValuePoint {
            name: name.to_string(),
            win_percent: win,
            price_percent: price,
        }
    }

    fn sample_records() -> Vec<CandyRecord> {
        CandyRecord::from_frame(&sample_frame()).unwrap()
    }

    #[test]
    fn median_handles_even_odd_and_empty() {
        assert_eq!(StatsCalculator::median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(StatsCalculator::median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(StatsCalculator::median(&[]), None);
    }

    #[test]
    fn two_point_example_splits_diagonally() {
        let points = vec![point("A", 80.0, 20.0), point("B", 30.0, 80.0)];
        let analysis = StatsCalculator::classify_quadrants(&points).unwrap();

        assert_relative_eq!(analysis.median_win, 55.0);
        assert_relative_eq!(analysis.median_price, 50.0);
        assert_eq!(analysis.quadrant_of("A"), Some(Quadrant::HighValue));
        assert_eq!(analysis.quadrant_of("B"), Some(Quadrant::Overpriced));
    }

    #[test]
    fn median_ties_go_cheap_and_popular() {
        let points = vec![
            point("low", 10.0, 10.0),
            point("mid", 20.0, 20.0),
            point("high", 30.0, 30.0),
        ];
        let analysis = StatsCalculator::classify_quadrants(&points).unwrap();
        assert_eq!(analysis.quadrant_of("mid"), Some(Quadrant::HighValue));
        assert_eq!(analysis.quadrant_of("low"), Some(Quadrant::LowValue));
        assert_eq!(analysis.quadrant_of("high"), Some(Quadrant::PopularButExpensive));
    }

    #[test]
    fn quadrants_partition_the_dataset() {
        let df = sample_frame();
        let projection = DataProcessor::value_projection(&df).unwrap();
        let points = ValuePoint::from_frame(&projection).unwrap();
        let analysis = StatsCalculator::classify_quadrants(&points).unwrap();

        assert_eq!(analysis.entries.len(), df.height());
        let total: usize = Quadrant::ALL.iter().map(|q| analysis.count(*q)).sum();
        assert_eq!(total, df.height());
    }

    #[test]
    fn empty_points_have_no_analysis() {
        assert!(StatsCalculator::classify_quadrants(&[]).is_none());
    }

    #[test]
    fn kpis_report_total_mean_and_top() {
        let kpis = StatsCalculator::kpis(&sample_records());
        assert_eq!(kpis.total_candies, 12);
        assert_eq!(kpis.top_candy.as_deref(), Some("Reese's Peanut Butter cup"));
        assert!(kpis.average_win > 50.0 && kpis.average_win < 70.0);

        let empty = StatsCalculator::kpis(&[]);
        assert_eq!(empty.total_candies, 0);
        assert!(empty.top_candy.is_none());
    }

    #[test]
    fn attribute_breakdown_counts_both_sides() {
        let records = sample_records();
        let chocolate = StatsCalculator::attribute_breakdown(&records, Attribute::Chocolate);
        assert_eq!(chocolate.yes_count, 6);
        assert_eq!(chocolate.no_count, 6);
        assert!(chocolate.yes_mean_win > chocolate.no_mean_win);
        assert!(chocolate.p_value.is_some());

        let all = StatsCalculator::all_attribute_breakdowns(&records);
        assert_eq!(all.len(), 9);
        assert!(all.iter().all(|b| b.yes_count + b.no_count == 12));
        assert_eq!(all[8].attribute, Attribute::Pluribus);
    }

    #[test]
    fn ttest_needs_two_values_per_side() {
        let (p, sig) = StatsCalculator::perform_ttest(&[1.0], &[1.0, 2.0]);
        assert!(p.is_nan());
        assert!(!sig);
    }

    #[test]
    fn chocolate_fruity_groups_skip_absent_combinations() {
        let groups = StatsCalculator::chocolate_fruity_means(&sample_records());
        // The sample has no candy that is both chocolate and fruity.
        assert_eq!(groups.len(), 3);
        assert!(!groups.iter().any(|g| g.chocolate && g.fruity));
        let plain = groups
            .iter()
            .find(|g| !g.chocolate && !g.fruity)
            .unwrap();
        assert_eq!(plain.count, 1);
        assert_relative_eq!(plain.mean_win, 32.261086);
    }

    #[test]
    fn linear_trend_recovers_exact_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 5.0, 7.0];
        let line = StatsCalculator::linear_trend(&xs, &ys).unwrap();
        assert_relative_eq!(line.slope, 2.0, epsilon = 1e-12);
        assert_relative_eq!(line.intercept, 1.0, epsilon = 1e-12);
        assert_relative_eq!(line.r_squared, 1.0, epsilon = 1e-12);
        assert_relative_eq!(line.predict(10.0), 21.0, epsilon = 1e-12);
    }

    #[test]
    fn linear_trend_is_undefined_for_degenerate_input() {
        assert!(StatsCalculator::linear_trend(&[1.0], &[2.0]).is_none());
        assert!(StatsCalculator::linear_trend(&[5.0, 5.0], &[1.0, 2.0]).is_none());
        assert!(StatsCalculator::sugar_popularity_trend(&sample_records()).is_some());
    }

    #[test]
    fn descriptive_stats_match_hand_values() {
        let stats = StatsCalculator::compute_descriptive_stats(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(stats.count, 5);
        assert_relative_eq!(stats.mean, 3.0);
        assert_relative_eq!(stats.median, 3.0);
        assert_relative_eq!(stats.min, 1.0);
        assert_relative_eq!(stats.max, 5.0);
        assert_relative_eq!(stats.std, 2.5f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(stats.p95, 4.8, epsilon = 1e-12);
    }
}
