//! Chart Plotter Module
//! Turns candy tables into chart points and draws them with egui_plot.

use crate::data::processor::{ComparisonSeries, COMPARISON_AXES};
use crate::data::schema::{Attribute, CandyRecord};
use crate::stats::{AttributeBreakdown, GroupMean, Quadrant, QuadrantAnalysis, Trendline};
use egui::{Align2, Color32, RichText};
use egui_plot::{
    Bar, BarChart, HLine, Legend, Line, LineStyle, Plot, PlotPoint, PlotPoints, Points, Polygon,
    Text, VLine,
};
use std::f64::consts::{FRAC_PI_2, TAU};

pub const PRIMARY: Color32 = Color32::from_rgb(255, 107, 53); // Orange
pub const SECONDARY: Color32 = Color32::from_rgb(114, 9, 183); // Purple
pub const ACCENT: Color32 = Color32::from_rgb(58, 134, 255); // Blue

pub const PALETTE: [Color32; 8] = [
    PRIMARY,
    SECONDARY,
    ACCENT,
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(243, 156, 18),  // Amber
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(121, 85, 72),   // Brown
];

const CHART_HEIGHT: f32 = 320.0;

/// One mark on a chart: position, marker size, colour value and label.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color_value: f64,
    pub label: String,
}

impl ChartPoint {
    /// Sugar (x) against price (y), sized and coloured by win percent.
    pub fn sugar_vs_price(records: &[CandyRecord]) -> Vec<ChartPoint> {
        records
            .iter()
            .map(|r| ChartPoint {
                x: r.sugar_percent,
                y: r.price_percent,
                size: r.win_percent,
                color_value: r.win_percent,
                label: r.name.clone(),
            })
            .collect()
    }

    /// Sugar (x) against win percent (y).
    pub fn sugar_vs_win(records: &[CandyRecord]) -> Vec<ChartPoint> {
        records
            .iter()
            .map(|r| ChartPoint {
                x: r.sugar_percent,
                y: r.win_percent,
                size: 1.0,
                color_value: r.win_percent,
                label: r.name.clone(),
            })
            .collect()
    }

    /// Price (x) against win percent (y) for the value analysis.
    pub fn value_analysis(analysis: &QuadrantAnalysis) -> Vec<ChartPoint> {
        analysis
            .entries
            .iter()
            .map(|(p, _)| ChartPoint {
                x: p.price_percent,
                y: p.win_percent,
                size: 1.0,
                color_value: p.win_percent,
                label: p.name.clone(),
            })
            .collect()
    }

    /// Win percent per candy, one bar slot each, in input order.
    pub fn win_bars(records: &[CandyRecord]) -> Vec<ChartPoint> {
        records
            .iter()
            .enumerate()
            .map(|(i, r)| ChartPoint {
                x: i as f64,
                y: r.win_percent,
                size: 1.0,
                color_value: r.win_percent,
                label: r.name.clone(),
            })
            .collect()
    }
}

/// Yes/No share of an attribute as (label, fraction) slices, empty slices dropped.
pub fn pie_slices(breakdown: &AttributeBreakdown) -> Vec<(String, f64)> {
    let total = (breakdown.yes_count + breakdown.no_count) as f64;
    if total == 0.0 {
        return Vec::new();
    }
    [("Yes", breakdown.yes_count), ("No", breakdown.no_count)]
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .map(|(label, n)| (label.to_string(), n as f64 / total))
        .collect()
}

/// Vertex of a radar axis: `axis` of `axes`, at `value` on a 0-100 scale.
pub fn radar_vertex(axis: usize, axes: usize, value: f64) -> [f64; 2] {
    let angle = FRAC_PI_2 + TAU * axis as f64 / axes as f64;
    let r = value / 100.0;
    [r * angle.cos(), r * angle.sin()]
}

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Orange ramp from light (unpopular) to dark (popular).
    pub fn win_color(win: f64) -> Color32 {
        let t = (win / 100.0).clamp(0.0, 1.0) as f32;
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color32::from_rgb(lerp(255, 166), lerp(214, 54), lerp(170, 3))
    }

    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Bar chart of win percent per candy, candy names on the x axis.
    pub fn draw_win_bars(ui: &mut egui::Ui, id: &str, points: &[ChartPoint]) {
        let labels: Vec<String> = points.iter().map(|p| p.label.clone()).collect();
        let bars: Vec<Bar> = points
            .iter()
            .map(|p| {
                Bar::new(p.x, p.y)
                    .name(&p.label)
                    .width(0.7)
                    .fill(PRIMARY.gamma_multiply(0.85))
            })
            .collect();

        Plot::new(id)
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_scroll(false)
            .include_y(0.0)
            .include_y(100.0)
            .y_axis_label("Win Percent")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                    return String::new();
                }
                labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name("Win %")
                        .element_formatter(Box::new(|bar, _chart| {
                            format!("{}\n{:.2}%", bar.name, bar.value)
                        })),
                );
            });
    }

    /// Pie chart of an attribute's Yes/No split.
    pub fn draw_attribute_pie(ui: &mut egui::Ui, id: &str, breakdown: &AttributeBreakdown) {
        let slices = pie_slices(breakdown);

        Plot::new(id)
            .height(CHART_HEIGHT)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                let mut start = FRAC_PI_2;
                for (i, (label, fraction)) in slices.iter().enumerate() {
                    let sweep = fraction * TAU;
                    let color = [PRIMARY, SECONDARY][i % 2];
                    let name = format!("{} {}", breakdown.attribute.label(), label);

                    // Quarter-turn wedges keep every polygon convex.
                    let pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
                    for piece in 0..pieces {
                        let a0 = start + sweep * piece as f64 / pieces as f64;
                        let a1 = start + sweep * (piece + 1) as f64 / pieces as f64;
                        let mut wedge = vec![[0.0, 0.0]];
                        for step in 0..=16 {
                            let a = a0 + (a1 - a0) * step as f64 / 16.0;
                            wedge.push([a.cos(), a.sin()]);
                        }
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::from(wedge))
                                .fill_color(color.gamma_multiply(0.8))
                                .stroke(egui::Stroke::new(1.0, Color32::BLACK))
                                .name(&name),
                        );
                    }

                    let mid = start + sweep / 2.0;
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(0.6 * mid.cos(), 0.6 * mid.sin()),
                            RichText::new(format!("{label}\n{:.1}%", fraction * 100.0))
                                .color(Color32::WHITE)
                                .strong(),
                        )
                        .anchor(Align2::CENTER_CENTER),
                    );
                    start += sweep;
                }
            });
    }

    /// Scatter plot with marker radius following `ChartPoint::size`.
    pub fn draw_sized_scatter(
        ui: &mut egui::Ui,
        id: &str,
        points: &[ChartPoint],
        x_label: &str,
        y_label: &str,
    ) {
        Plot::new(id)
            .height(CHART_HEIGHT)
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .include_x(0.0)
            .include_x(100.0)
            .include_y(0.0)
            .include_y(100.0)
            .show(ui, |plot_ui| {
                for p in points {
                    plot_ui.points(
                        Points::new(vec![[p.x, p.y]])
                            .radius((3.0 + p.size / 8.0) as f32)
                            .color(Self::win_color(p.color_value).gamma_multiply(0.7))
                            .name(&p.label),
                    );
                }
            });
    }

    /// Value analysis: price vs win with median lines and quadrant captions.
    pub fn draw_value_analysis(ui: &mut egui::Ui, id: &str, analysis: &QuadrantAnalysis) {
        let points = ChartPoint::value_analysis(analysis);
        let (mp, mw) = (analysis.median_price, analysis.median_win);

        Plot::new(id)
            .height(CHART_HEIGHT + 120.0)
            .x_axis_label("Price Percent")
            .y_axis_label("Win Percent")
            .include_x(0.0)
            .include_x(100.0)
            .include_y(0.0)
            .include_y(100.0)
            .show(ui, |plot_ui| {
                for p in &points {
                    plot_ui.points(
                        Points::new(vec![[p.x, p.y]])
                            .radius(5.0)
                            .color(Self::win_color(p.color_value))
                            .name(&p.label),
                    );
                    plot_ui.text(
                        Text::new(PlotPoint::new(p.x, p.y + 2.0), RichText::new(&p.label).size(9.0))
                            .anchor(Align2::CENTER_BOTTOM),
                    );
                }

                plot_ui.hline(
                    HLine::new(mw)
                        .style(LineStyle::dashed_loose())
                        .color(Color32::GRAY)
                        .name("Median Win %"),
                );
                plot_ui.vline(
                    VLine::new(mp)
                        .style(LineStyle::dashed_loose())
                        .color(Color32::GRAY)
                        .name("Median Price"),
                );

                for quadrant in Quadrant::ALL {
                    let (x, y, anchor) = match quadrant {
                        Quadrant::HighValue => (mp / 2.0, 98.0, Align2::CENTER_TOP),
                        Quadrant::PopularButExpensive => {
                            ((mp + 100.0) / 2.0, 98.0, Align2::CENTER_TOP)
                        }
                        Quadrant::LowValue => (mp / 2.0, 2.0, Align2::CENTER_BOTTOM),
                        Quadrant::Overpriced => ((mp + 100.0) / 2.0, 2.0, Align2::CENTER_BOTTOM),
                    };
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(x, y),
                            RichText::new(quadrant.label()).size(14.0).strong(),
                        )
                        .anchor(anchor),
                    );
                }
            });
    }

    /// Scatter of sugar vs win percent with an optional least-squares line.
    pub fn draw_trend_scatter(
        ui: &mut egui::Ui,
        id: &str,
        points: &[ChartPoint],
        trend: Option<Trendline>,
    ) {
        let scatter: PlotPoints = points.iter().map(|p| [p.x, p.y]).collect();

        Plot::new(id)
            .height(CHART_HEIGHT)
            .x_axis_label("Sugar Percent")
            .y_axis_label("Win Percent")
            .include_x(0.0)
            .include_x(100.0)
            .include_y(0.0)
            .include_y(100.0)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                plot_ui.points(
                    Points::new(scatter)
                        .radius(4.0)
                        .color(PRIMARY.gamma_multiply(0.6))
                        .name("Candies"),
                );
                if let Some(line) = trend {
                    plot_ui.line(
                        Line::new(vec![[0.0, line.predict(0.0)], [100.0, line.predict(100.0)]])
                            .color(ACCENT)
                            .width(2.0)
                            .name(format!("Trend (r² = {:.2})", line.r_squared)),
                    );
                }
            });
    }

    /// Grouped bars of mean win percent by chocolate, split by fruity.
    pub fn draw_chocolate_fruity(ui: &mut egui::Ui, id: &str, groups: &[GroupMean]) {
        Plot::new(id)
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_scroll(false)
            .include_y(0.0)
            .y_axis_label("Average Win Percent")
            .x_axis_formatter(|mark, _range| match mark.value.round() as i64 {
                0 if mark.value.fract() == 0.0 => "Not Chocolate".to_string(),
                1 if mark.value.fract() == 0.0 => "Chocolate".to_string(),
                _ => String::new(),
            })
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for (i, fruity) in [false, true].into_iter().enumerate() {
                    let offset = if fruity { 0.2 } else { -0.2 };
                    let bars: Vec<Bar> = groups
                        .iter()
                        .filter(|g| g.fruity == fruity)
                        .map(|g| {
                            let x = if g.chocolate { 1.0 } else { 0.0 };
                            Bar::new(x + offset, g.mean_win)
                                .width(0.35)
                                .name(format!("n = {}", g.count))
                        })
                        .collect();
                    let name = if fruity { "Fruity" } else { "Not Fruity" };
                    plot_ui.bar_chart(
                        BarChart::new(bars)
                            .color(Self::series_color(i))
                            .name(name),
                    );
                }
            });
    }

    /// Grouped bars of win, sugar and price for each compared candy.
    pub fn draw_comparison_bars(ui: &mut egui::Ui, id: &str, series: &[ComparisonSeries]) {
        let n = series.len().max(1) as f64;
        let slot = 0.8 / n;

        Plot::new(id)
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_scroll(false)
            .include_y(0.0)
            .include_y(100.0)
            .y_axis_label("Percentage")
            .x_axis_formatter(|mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                    return String::new();
                }
                COMPARISON_AXES
                    .get(idx as usize)
                    .map(|s| s.to_string())
                    .unwrap_or_default()
            })
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for (i, candy) in series.iter().enumerate() {
                    let offset = -0.4 + slot * (i as f64 + 0.5);
                    let bars: Vec<Bar> = candy
                        .values
                        .iter()
                        .enumerate()
                        .map(|(axis, v)| {
                            Bar::new(axis as f64 + offset, *v)
                                .width(slot * 0.9)
                                .name(COMPARISON_AXES[axis])
                        })
                        .collect();
                    plot_ui.bar_chart(
                        BarChart::new(bars)
                            .color(Self::series_color(i))
                            .name(&candy.name),
                    );
                }
            });
    }

    /// Radar chart of win, sugar and price for each compared candy.
    pub fn draw_comparison_radar(ui: &mut egui::Ui, id: &str, series: &[ComparisonSeries]) {
        let axes = COMPARISON_AXES.len();

        Plot::new(id)
            .height(CHART_HEIGHT)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for ring in [25.0, 50.0, 75.0, 100.0] {
                    let outline: PlotPoints = (0..=axes)
                        .map(|a| radar_vertex(a % axes, axes, ring))
                        .collect();
                    plot_ui.line(
                        Line::new(outline)
                            .color(Color32::GRAY.gamma_multiply(0.5))
                            .width(1.0),
                    );
                }
                for (a, label) in COMPARISON_AXES.iter().enumerate() {
                    let tip = radar_vertex(a, axes, 100.0);
                    plot_ui.line(
                        Line::new(vec![[0.0, 0.0], tip])
                            .color(Color32::GRAY.gamma_multiply(0.5))
                            .width(1.0),
                    );
                    let pos = radar_vertex(a, axes, 112.0);
                    plot_ui.text(
                        Text::new(PlotPoint::new(pos[0], pos[1]), RichText::new(*label).strong())
                            .anchor(Align2::CENTER_CENTER),
                    );
                }

                for (i, candy) in series.iter().enumerate() {
                    let color = Self::series_color(i);
                    let vertices: Vec<[f64; 2]> = candy
                        .values
                        .iter()
                        .enumerate()
                        .map(|(a, v)| radar_vertex(a, axes, *v))
                        .collect();
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(vertices))
                            .fill_color(color.gamma_multiply(0.25))
                            .stroke(egui::Stroke::new(2.0, color))
                            .name(&candy.name),
                    );
                }
            });
    }

    /// Attribute label of a breakdown row, used as a chart title.
    pub fn distribution_title(attribute: Attribute) -> String {
        format!("{} vs. Non-{} Candies", attribute.label(), attribute.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::tests::sample_frame;
    use crate::stats::{StatsCalculator, ValuePoint};
    use approx::assert_relative_eq;

    fn sample_records() -> Vec<CandyRecord> {
        CandyRecord::from_frame(&sample_frame()).unwrap()
    }

    #[test]
    fn sugar_vs_price_sizes_by_win() {
        let points = ChartPoint::sugar_vs_price(&sample_records());
        assert_eq!(points.len(), 12);
        let twix = points.iter().find(|p| p.label == "Twix").unwrap();
        assert_relative_eq!(twix.x, 54.6, epsilon = 1e-9);
        assert_relative_eq!(twix.y, 90.6, epsilon = 1e-9);
        assert_relative_eq!(twix.size, 81.642914);
    }

    #[test]
    fn win_bars_use_row_position() {
        let points = ChartPoint::win_bars(&sample_records());
        assert_eq!(points[0].label, "100 Grand");
        assert_eq!(points[0].x, 0.0);
        assert_eq!(points[11].x, 11.0);
    }

    #[test]
    fn value_points_follow_price_then_win() {
        let points = vec![ValuePoint {
            name: "A".into(),
            win_percent: 80.0,
            price_percent: 20.0,
        }];
        let analysis = StatsCalculator::classify_quadrants(&points).unwrap();
        let chart = ChartPoint::value_analysis(&analysis);
        assert_eq!((chart[0].x, chart[0].y), (20.0, 80.0));
    }

    #[test]
    fn pie_slices_sum_to_one() {
        let breakdown =
            StatsCalculator::attribute_breakdown(&sample_records(), Attribute::Pluribus);
        let slices = pie_slices(&breakdown);
        assert_eq!(slices.len(), 2);
        assert_relative_eq!(slices.iter().map(|(_, f)| f).sum::<f64>(), 1.0);
        assert_relative_eq!(slices[0].1, 3.0 / 12.0);
    }

    #[test]
    fn radar_vertices_start_at_top() {
        let top = radar_vertex(0, 3, 100.0);
        assert_relative_eq!(top[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(top[1], 1.0, epsilon = 1e-12);
        let half = radar_vertex(1, 3, 50.0);
        assert_relative_eq!((half[0].powi(2) + half[1].powi(2)).sqrt(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn win_color_darkens_with_popularity() {
        assert_eq!(ChartPlotter::win_color(0.0), Color32::from_rgb(255, 214, 170));
        assert_eq!(ChartPlotter::win_color(100.0), Color32::from_rgb(166, 54, 3));
        assert_eq!(ChartPlotter::win_color(250.0), ChartPlotter::win_color(100.0));
    }
}
