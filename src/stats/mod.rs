//! Stats module - Aggregates and value analysis

mod calculator;

pub use calculator::{
    AttributeBreakdown, GroupMean, Kpis, Quadrant, QuadrantAnalysis, StatsCalculator,
    SummaryStats, Trendline, ValuePoint,
};
