//! Data module - CSV loading, filtering and projections

pub mod filter;
pub mod loader;
pub mod processor;
pub mod schema;

pub use filter::{filter_candies, Choice, FilterSettings};
pub use loader::CandyLoader;
pub use processor::{ComparisonSeries, ComparisonTable, DataProcessor};
pub use schema::{Attribute, CandyRecord};
