//! Domain types for the bank comparison chart.

pub mod bank;
pub mod dataset;
pub mod price;

pub use bank::{Bank, BANKS};
pub use dataset::{ChartColumn, ChartDataset, NormalizedPoint, NormalizedSeries};
pub use price::{PricePoint, SymbolSeries};
