//! Bankchart core: loaders, normalization pipeline and chart emitter for the
//! top 10 Malaysian banks relative performance chart.
//!
//! This crate contains:
//! - Domain types (bank roster, price series, chart dataset)
//! - Price loaders: Yahoo Finance, CSV sample fixtures, fallback mirrors
//! - The pipeline: union calendar, baseline normalization, rank-ordered assembly
//! - Chart.js payload and self-contained HTML page
//! - Run configuration and the weekday refresh schedule

pub mod chart;
pub mod config;
pub mod data;
pub mod domain;
pub mod pipeline;
pub mod schedule;

pub use config::{ChartConfig, ConfigError, ProviderSettings, ScheduleSettings};
pub use pipeline::{run_pipeline, ChartReport, PipelineError};
pub use schedule::{check_schedule, ScheduleDecision};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types handed across rayon workers are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::SymbolSeries>();
        require_sync::<domain::SymbolSeries>();
        require_send::<domain::NormalizedSeries>();
        require_sync::<domain::NormalizedSeries>();
        require_send::<domain::ChartDataset>();
        require_sync::<domain::ChartDataset>();
        require_send::<PipelineError>();
        require_sync::<PipelineError>();
        require_send::<ChartReport>();
        require_sync::<ChartReport>();

        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
        require_send::<data::CsvDirectory>();
        require_sync::<data::CsvDirectory>();
    }

    /// The provider seam stays object-safe so the loader can take `&dyn`.
    #[test]
    fn price_provider_is_object_safe() {
        fn _accepts(_: &dyn data::PriceProvider) {}
    }
}
