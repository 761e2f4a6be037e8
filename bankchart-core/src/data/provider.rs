//! Price provider trait and structured error types.
//!
//! The PriceProvider trait abstracts over where adjusted closes come from
//! (Yahoo Finance, a directory of CSV files) so the loader can swap sources
//! and tests can run without a network.

use crate::domain::SymbolSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

/// Structured error types for data retrieval.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("missing sample data file: {}", path.display())]
    MissingFixture { path: PathBuf },

    #[error("malformed CSV in {}: {reason}", path.display())]
    MalformedCsv { path: PathBuf, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful fetch for a single ticker.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub ticker: String,
    pub series: SymbolSeries,
    pub source: DataSource,
}

/// Where a ticker's prices came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    SampleCsv,
    FallbackCsv,
}

/// Trait for price providers.
///
/// Implementations return a typed series; untyped rows never leave them.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily adjusted closes for a ticker over `[start, end]`.
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate)
        -> Result<FetchResult, DataError>;

    /// Whether the provider can currently serve requests.
    fn is_available(&self) -> bool {
        true
    }
}

/// Progress callback for multi-ticker loads.
pub trait LoadProgress: Send {
    /// Called when starting to load a ticker.
    fn on_start(&self, ticker: &str, index: usize, total: usize);

    /// Called when a ticker load completes, with its source on success.
    fn on_complete(
        &self,
        ticker: &str,
        index: usize,
        total: usize,
        outcome: Result<DataSource, &DataError>,
    );

    /// Called when every ticker has been attempted.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that emits tracing events.
pub struct TracingProgress;

impl LoadProgress for TracingProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        info!("[{}/{}] loading {ticker}", index + 1, total);
    }

    fn on_complete(
        &self,
        ticker: &str,
        _index: usize,
        _total: usize,
        outcome: Result<DataSource, &DataError>,
    ) {
        match outcome {
            Ok(source) => info!(ticker, ?source, "loaded"),
            Err(e) => warn!(ticker, error = %e, "load failed"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        info!("load complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}
