//! Error taxonomy of the normalization pipeline.

use chrono::NaiveDate;
use thiserror::Error;

/// Faults raised inside the pipeline.
///
/// `InsufficientData` aborts a run. `InvalidPrice` is scoped to one symbol:
/// the run driver records it and carries on with the remaining symbols.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("invalid adjusted close for {symbol} on {date}: {value}")]
    InvalidPrice {
        symbol: String,
        date: NaiveDate,
        value: f64,
    },
}

impl PipelineError {
    /// True for faults that end the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::InsufficientData(_))
    }
}
