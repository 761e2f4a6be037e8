//! The normalization core: pure, in-memory transformations from loaded
//! price series to the chart dataset.
//!
//! Stages run in order and each returns a fresh value:
//! - `align`: union trading calendar across all symbols
//! - `normalize`: per-symbol rescaling against the baseline price
//! - `assemble`: rank-ordered, date-aligned table with explicit gaps
//! - `run`: driver that isolates per-symbol faults

pub mod align;
pub mod assemble;
pub mod error;
pub mod normalize;
pub mod run;

pub use align::{build_calendar, TradingCalendar};
pub use assemble::assemble;
pub use error::PipelineError;
pub use normalize::normalize;
pub use run::{run_pipeline, ChartReport, SymbolFault};
