//! Trading calendar construction.
//!
//! The calendar is the union of every symbol's trading dates. A symbol that
//! did not trade on a calendar date still gets a slot there (filled with a
//! gap by the assembler), so the chart's x-axis is complete.

use super::error::PipelineError;
use crate::domain::SymbolSeries;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Sorted, duplicate-free set of dates on which at least one symbol traded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingCalendar {
    dates: Vec<NaiveDate>,
}

impl TradingCalendar {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Position of `date` on the calendar.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

/// Build the union calendar over all series.
///
/// Fails with `InsufficientData` when no series has any point, or when one
/// symbol carries two different prices for the same date. Series sharing a
/// ticker are checked against each other as well.
pub fn build_calendar(series: &[SymbolSeries]) -> Result<TradingCalendar, PipelineError> {
    let mut seen: HashMap<&str, BTreeMap<NaiveDate, f64>> = HashMap::new();
    for s in series {
        let prices = seen.entry(s.symbol()).or_default();
        for p in s.points() {
            match prices.get(&p.date) {
                Some(prev) if prev.to_bits() != p.adj_close.to_bits() => {
                    return Err(PipelineError::InsufficientData(format!(
                        "{} has conflicting prices on {}",
                        s.symbol(),
                        p.date
                    )));
                }
                Some(_) => {}
                None => {
                    prices.insert(p.date, p.adj_close);
                }
            }
        }
    }

    let all_dates: BTreeSet<NaiveDate> = seen
        .values()
        .flat_map(|prices| prices.keys().copied())
        .collect();
    if all_dates.is_empty() {
        return Err(PipelineError::InsufficientData(
            "no symbol produced any price data".into(),
        ));
    }

    Ok(TradingCalendar {
        dates: all_dates.into_iter().collect(),
    })
}
