//! Join normalized series onto the trading calendar.

use super::align::TradingCalendar;
use crate::domain::{Bank, ChartColumn, ChartDataset, NormalizedSeries};
use std::collections::HashMap;

/// Build the chart dataset: one column per roster entry, in roster order.
///
/// A symbol's cell is its relative value on that exact date, or `None` when it
/// did not trade. Gaps are never interpolated or carried forward. A roster
/// symbol without a normalized series gets an all-`None` column.
pub fn assemble(
    calendar: &TradingCalendar,
    roster: &[Bank],
    normalized: &[NormalizedSeries],
) -> ChartDataset {
    let by_symbol: HashMap<&str, &NormalizedSeries> =
        normalized.iter().map(|n| (n.symbol.as_str(), n)).collect();

    let columns = roster
        .iter()
        .map(|bank| {
            let mut values = vec![None; calendar.len()];
            if let Some(series) = by_symbol.get(bank.ticker) {
                for point in &series.points {
                    if let Some(idx) = calendar.index_of(point.date) {
                        values[idx] = Some(point.relative_value);
                    }
                }
            }
            ChartColumn {
                symbol: bank.ticker.to_string(),
                label: bank.abbreviation.to_string(),
                values,
            }
        })
        .collect();

    ChartDataset {
        dates: calendar.dates().to_vec(),
        columns,
    }
}
