//! Baseline normalization of a single symbol.

use super::error::PipelineError;
use crate::domain::{NormalizedPoint, NormalizedSeries, SymbolSeries};
use chrono::NaiveDate;

/// Rescale a series against its price on (or first after) `baseline`.
///
/// Only points dated on or after `baseline` are kept; each is divided by the
/// baseline price, so the value on the resolved baseline date is exactly 1.0.
/// A series with no point on or after `baseline` yields an empty, unresolved
/// series; that is not an error. A non-positive or non-finite price among the
/// kept points fails with `InvalidPrice` instead of producing infinities or
/// NaN. Earlier points are never charted and so are not checked.
pub fn normalize(
    series: &SymbolSeries,
    baseline: NaiveDate,
) -> Result<NormalizedSeries, PipelineError> {
    let window = series.since(baseline);
    let Some(base) = window.points().first().copied() else {
        return Ok(NormalizedSeries::unresolved(series.symbol()));
    };

    if let Some(bad) = window.points().iter().find(|p| !p.is_valid()) {
        return Err(PipelineError::InvalidPrice {
            symbol: series.symbol().to_string(),
            date: bad.date,
            value: bad.adj_close,
        });
    }

    let points = window
        .points()
        .iter()
        .map(|p| NormalizedPoint {
            date: p.date,
            relative_value: p.adj_close / base.adj_close,
        })
        .collect();

    Ok(NormalizedSeries {
        symbol: series.symbol().to_string(),
        baseline: Some(base.date),
        points,
    })
}
