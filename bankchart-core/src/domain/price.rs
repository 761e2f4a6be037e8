//! Raw price data as handed over by the loader.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Adjusted close of one symbol on one trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub adj_close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, adj_close: f64) -> Self {
        Self { date, adj_close }
    }

    /// A usable price is finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.adj_close.is_finite() && self.adj_close > 0.0
    }
}

/// Chronological price history of one symbol.
///
/// Points are sorted by date on construction and exact repeats (same date,
/// same bit-identical price) are collapsed. Repeats with differing prices are
/// kept: they are an upstream defect that calendar alignment rejects.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl SymbolSeries {
    pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.dedup_by(|a, b| a.date == b.date && a.adj_close.to_bits() == b.adj_close.to_bits());
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    /// A symbol for which the loader found no rows.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            points: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// First point dated on or after `date`.
    pub fn first_on_or_after(&self, date: NaiveDate) -> Option<&PricePoint> {
        let idx = self.points.partition_point(|p| p.date < date);
        self.points.get(idx)
    }

    /// The points dated on or after `date`, as a new series.
    pub fn since(&self, date: NaiveDate) -> SymbolSeries {
        let idx = self.points.partition_point(|p| p.date < date);
        Self {
            symbol: self.symbol.clone(),
            points: self.points[idx..].to_vec(),
        }
    }

    /// Fold `other`'s points into this series, keeping the sort and dedup rules.
    pub fn merge(self, other: &SymbolSeries) -> SymbolSeries {
        let mut points = self.points;
        points.extend_from_slice(&other.points);
        Self::new(self.symbol, points)
    }
}
