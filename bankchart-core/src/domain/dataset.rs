//! Normalized series and the assembled chart dataset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One symbol's price expressed relative to its baseline price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub date: NaiveDate,
    pub relative_value: f64,
}

/// Normalized history of one symbol.
///
/// `baseline` is the date of the price every value was divided by. It is
/// `None` (and `points` empty) when the symbol has no price on or after the
/// configured baseline date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSeries {
    pub symbol: String,
    pub baseline: Option<NaiveDate>,
    pub points: Vec<NormalizedPoint>,
}

impl NormalizedSeries {
    /// Series for a symbol that has nothing to contribute.
    pub fn unresolved(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            baseline: None,
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One chart line: a symbol's values on every calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartColumn {
    pub symbol: String,
    pub label: String,
    /// One entry per calendar date; `None` where the symbol did not trade.
    pub values: Vec<Option<f64>>,
}

impl ChartColumn {
    pub fn is_all_null(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

/// Date-aligned, rank-ordered table of relative values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<ChartColumn>,
}

impl ChartDataset {
    pub fn column(&self, symbol: &str) -> Option<&ChartColumn> {
        self.columns.iter().find(|c| c.symbol == symbol)
    }

    /// Value of `symbol` on `date`, flattening "no column" and "no trade".
    pub fn value(&self, symbol: &str, date: NaiveDate) -> Option<f64> {
        let idx = self.dates.binary_search(&date).ok()?;
        self.column(symbol)?.values.get(idx).copied().flatten()
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.symbol.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// BLAKE3 hex digest over dates, column order and value bits.
    ///
    /// Two datasets with the same fingerprint render identical charts.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for date in &self.dates {
            hasher.update(date.to_string().as_bytes());
        }
        for column in &self.columns {
            hasher.update(column.symbol.as_bytes());
            hasher.update(column.label.as_bytes());
            for value in &column.values {
                match value {
                    Some(v) => {
                        hasher.update(&[1]);
                        hasher.update(&v.to_le_bytes());
                    }
                    None => {
                        hasher.update(&[0]);
                    }
                }
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample() -> ChartDataset {
        ChartDataset {
            dates: vec![d("2024-07-01"), d("2024-07-02")],
            columns: vec![
                ChartColumn {
                    symbol: "1155.KL".into(),
                    label: "Maybank".into(),
                    values: vec![Some(1.0), Some(1.01)],
                },
                ChartColumn {
                    symbol: "1295.KL".into(),
                    label: "PBBANK".into(),
                    values: vec![None, None],
                },
            ],
        }
    }

    #[test]
    fn value_lookup_by_symbol_and_date() {
        let ds = sample();
        assert_eq!(ds.value("1155.KL", d("2024-07-02")), Some(1.01));
        assert_eq!(ds.value("1295.KL", d("2024-07-01")), None);
        assert_eq!(ds.value("1155.KL", d("2024-07-05")), None);
        assert_eq!(ds.value("SPY", d("2024-07-01")), None);
    }

    #[test]
    fn all_null_column_detected() {
        let ds = sample();
        assert!(!ds.column("1155.KL").unwrap().is_all_null());
        assert!(ds.column("1295.KL").unwrap().is_all_null());
    }

    #[test]
    fn fingerprint_is_stable_and_value_sensitive() {
        let a = sample();
        let b = sample();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let mut c = sample();
        c.columns[0].values[1] = Some(1.02);
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn fingerprint_distinguishes_null_from_value() {
        let a = sample();
        let mut b = sample();
        b.columns[1].values[0] = Some(0.0);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn serializes_gaps_as_null() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["dates"][0], "2024-07-01");
        assert!(json["columns"][1]["values"][0].is_null());
    }
}
