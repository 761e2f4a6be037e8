//! Pipeline driver: calendar → per-symbol normalization → assembly.

use super::align::build_calendar;
use super::assemble::assemble;
use super::error::PipelineError;
use super::normalize::normalize;
use crate::domain::{bank, Bank, ChartDataset, NormalizedSeries, SymbolSeries};
use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// A symbol whose normalization failed; it is charted as an all-null line.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolFault {
    pub symbol: String,
    pub error: PipelineError,
}

/// Everything the emitter needs from one pipeline run.
#[derive(Debug, Clone)]
pub struct ChartReport {
    pub dataset: ChartDataset,
    /// Configured baseline date.
    pub baseline: NaiveDate,
    /// Legend labels in rank order.
    pub labels: Vec<String>,
    /// Per roster symbol, the date its values were scaled against.
    pub resolved_baselines: Vec<(String, Option<NaiveDate>)>,
    pub faults: Vec<SymbolFault>,
    /// `ChartDataset::fingerprint` of `dataset`.
    pub fingerprint: String,
}

impl ChartReport {
    /// True when at least one symbol was dropped for bad data.
    pub fn is_partial(&self) -> bool {
        !self.faults.is_empty()
    }

    pub fn faulty_symbols(&self) -> Vec<&str> {
        self.faults.iter().map(|f| f.symbol.as_str()).collect()
    }

    pub fn resolved_baseline(&self, symbol: &str) -> Option<NaiveDate> {
        self.resolved_baselines
            .iter()
            .find(|(s, _)| s == symbol)
            .and_then(|(_, date)| *date)
    }
}

/// Run the full core pipeline over the loader's output.
///
/// Series for tickers outside `roster` are ignored, and series sharing a
/// ticker are merged. Only prices dated on or after `baseline` reach the
/// calendar. An `InvalidPrice` fault removes only the offending symbol;
/// `InsufficientData` aborts the run.
pub fn run_pipeline(
    roster: &[Bank],
    baseline: NaiveDate,
    series: &[SymbolSeries],
) -> Result<ChartReport, PipelineError> {
    let mut owned: Vec<SymbolSeries> = Vec::with_capacity(roster.len());
    for s in series {
        if !roster.iter().any(|b| b.ticker == s.symbol()) {
            warn!(symbol = s.symbol(), "ignoring series outside the bank roster");
            continue;
        }
        let window = s.since(baseline);
        match owned.iter().position(|o| o.symbol() == s.symbol()) {
            Some(idx) => {
                warn!(symbol = s.symbol(), "merging repeated series for the same ticker");
                let merged = owned[idx].clone().merge(&window);
                owned[idx] = merged;
            }
            None => owned.push(window),
        }
    }

    // Checks conflicts within each merged series as well as the date union.
    let calendar = build_calendar(&owned)?;
    info!(
        dates = calendar.len(),
        first = ?calendar.first(),
        last = ?calendar.last(),
        "built trading calendar"
    );

    let outcomes: Vec<Result<NormalizedSeries, PipelineError>> =
        owned.par_iter().map(|s| normalize(s, baseline)).collect();

    let mut normalized = Vec::with_capacity(outcomes.len());
    let mut faults = Vec::new();
    for (s, outcome) in owned.iter().zip(outcomes) {
        match outcome {
            Ok(n) => {
                match n.baseline {
                    Some(date) => debug!(symbol = s.symbol(), baseline = %date, points = n.points.len(), "normalized"),
                    None => info!(symbol = s.symbol(), "no price on or after baseline; charting as gap"),
                }
                normalized.push(n);
            }
            Err(error) => {
                warn!(symbol = s.symbol(), %error, "dropping symbol from chart");
                faults.push(SymbolFault {
                    symbol: s.symbol().to_string(),
                    error,
                });
            }
        }
    }

    let dataset = assemble(&calendar, roster, &normalized);
    let resolved_baselines = roster
        .iter()
        .map(|b| {
            let date = normalized
                .iter()
                .find(|n| n.symbol == b.ticker)
                .and_then(|n| n.baseline);
            (b.ticker.to_string(), date)
        })
        .collect();
    let fingerprint = dataset.fingerprint();

    Ok(ChartReport {
        dataset,
        baseline,
        labels: bank::labels(roster),
        resolved_baselines,
        faults,
        fingerprint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PricePoint, BANKS};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(symbol: &str, points: &[(&str, f64)]) -> SymbolSeries {
        SymbolSeries::new(
            symbol,
            points.iter().map(|(s, v)| PricePoint::new(d(s), *v)).collect(),
        )
    }

    #[test]
    fn three_symbol_scenario() {
        let roster = &BANKS[..3];
        let input = vec![
            series("1155.KL", &[("2024-07-01", 10.0), ("2024-07-02", 10.5), ("2024-07-03", 11.0)]),
            series("1295.KL", &[("2024-07-01", 4.0), ("2024-07-03", 4.4)]),
            series("1023.KL", &[("2024-07-02", 8.0), ("2024-07-03", 6.0)]),
        ];

        let report = run_pipeline(roster, d("2024-07-01"), &input).unwrap();
        let ds = &report.dataset;

        assert_eq!(ds.dates, vec![d("2024-07-01"), d("2024-07-02"), d("2024-07-03")]);
        assert_eq!(ds.value("1295.KL", d("2024-07-02")), None);
        assert_eq!(ds.value("1023.KL", d("2024-07-01")), None);
        assert_eq!(report.resolved_baseline("1023.KL"), Some(d("2024-07-02")));
        assert_eq!(ds.value("1023.KL", d("2024-07-02")), Some(1.0));
        assert_eq!(ds.value("1023.KL", d("2024-07-03")), Some(0.75));
        assert!(!report.is_partial());
    }

    #[test]
    fn invalid_price_drops_only_that_symbol() {
        let roster = &BANKS[..2];
        let input = vec![
            series("1155.KL", &[("2024-07-01", 10.0), ("2024-07-02", 11.0)]),
            series("1295.KL", &[("2024-07-01", 0.0), ("2024-07-02", 4.0)]),
        ];

        let report = run_pipeline(roster, d("2024-07-01"), &input).unwrap();

        assert_eq!(report.faulty_symbols(), vec!["1295.KL"]);
        assert!(matches!(
            report.faults[0].error,
            PipelineError::InvalidPrice { .. }
        ));
        assert!(report.dataset.column("1295.KL").unwrap().is_all_null());
        assert_eq!(report.dataset.value("1155.KL", d("2024-07-02")), Some(1.1));
        assert_eq!(report.resolved_baseline("1295.KL"), None);
    }

    #[test]
    fn all_empty_aborts() {
        let input: Vec<_> = BANKS.iter().map(|b| SymbolSeries::empty(b.ticker)).collect();
        let err = run_pipeline(&BANKS, d("2024-07-01"), &input).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData(_)));
    }

    #[test]
    fn unknown_tickers_are_ignored() {
        let input = vec![
            series("SPY", &[("2024-06-01", 500.0)]),
            series("1155.KL", &[("2024-07-01", 10.0)]),
        ];
        let report = run_pipeline(&BANKS[..1], d("2024-07-01"), &input).unwrap();
        assert_eq!(report.dataset.dates, vec![d("2024-07-01")]);
        assert!(report.dataset.column("SPY").is_none());
    }

    #[test]
    fn prices_before_baseline_are_not_charted() {
        let input = vec![series("1155.KL", &[("2024-06-28", 5.0), ("2024-07-01", 10.0)])];
        let report = run_pipeline(&BANKS[..1], d("2024-07-01"), &input).unwrap();
        assert_eq!(report.dataset.dates, vec![d("2024-07-01")]);
        assert_eq!(report.dataset.value("1155.KL", d("2024-06-28")), None);
        assert_eq!(report.dataset.value("1155.KL", d("2024-07-01")), Some(1.0));
    }

    #[test]
    fn bad_price_before_baseline_keeps_symbol() {
        let input = vec![series(
            "1155.KL",
            &[("2024-06-28", 0.0), ("2024-07-01", 10.0), ("2024-07-02", 11.0)],
        )];
        let report = run_pipeline(&BANKS[..1], d("2024-07-01"), &input).unwrap();
        assert!(!report.is_partial());
        assert_eq!(report.dataset.value("1155.KL", d("2024-07-02")), Some(1.1));
    }

    #[test]
    fn only_pre_baseline_data_is_insufficient() {
        let input = vec![series("1155.KL", &[("2024-06-28", 10.0)])];
        let err = run_pipeline(&BANKS[..1], d("2024-07-01"), &input).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData(_)));
    }

    #[test]
    fn conflicting_repeated_ticker_aborts() {
        let input = vec![
            series("1155.KL", &[("2024-07-01", 10.0), ("2024-07-02", 11.0)]),
            series("1155.KL", &[("2024-07-01", 20.0), ("2024-07-02", 30.0)]),
        ];
        let err = run_pipeline(&BANKS[..1], d("2024-07-01"), &input).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData(_)));
    }

    #[test]
    fn agreeing_repeated_ticker_is_merged() {
        let input = vec![
            series("1155.KL", &[("2024-07-01", 10.0), ("2024-07-02", 11.0)]),
            series("1155.KL", &[("2024-07-02", 11.0), ("2024-07-03", 12.0)]),
        ];
        let report = run_pipeline(&BANKS[..1], d("2024-07-01"), &input).unwrap();
        assert_eq!(report.dataset.len(), 3);
        assert_eq!(report.resolved_baseline("1155.KL"), Some(d("2024-07-01")));
        assert_eq!(report.dataset.value("1155.KL", d("2024-07-03")), Some(1.2));
    }

    #[test]
    fn labels_follow_roster() {
        let input = vec![series("1155.KL", &[("2024-07-01", 10.0)])];
        let report = run_pipeline(&BANKS, d("2024-07-01"), &input).unwrap();
        assert_eq!(report.labels.len(), 10);
        assert_eq!(report.labels[0], "Maybank");
        assert_eq!(report.baseline, d("2024-07-01"));
        assert_eq!(report.fingerprint, report.dataset.fingerprint());
    }
}
