//! Series loading for one chart refresh.
//!
//! Given the bank roster, loads every ticker's adjusted closes and returns
//! them as typed series in roster order. Implements the source policy:
//! 1. Sample directory given → read every ticker from it, no network
//! 2. Otherwise fetch from the provider, mirroring fresh data when asked
//! 3. On a failed fetch → first fallback directory holding the ticker's CSV
//! 4. Otherwise → fail with a clear error

use super::csv_fixture::CsvDirectory;
use super::provider::{DataError, DataSource, LoadProgress, PriceProvider};
use crate::domain::{Bank, SymbolSeries};
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from the loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("sample data for '{ticker}' unavailable: {source}")]
    Sample {
        ticker: String,
        #[source]
        source: DataError,
    },

    #[error("failed to download data for '{ticker}': {reason}. No fallback file present.")]
    DownloadFailed { ticker: String, reason: String },

    #[error("no sample directory and no price provider configured")]
    NoSource,

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Where to read from and mirror to.
#[derive(Debug, Clone)]
pub struct LoadPlan {
    /// Read everything from this directory instead of the network.
    pub sample_dir: Option<PathBuf>,
    /// Mirror fresh downloads into this directory.
    pub mirror_dir: Option<PathBuf>,
    /// Consulted (before `mirror_dir`) when a download fails.
    pub fallback_dir: Option<PathBuf>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl LoadPlan {
    pub fn remote(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            sample_dir: None,
            mirror_dir: None,
            fallback_dir: None,
            start,
            end,
        }
    }

    /// Fallback directories in lookup order, without repeats.
    pub fn fallback_dirs(&self) -> Vec<CsvDirectory> {
        let mut dirs: Vec<PathBuf> = Vec::new();
        for dir in [&self.fallback_dir, &self.mirror_dir].into_iter().flatten() {
            if !dirs.contains(dir) {
                dirs.push(dir.clone());
            }
        }
        dirs.into_iter().map(CsvDirectory::fallback).collect()
    }
}

/// Loaded series with per-ticker provenance.
#[derive(Debug)]
pub struct LoadedSeries {
    /// One series per roster entry, in roster order.
    pub series: Vec<SymbolSeries>,
    pub sources: Vec<(String, DataSource)>,
}

impl LoadedSeries {
    pub fn source_of(&self, ticker: &str) -> Option<DataSource> {
        self.sources
            .iter()
            .find(|(t, _)| t == ticker)
            .map(|(_, s)| *s)
    }

    /// True when any ticker had to be served from a fallback directory.
    pub fn used_fallback(&self) -> bool {
        self.sources
            .iter()
            .any(|(_, s)| *s == DataSource::FallbackCsv)
    }
}

/// Load every roster ticker according to `plan`.
///
/// Any ticker that cannot be loaded aborts the whole load.
pub fn load_series(
    roster: &[Bank],
    plan: &LoadPlan,
    provider: Option<&dyn PriceProvider>,
    progress: &dyn LoadProgress,
) -> Result<LoadedSeries, LoadError> {
    let mode = match (&plan.sample_dir, provider) {
        (Some(dir), _) => Mode::Sample(CsvDirectory::new(dir)),
        (None, Some(prov)) => {
            let mirror = plan.mirror_dir.as_ref().map(CsvDirectory::new);
            if let Some(mirror) = &mirror {
                mirror.ensure_exists()?;
            }
            Mode::Remote {
                provider: prov,
                mirror,
                fallbacks: plan.fallback_dirs(),
            }
        }
        (None, None) => return Err(LoadError::NoSource),
    };

    let total = roster.len();
    let mut series = Vec::with_capacity(total);
    let mut sources = Vec::with_capacity(total);

    for (i, bank) in roster.iter().enumerate() {
        let ticker = bank.ticker;
        progress.on_start(ticker, i, total);

        let (loaded, source) = match &mode {
            Mode::Sample(dir) => match dir.read(ticker) {
                Ok(s) => (s, DataSource::SampleCsv),
                Err(e) => {
                    progress.on_complete(ticker, i, total, Err(&e));
                    return Err(LoadError::Sample {
                        ticker: ticker.to_string(),
                        source: e,
                    });
                }
            },
            Mode::Remote {
                provider,
                mirror,
                fallbacks,
            } => match fetch_remote(*provider, ticker, plan, mirror.as_ref()) {
                Ok(ok) => ok,
                Err(e) => match load_fallback(fallbacks, mirror.as_ref(), ticker, &e)? {
                    Some(ok) => ok,
                    None => {
                        progress.on_complete(ticker, i, total, Err(&e));
                        return Err(LoadError::DownloadFailed {
                            ticker: ticker.to_string(),
                            reason: e.to_string(),
                        });
                    }
                },
            },
        };

        progress.on_complete(ticker, i, total, Ok(source));
        series.push(loaded);
        sources.push((ticker.to_string(), source));
    }

    progress.on_batch_complete(series.len(), total - series.len(), total);

    Ok(LoadedSeries { series, sources })
}

/// Resolved source for a load.
enum Mode<'a> {
    Sample(CsvDirectory),
    Remote {
        provider: &'a dyn PriceProvider,
        mirror: Option<CsvDirectory>,
        fallbacks: Vec<CsvDirectory>,
    },
}

/// Fetch one ticker and mirror it on success.
fn fetch_remote(
    provider: &dyn PriceProvider,
    ticker: &str,
    plan: &LoadPlan,
    mirror: Option<&CsvDirectory>,
) -> Result<(SymbolSeries, DataSource), DataError> {
    if !provider.is_available() {
        return Err(DataError::Other(format!(
            "provider {} is unavailable",
            provider.name()
        )));
    }
    let fetched = provider.fetch(ticker, plan.start, plan.end)?;
    if let Some(mirror) = mirror {
        let path = mirror.write(&fetched.series)?;
        debug!(ticker, path = %path.display(), "mirrored");
    }
    Ok((fetched.series, fetched.source))
}

/// Serve a ticker from the first fallback directory that has it.
///
/// The served series is copied into the mirror unless it was read from the
/// mirror itself.
fn load_fallback(
    fallbacks: &[CsvDirectory],
    mirror: Option<&CsvDirectory>,
    ticker: &str,
    cause: &DataError,
) -> Result<Option<(SymbolSeries, DataSource)>, LoadError> {
    let Some(dir) = fallbacks.iter().find(|dir| dir.contains(ticker)) else {
        return Ok(None);
    };
    warn!(
        ticker,
        error = %cause,
        path = %dir.path_for(ticker).display(),
        "download failed; falling back to cached data"
    );
    let series = dir.read(ticker)?;
    if let Some(mirror) = mirror.filter(|m| m.root() != dir.root()) {
        let path = mirror.write(&series)?;
        debug!(ticker, path = %path.display(), "mirrored fallback data");
    }
    Ok(Some((series, DataSource::FallbackCsv)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::FetchResult;
    use crate::domain::{PricePoint, BANKS};
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    struct QuietProgress;

    impl LoadProgress for QuietProgress {
        fn on_start(&self, _: &str, _: usize, _: usize) {}
        fn on_complete(&self, _: &str, _: usize, _: usize, _: Result<DataSource, &DataError>) {}
        fn on_batch_complete(&self, _: usize, _: usize, _: usize) {}
    }

    /// Provider that serves a fixed price for every ticker except the failing ones.
    struct StubProvider {
        failing: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl StubProvider {
        fn new(failing: Vec<&'static str>) -> Self {
            Self {
                failing,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl PriceProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        fn fetch(
            &self,
            ticker: &str,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<FetchResult, DataError> {
            self.calls.lock().unwrap().push(ticker.to_string());
            if self.failing.iter().any(|f| *f == ticker) {
                return Err(DataError::NetworkUnreachable("connection refused".into()));
            }
            Ok(FetchResult {
                ticker: ticker.to_string(),
                series: SymbolSeries::new(ticker, vec![PricePoint::new(start, 5.0)]),
                source: DataSource::YahooFinance,
            })
        }
    }

    fn write_csv(dir: &Path, ticker: &str, rows: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(format!("{ticker}.csv")), format!("Date,Adj Close\n{rows}")).unwrap();
    }

    fn plan() -> LoadPlan {
        LoadPlan::remote(d("2024-07-01"), d("2024-07-31"))
    }

    #[test]
    fn sample_mode_reads_every_ticker_without_network() {
        let dir = tempfile::tempdir().unwrap();
        for bank in &BANKS[..2] {
            write_csv(dir.path(), bank.ticker, "2024-07-01,3.0\n");
        }
        let provider = StubProvider::new(vec![]);
        let plan = LoadPlan {
            sample_dir: Some(dir.path().to_path_buf()),
            ..plan()
        };

        let loaded = load_series(&BANKS[..2], &plan, Some(&provider), &QuietProgress).unwrap();

        assert_eq!(loaded.series.len(), 2);
        assert_eq!(loaded.source_of("1155.KL"), Some(DataSource::SampleCsv));
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn sample_mode_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "1155.KL", "2024-07-01,3.0\n");
        let plan = LoadPlan {
            sample_dir: Some(dir.path().to_path_buf()),
            ..plan()
        };

        let err = load_series(&BANKS[..2], &plan, None, &QuietProgress).unwrap_err();
        match err {
            LoadError::Sample { ticker, source } => {
                assert_eq!(ticker, "1295.KL");
                assert!(matches!(source, DataError::MissingFixture { .. }));
            }
            other => panic!("expected Sample error, got {other:?}"),
        }
    }

    #[test]
    fn remote_mode_mirrors_downloads() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = dir.path().join("mirror");
        let plan = LoadPlan {
            mirror_dir: Some(mirror.clone()),
            ..plan()
        };
        let provider = StubProvider::new(vec![]);

        let loaded = load_series(&BANKS[..3], &plan, Some(&provider), &QuietProgress).unwrap();

        assert_eq!(loaded.series.len(), 3);
        assert!(!loaded.used_fallback());
        for bank in &BANKS[..3] {
            assert!(mirror.join(format!("{}.csv", bank.ticker)).is_file());
        }
    }

    #[test]
    fn failed_download_uses_fallback_before_mirror() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("fallback");
        let mirror = dir.path().join("mirror");
        write_csv(&fallback, "1295.KL", "2024-07-01,4.0\n");
        write_csv(&mirror, "1295.KL", "2024-07-01,9.0\n");
        let plan = LoadPlan {
            mirror_dir: Some(mirror.clone()),
            fallback_dir: Some(fallback),
            ..plan()
        };
        let provider = StubProvider::new(vec!["1295.KL"]);

        let loaded = load_series(&BANKS[..2], &plan, Some(&provider), &QuietProgress).unwrap();

        assert_eq!(loaded.source_of("1155.KL"), Some(DataSource::YahooFinance));
        assert_eq!(loaded.source_of("1295.KL"), Some(DataSource::FallbackCsv));
        assert_eq!(loaded.series[1].points()[0].adj_close, 4.0);
        assert!(loaded.used_fallback());

        // The fallback copy replaces the stale mirror file.
        let mirrored = CsvDirectory::new(&mirror).read("1295.KL").unwrap();
        assert_eq!(mirrored.points()[0].adj_close, 4.0);
    }

    #[test]
    fn fallback_from_mirror_leaves_it_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = dir.path().join("mirror");
        write_csv(&mirror, "1295.KL", "2024-07-01,9.0\n");
        let before = fs::read_to_string(mirror.join("1295.KL.csv")).unwrap();
        let plan = LoadPlan {
            mirror_dir: Some(mirror.clone()),
            ..plan()
        };
        let provider = StubProvider::new(vec!["1295.KL"]);

        let loaded = load_series(&BANKS[1..2], &plan, Some(&provider), &QuietProgress).unwrap();

        assert_eq!(loaded.series[0].points()[0].adj_close, 9.0);
        assert_eq!(fs::read_to_string(mirror.join("1295.KL.csv")).unwrap(), before);
    }

    #[test]
    fn failed_download_without_fallback_is_fatal() {
        let provider = StubProvider::new(vec!["1023.KL"]);
        let err = load_series(&BANKS[..3], &plan(), Some(&provider), &QuietProgress).unwrap_err();
        match err {
            LoadError::DownloadFailed { ticker, reason } => {
                assert_eq!(ticker, "1023.KL");
                assert!(reason.contains("connection refused"));
            }
            other => panic!("expected DownloadFailed, got {other:?}"),
        }
    }

    #[test]
    fn no_source_is_rejected() {
        let err = load_series(&BANKS, &plan(), None, &QuietProgress).unwrap_err();
        assert!(matches!(err, LoadError::NoSource));
    }

    #[test]
    fn fallback_dirs_are_deduplicated() {
        let plan = LoadPlan {
            mirror_dir: Some(PathBuf::from("cache")),
            fallback_dir: Some(PathBuf::from("cache")),
            ..plan()
        };
        assert_eq!(plan.fallback_dirs().len(), 1);
    }
}
