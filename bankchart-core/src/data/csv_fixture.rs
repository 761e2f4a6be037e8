//! Yahoo Finance formatted CSV files: offline sample data, download mirror
//! and fallback cache.
//!
//! Layout: `{root}/{TICKER}.csv` with at least a `Date` column and an
//! `Adj Close` (or `Adj Close*`) column. Rows with an empty date, a missing or
//! `null` adjusted close, or an unparseable field are skipped.

use super::provider::{DataError, DataSource, FetchResult, PriceProvider};
use crate::domain::{PricePoint, SymbolSeries};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

const DATE_COLUMN: &str = "Date";
const ADJ_CLOSE_COLUMNS: [&str; 2] = ["Adj Close", "Adj Close*"];

#[derive(Serialize)]
struct MirrorRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Adj Close")]
    adj_close: f64,
}

/// Parse Yahoo-format CSV text into a typed series.
///
/// `origin` only labels errors.
pub fn parse_yahoo_csv<R: Read>(
    ticker: &str,
    reader: R,
    origin: &Path,
) -> Result<SymbolSeries, DataError> {
    let malformed = |reason: String| DataError::MalformedCsv {
        path: origin.to_path_buf(),
        reason,
    };

    let mut csv = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv.headers().map_err(|e| malformed(e.to_string()))?.clone();
    let date_idx = headers
        .iter()
        .position(|h| h == DATE_COLUMN)
        .ok_or_else(|| malformed("no Date column".into()))?;
    let adj_idx = headers
        .iter()
        .position(|h| ADJ_CLOSE_COLUMNS.contains(&h))
        .ok_or_else(|| malformed("no Adj Close column".into()))?;

    let mut points = Vec::new();
    for record in csv.records() {
        let record = record.map_err(|e| malformed(e.to_string()))?;

        let Some(raw_date) = record.get(date_idx).filter(|s| !s.is_empty()) else {
            continue;
        };
        let Some(raw_adj) = record
            .get(adj_idx)
            .filter(|s| !s.is_empty() && *s != "null")
        else {
            continue;
        };
        let Ok(adj_close) = raw_adj.parse::<f64>() else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d") else {
            continue;
        };

        points.push(PricePoint::new(date, adj_close));
    }

    Ok(SymbolSeries::new(ticker, points))
}

/// Write a series as `Date,Adj Close` CSV.
pub fn write_yahoo_csv<W: std::io::Write>(writer: W, series: &SymbolSeries) -> csv::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for p in series.points() {
        csv.serialize(MirrorRow {
            date: p.date,
            adj_close: p.adj_close,
        })?;
    }
    csv.flush()?;
    Ok(())
}

/// A directory of `{TICKER}.csv` files.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    root: PathBuf,
    source: DataSource,
}

impl CsvDirectory {
    /// Directory used as the primary (sample) data source.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            source: DataSource::SampleCsv,
        }
    }

    /// Directory consulted after a failed download.
    pub fn fallback(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            source: DataSource::FallbackCsv,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a ticker's file: `{root}/{TICKER}.csv`
    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.root.join(format!("{ticker}.csv"))
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.path_for(ticker).is_file()
    }

    /// Read a ticker's full history.
    pub fn read(&self, ticker: &str) -> Result<SymbolSeries, DataError> {
        let path = self.path_for(ticker);
        if !path.is_file() {
            return Err(DataError::MissingFixture { path });
        }
        let file = fs::File::open(&path).map_err(|source| DataError::Io {
            path: path.clone(),
            source,
        })?;
        parse_yahoo_csv(ticker, file, &path)
    }

    /// Create the directory if missing.
    pub fn ensure_exists(&self) -> Result<(), DataError> {
        fs::create_dir_all(&self.root).map_err(|source| DataError::Io {
            path: self.root.clone(),
            source,
        })
    }

    /// Write a series to `{root}/{TICKER}.csv`.
    ///
    /// Writes are atomic: write to .tmp then rename.
    pub fn write(&self, series: &SymbolSeries) -> Result<PathBuf, DataError> {
        self.ensure_exists()?;
        let path = self.path_for(series.symbol());
        let tmp_path = path.with_extension("csv.tmp");

        let file = fs::File::create(&tmp_path).map_err(|source| DataError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        write_yahoo_csv(file, series).map_err(|e| DataError::MalformedCsv {
            path: tmp_path.clone(),
            reason: e.to_string(),
        })?;

        fs::rename(&tmp_path, &path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            DataError::Io {
                path: path.clone(),
                source,
            }
        })?;
        Ok(path)
    }
}

impl PriceProvider for CsvDirectory {
    fn name(&self) -> &str {
        "csv_directory"
    }

    fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let full = self.read(ticker)?;
        let points = full
            .points()
            .iter()
            .filter(|p| p.date >= start && p.date <= end)
            .copied()
            .collect();
        Ok(FetchResult {
            ticker: ticker.to_string(),
            series: SymbolSeries::new(ticker, points),
            source: self.source,
        })
    }
}
