//! Price data ingestion: providers, CSV fixtures and the load policy.

pub mod csv_fixture;
pub mod loader;
pub mod provider;
pub mod yahoo;

pub use csv_fixture::{parse_yahoo_csv, write_yahoo_csv, CsvDirectory};
pub use loader::{load_series, LoadError, LoadPlan, LoadedSeries};
pub use provider::{DataError, DataSource, FetchResult, LoadProgress, PriceProvider, TracingProgress};
pub use yahoo::YahooProvider;
