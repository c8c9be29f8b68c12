//! In-memory temperature dataset.
//!
//! Loads the `;`-delimited monthly temperature file into a column table,
//! caches it per path until the file changes, and answers station/year
//! queries over it. Missing readings are tracked explicitly and skipped
//! by every aggregation.

mod cache;
mod error;
mod loader;
mod order;
mod query;
mod stats;
mod table;

pub use cache::{CacheEntry, TableCache, ValidityStamp};
pub use error::DatasetError;
pub use loader::{LoadedTable, STATION_COLUMN, YEAR_COLUMN, load_table, read_table};
pub use order::{compare_stations, dedup_preserving_order, sort_stations, sorted_unique};
pub use query::{
    AnnualPoint, MonthlyPoint, QueryEngine, Spread, StationQuery, StationSeries, YearRange,
};
pub use stats::Summary;
pub use table::{InvalidMonth, Month, MonthColumn, Table};
