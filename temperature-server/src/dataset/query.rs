//! Station/year queries over the cached table.
//!
//! Every operation resolves the current table through the [`TableCache`]
//! first, so a changed file is picked up by the next query.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use super::cache::{CacheEntry, TableCache};
use super::error::DatasetError;
use super::order::{dedup_preserving_order, sorted_unique};
use super::stats::{self, Summary};

/// A validated station/year window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationQuery {
    stations: Vec<String>,
    start_year: Option<i32>,
    end_year: Option<i32>,
}

impl StationQuery {
    /// Build a query, trimming identifiers and dropping blank ones.
    ///
    /// Fails if no identifiers remain or if `start_year > end_year`.
    pub fn new<S: AsRef<str>>(
        stations: &[S],
        start_year: Option<i32>,
        end_year: Option<i32>,
    ) -> Result<Self, DatasetError> {
        let stations: Vec<String> = stations
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if stations.is_empty() {
            return Err(DatasetError::InvalidRequest("stations is required".into()));
        }
        if let (Some(start), Some(end)) = (start_year, end_year)
            && start > end
        {
            return Err(DatasetError::InvalidRequest(
                "start_year must be <= end_year".into(),
            ));
        }

        Ok(Self {
            stations,
            start_year,
            end_year,
        })
    }

    /// Build a query from a comma-separated station list.
    pub fn parse(
        stations: &str,
        start_year: Option<i32>,
        end_year: Option<i32>,
    ) -> Result<Self, DatasetError> {
        let list: Vec<&str> = stations.split(',').collect();
        Self::new(&list, start_year, end_year)
    }

    /// Requested identifiers, in request order (duplicates kept).
    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    pub fn start_year(&self) -> Option<i32> {
        self.start_year
    }

    pub fn end_year(&self) -> Option<i32> {
        self.end_year
    }

    /// Whether a row's year falls inside the window.
    ///
    /// An unbounded window admits every row, including rows with no year;
    /// a bounded one rejects rows with no year.
    fn admits_year(&self, year: Option<i32>) -> bool {
        if self.start_year.is_none() && self.end_year.is_none() {
            return true;
        }
        let Some(year) = year else {
            return false;
        };
        self.start_year.is_none_or(|start| start <= year)
            && self.end_year.is_none_or(|end| year <= end)
    }
}

/// Earliest and latest year in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

/// One station's points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSeries<P> {
    pub station: String,
    pub points: Vec<P>,
}

/// A single monthly reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub year: i32,
    /// 1 for January through 12 for December.
    pub month: u8,
    pub value: f64,
}

/// A yearly mean, optionally with its spread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnualPoint {
    pub year: i32,
    pub mean: f64,
    #[serde(flatten)]
    pub spread: Option<Spread>,
}

/// Standard deviation of a yearly mean, present when it was requested.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Spread {
    /// `mean ± std` band.
    Band { std: f64, lower: f64, upper: f64 },
    /// The deviation could not be computed; serialized as `"std": null`.
    Unavailable { std: Option<f64> },
}

impl Spread {
    fn from_std(mean: f64, std: Option<f64>) -> Self {
        match std.filter(|s| s.is_finite()) {
            Some(std) => Spread::Band {
                std,
                lower: mean - std,
                upper: mean + std,
            },
            None => Spread::Unavailable { std: None },
        }
    }
}

/// Query operations over a shared table cache.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    cache: Arc<TableCache>,
}

impl QueryEngine {
    /// Create an engine backed by `cache`.
    pub fn new(cache: Arc<TableCache>) -> Self {
        Self { cache }
    }

    /// The cache this engine reads through.
    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    /// All station identifiers, in canonical order.
    pub fn unique_stations(&self, path: &Path) -> Result<Vec<String>, DatasetError> {
        Ok(self.cache.resolve(path)?.sorted_stations.clone())
    }

    /// All station identifiers, for membership checks.
    pub fn station_set(&self, path: &Path) -> Result<HashSet<String>, DatasetError> {
        Ok(self.cache.resolve(path)?.stations.clone())
    }

    /// Fail with `UnknownStations` if any requested station is absent.
    pub fn ensure_stations_exist(
        &self,
        path: &Path,
        query: &StationQuery,
    ) -> Result<(), DatasetError> {
        let entry = self.cache.resolve(path)?;
        check_stations(&entry, query)
    }

    /// Earliest and latest year present.
    pub fn data_year_range(&self, path: &Path) -> Result<YearRange, DatasetError> {
        let entry = self.cache.resolve(path)?;
        Ok(year_range(&entry))
    }

    /// Summary statistics over every reading in the window.
    pub fn analytics_summary(
        &self,
        path: &Path,
        query: &StationQuery,
    ) -> Result<Summary, DatasetError> {
        let entry = self.cache.resolve(path)?;
        Ok(summary(&entry, query))
    }

    /// Monthly readings per station, stations in de-duplicated request order.
    pub fn monthly_data(
        &self,
        path: &Path,
        query: &StationQuery,
    ) -> Result<Vec<StationSeries<MonthlyPoint>>, DatasetError> {
        let entry = self.cache.resolve(path)?;
        Ok(monthly(&entry, query))
    }

    /// Yearly means per station, stations in canonical order.
    pub fn annual_data(
        &self,
        path: &Path,
        query: &StationQuery,
        include_std: bool,
    ) -> Result<Vec<StationSeries<AnnualPoint>>, DatasetError> {
        let entry = self.cache.resolve(path)?;
        Ok(annual(&entry, query, include_std))
    }
}

/// Fail with `UnknownStations`, listing requested stations absent from
/// the entry in canonical order.
pub fn check_stations(entry: &CacheEntry, query: &StationQuery) -> Result<(), DatasetError> {
    let missing: Vec<&String> = query
        .stations
        .iter()
        .filter(|s| !entry.stations.contains(*s))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DatasetError::UnknownStations(sorted_unique(&missing)))
    }
}

/// Earliest and latest year in the entry, ignoring undated rows.
pub fn year_range(entry: &CacheEntry) -> YearRange {
    let years = entry.table.years().iter().flatten();
    YearRange {
        min_year: years.clone().min().copied(),
        max_year: years.max().copied(),
    }
}

/// Rows matching the query, in file order.
fn matching_rows(entry: &CacheEntry, query: &StationQuery) -> Vec<usize> {
    let wanted: HashSet<&str> = query.stations.iter().map(String::as_str).collect();
    let table = &entry.table;

    table
        .stations()
        .iter()
        .zip(table.years())
        .enumerate()
        .filter(|(_, (station, year))| {
            wanted.contains(station.as_str()) && query.admits_year(**year)
        })
        .map(|(row, _)| row)
        .collect()
}

/// Matching rows grouped by station, each group in file order.
fn rows_by_station<'a>(
    entry: &'a CacheEntry,
    query: &StationQuery,
) -> HashMap<&'a str, Vec<usize>> {
    let stations = entry.table.stations();
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for row in matching_rows(entry, query) {
        groups.entry(stations[row].as_str()).or_default().push(row);
    }
    groups
}

/// Rows of one station that carry a year, ordered by year (stable).
fn dated_rows(entry: &CacheEntry, rows: Option<&Vec<usize>>) -> Vec<(usize, i32)> {
    let years = entry.table.years();
    let mut dated: Vec<(usize, i32)> = rows
        .into_iter()
        .flatten()
        .filter_map(|&row| years[row].map(|year| (row, year)))
        .collect();
    dated.sort_by_key(|&(_, year)| year);
    dated
}

pub fn summary(entry: &CacheEntry, query: &StationQuery) -> Summary {
    let table = &entry.table;

    let values = matching_rows(entry, query)
        .into_iter()
        .flat_map(move |row| table.row_readings(row))
        .map(|(_, v)| Some(f64::from(v)));

    stats::summarize(values)
}

pub fn monthly(entry: &CacheEntry, query: &StationQuery) -> Vec<StationSeries<MonthlyPoint>> {
    let groups = rows_by_station(entry, query);
    let table = &entry.table;

    dedup_preserving_order(&query.stations)
        .into_iter()
        .map(|station| {
            let points = dated_rows(entry, groups.get(station.as_str()))
                .into_iter()
                .flat_map(move |(row, year)| {
                    table.row_readings(row).map(move |(month, value)| MonthlyPoint {
                        year,
                        month: month.number(),
                        value: f64::from(value),
                    })
                })
                .collect();
            StationSeries { station, points }
        })
        .collect()
}

pub fn annual(
    entry: &CacheEntry,
    query: &StationQuery,
    include_std: bool,
) -> Vec<StationSeries<AnnualPoint>> {
    let groups = rows_by_station(entry, query);
    let table = &entry.table;

    sorted_unique(&query.stations)
        .into_iter()
        .map(|station| {
            let points = dated_rows(entry, groups.get(station.as_str()))
                .into_iter()
                .filter_map(|(row, year)| {
                    let values: Vec<Option<f64>> = table
                        .row_readings(row)
                        .map(|(_, v)| Some(f64::from(v)))
                        .collect();
                    let mean = stats::mean(values.iter().copied())?;
                    let spread = include_std
                        .then(|| Spread::from_std(mean, stats::population_std(values)));
                    Some(AnnualPoint { year, mean, spread })
                })
                .collect();
            StationSeries { station, points }
        })
        .collect()
}
