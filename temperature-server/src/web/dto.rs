//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::dataset::{AnnualPoint, DatasetError, MonthlyPoint, StationQuery, StationSeries};

/// Query parameters shared by the station-scoped endpoints.
#[derive(Debug, Deserialize)]
pub struct StationParams {
    /// Comma-separated station numbers
    pub stations: Option<String>,

    /// First year to include
    pub start_year: Option<i32>,

    /// Last year to include
    pub end_year: Option<i32>,
}

impl StationParams {
    /// Validate into a dataset query.
    pub fn to_query(&self) -> Result<StationQuery, DatasetError> {
        StationQuery::parse(
            self.stations.as_deref().unwrap_or_default(),
            self.start_year,
            self.end_year,
        )
    }
}

/// Query parameters for the annual endpoint.
#[derive(Debug, Deserialize)]
pub struct AnnualParams {
    /// Comma-separated station numbers
    pub stations: Option<String>,

    /// First year to include
    pub start_year: Option<i32>,

    /// Last year to include
    pub end_year: Option<i32>,

    /// Include the per-year standard deviation band
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub include_std: bool,
}

/// Parse a query-string flag.
///
/// Accepts `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`, `t`/`f` and
/// `y`/`n`, case-insensitively.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Ok(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Ok(false),
        _ => Err(de::Error::custom(format!(
            "include_std: expected a boolean, got {raw:?}"
        ))),
    }
}

impl AnnualParams {
    /// Validate into a dataset query.
    pub fn to_query(&self) -> Result<StationQuery, DatasetError> {
        StationQuery::parse(
            self.stations.as_deref().unwrap_or_default(),
            self.start_year,
            self.end_year,
        )
    }
}

/// Response for the health check.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Response for the station listing.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    /// Number of stations
    pub count: usize,

    /// Station numbers in canonical order
    pub stations: Vec<String>,
}

/// Response for monthly data.
#[derive(Debug, Serialize)]
pub struct MonthlyResponse {
    pub stations: Vec<StationSeries<MonthlyPoint>>,
}

/// Response for annual data.
#[derive(Debug, Serialize)]
pub struct AnnualResponse {
    pub stations: Vec<StationSeries<AnnualPoint>>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub detail: String,
}

/// Response listing requested stations that are not in the dataset.
#[derive(Debug, Serialize)]
pub struct MissingStationsResponse {
    pub missing_stations: Vec<String>,
}
