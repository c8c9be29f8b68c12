//! CSV loader for the monthly temperature file.
//!
//! The file is `;`-delimited with a header row naming `Station Number`,
//! `Year` and any subset of `Jan`..`Dec`. Cells that cannot be read as
//! their column's type become missing values; no row is rejected for it.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ByteRecord;
use tracing::debug;

use super::error::DatasetError;
use super::table::{Month, MonthColumn, Table};

/// Header of the station identifier column.
pub const STATION_COLUMN: &str = "Station Number";

/// Header of the year column.
pub const YEAR_COLUMN: &str = "Year";

/// Tokens that mark a missing reading, besides the empty cell.
const MISSING_TOKENS: [&str; 4] = ["NA", "NaN", "null", "NULL"];

/// A freshly loaded dataset.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Table,
    /// Months present in the header, in calendar order.
    pub months: Vec<Month>,
    /// Distinct station identifiers.
    pub stations: HashSet<String>,
}

/// Positions of the recognised columns in the header row.
#[derive(Debug)]
struct ColumnLayout {
    station: usize,
    year: usize,
    months: Vec<(Month, usize)>,
}

impl ColumnLayout {
    fn from_headers(headers: &ByteRecord, path: &Path) -> Result<Self, DatasetError> {
        let names: Vec<String> = headers
            .iter()
            .map(|h| String::from_utf8_lossy(h).trim().to_string())
            .collect();

        let position = |column: &'static str| {
            names
                .iter()
                .position(|n| n == column)
                .ok_or_else(|| DatasetError::MissingColumn {
                    path: path.to_path_buf(),
                    column,
                })
        };

        let mut months: Vec<(Month, usize)> = Vec::new();
        for (index, name) in names.iter().enumerate() {
            if let Ok(month) = Month::parse(name)
                && !months.iter().any(|(m, _)| *m == month)
            {
                months.push((month, index));
            }
        }
        months.sort_by_key(|(m, _)| *m);

        Ok(Self {
            station: position(STATION_COLUMN)?,
            year: position(YEAR_COLUMN)?,
            months,
        })
    }
}

/// Load the dataset at `path`.
pub fn load_table(path: &Path) -> Result<LoadedTable, DatasetError> {
    let file = File::open(path).map_err(|e| DatasetError::from_io(path, e))?;
    read_table(file, path)
}

/// Parse a dataset from any reader. `path` is only used in error reports.
pub fn read_table<R: Read>(reader: R, path: &Path) -> Result<LoadedTable, DatasetError> {
    let csv_error = |source| DatasetError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.byte_headers().map_err(csv_error)?.clone();
    let layout = ColumnLayout::from_headers(&headers, path)?;

    let mut stations = Vec::new();
    let mut years = Vec::new();
    let mut month_values: Vec<Vec<Option<f32>>> = vec![Vec::new(); layout.months.len()];

    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record).map_err(csv_error)? {
        let station = cell(&record, layout.station);
        if station.is_empty() {
            continue;
        }

        stations.push(station);
        years.push(parse_year(&cell(&record, layout.year)));
        for (values, &(_, index)) in month_values.iter_mut().zip(&layout.months) {
            values.push(parse_reading(&cell(&record, index)));
        }
    }

    let months: Vec<Month> = layout.months.iter().map(|(m, _)| *m).collect();
    let columns = months
        .iter()
        .zip(month_values)
        .map(|(&month, values)| MonthColumn { month, values })
        .collect();

    let known: HashSet<String> = stations.iter().cloned().collect();
    let table = Table::new(stations, years, columns);

    debug!(
        "Parsed {} rows, {} stations, {} month columns from {}",
        table.len(),
        known.len(),
        months.len(),
        path.display()
    );

    Ok(LoadedTable {
        table,
        months,
        stations: known,
    })
}

/// Read a cell as trimmed text; short rows yield an empty cell.
fn cell(record: &ByteRecord, index: usize) -> String {
    record
        .get(index)
        .map(|raw| String::from_utf8_lossy(raw).trim().to_string())
        .unwrap_or_default()
}

fn is_missing(value: &str) -> bool {
    value.is_empty() || MISSING_TOKENS.contains(&value)
}

/// Parse a year cell. Integral floats such as `2000.0` are accepted.
pub fn parse_year(value: &str) -> Option<i32> {
    if is_missing(value) {
        return None;
    }
    if let Ok(year) = value.parse::<i32>() {
        return Some(year);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|y| y.is_finite() && y.fract() == 0.0)
        .filter(|y| *y >= f64::from(i32::MIN) && *y <= f64::from(i32::MAX))
        .map(|y| y as i32)
}

/// Parse a monthly reading; anything that is not a finite number is missing.
pub fn parse_reading(value: &str) -> Option<f32> {
    if is_missing(value) {
        return None;
    }
    value.parse::<f32>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(contents: &str) -> LoadedTable {
        read_table(contents.as_bytes(), Path::new("test.csv")).unwrap()
    }

    fn month_names(loaded: &LoadedTable) -> Vec<&'static str> {
        loaded.months.iter().map(|m| m.as_str()).collect()
    }

    #[test]
    fn parses_basic_file() {
        let loaded = parse(
            "Station Number;Year;Jan;Feb\n\
             123;2000;1.0;3.0\n\
             123;2001;5.0;7.0\n\
             456;2000;-2.5;NA\n",
        );

        assert_eq!(loaded.table.len(), 3);
        assert_eq!(loaded.table.stations(), ["123", "123", "456"]);
        assert_eq!(loaded.table.years(), [Some(2000), Some(2001), Some(2000)]);
        assert_eq!(month_names(&loaded), ["Jan", "Feb"]);

        let feb = &loaded.table.month_columns()[1];
        assert_eq!(feb.values, vec![Some(3.0), Some(7.0), None]);

        let expected: HashSet<String> = ["123", "456"].into_iter().map(String::from).collect();
        assert_eq!(loaded.stations, expected);
    }

    #[test]
    fn header_names_are_trimmed() {
        let loaded = parse(" Station Number ; Year ; Mar ;Jan\n7;1999;2;1\n");
        assert_eq!(month_names(&loaded), ["Jan", "Mar"]);
        assert_eq!(loaded.table.month_columns()[0].values, vec![Some(1.0)]);
        assert_eq!(loaded.table.month_columns()[1].values, vec![Some(2.0)]);
    }

    #[test]
    fn unknown_columns_are_ignored() {
        let loaded = parse("Station Number;Name;Year;Jan;Annual\n1;Oslo;2000;4.5;9.9\n");
        assert_eq!(month_names(&loaded), ["Jan"]);
        assert_eq!(loaded.table.month_columns()[0].values, vec![Some(4.5)]);
    }

    #[test]
    fn station_ids_stay_strings() {
        let loaded = parse("Station Number;Year;Jan\n 00123 ;2000;1\n");
        assert_eq!(loaded.table.stations(), ["00123"]);
    }

    #[test]
    fn missing_tokens_become_none() {
        let loaded = parse(
            "Station Number;Year;Jan;Feb;Mar;Apr;May;Jun\n\
             1;2000;;NA;NaN;null;NULL;abc\n",
        );
        for column in loaded.table.month_columns() {
            assert_eq!(column.values, vec![None], "{} should be missing", column.month);
        }
    }

    #[test]
    fn missing_is_not_zero() {
        let loaded = parse("Station Number;Year;Jan;Feb\n1;2000;0;\n");
        let values: Vec<Option<f32>> = loaded
            .table
            .month_columns()
            .iter()
            .map(|c| c.values[0])
            .collect();
        assert_eq!(values, vec![Some(0.0), None]);
    }

    #[test]
    fn non_finite_readings_are_missing() {
        assert_eq!(parse_reading("inf"), None);
        assert_eq!(parse_reading("-inf"), None);
        assert_eq!(parse_reading("-0.75"), Some(-0.75));
        assert_eq!(parse_reading("1.5"), Some(1.5));
    }

    #[test]
    fn year_parsing() {
        assert_eq!(parse_year("2000"), Some(2000));
        assert_eq!(parse_year("2000.0"), Some(2000));
        assert_eq!(parse_year("2000.5"), None);
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("NA"), None);
        assert_eq!(parse_year("MMXX"), None);
        assert_eq!(parse_year("1e30"), None);
    }

    #[test]
    fn blank_year_keeps_row() {
        let loaded = parse("Station Number;Year;Jan\n1;;3.0\n1;x;4.0\n");
        assert_eq!(loaded.table.len(), 2);
        assert_eq!(loaded.table.years(), [None, None]);
    }

    #[test]
    fn short_rows_pad_with_missing() {
        let loaded = parse("Station Number;Year;Jan;Feb\n1;2000;3.0\n");
        assert_eq!(loaded.table.len(), 1);
        assert_eq!(loaded.table.month_columns()[1].values, vec![None]);
    }

    #[test]
    fn blank_station_rows_are_skipped() {
        let loaded = parse("Station Number;Year;Jan\n;2000;1\n  ;2000;2\n9;2000;3\n");
        assert_eq!(loaded.table.stations(), ["9"]);
    }

    #[test]
    fn header_without_months() {
        let loaded = parse("Station Number;Year\n1;2000\n");
        assert!(loaded.months.is_empty());
        assert_eq!(loaded.table.len(), 1);
    }

    #[test]
    fn missing_required_column() {
        let err = read_table("Station;Year;Jan\n1;2000;1\n".as_bytes(), Path::new("bad.csv"))
            .unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingColumn {
                column: STATION_COLUMN,
                ..
            }
        ));

        let err = read_table("Station Number;Jan\n1;1\n".as_bytes(), Path::new("bad.csv"))
            .unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingColumn {
                column: YEAR_COLUMN,
                ..
            }
        ));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut bytes = b"Station Number;Year;Jan\n".to_vec();
        bytes.extend_from_slice(b"St\xffation;2000;1\n");
        let loaded = read_table(bytes.as_slice(), Path::new("x.csv")).unwrap();
        assert_eq!(loaded.table.stations(), ["St\u{FFFD}ation"]);
    }

    #[test]
    fn load_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "Station Number;Year;Dec\n42;1990;-3.25\n").unwrap();

        let loaded = load_table(file.path()).unwrap();
        assert_eq!(loaded.table.stations(), ["42"]);
        assert_eq!(loaded.table.month_columns()[0].values, vec![Some(-3.25)]);
    }

    #[test]
    fn load_missing_file() {
        let err = load_table(Path::new("/nonexistent/temperature_data.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::NotFound { .. }));
    }
}
