//! Column-oriented temperature table.

use std::fmt;

/// Error returned when a header name is not a month abbreviation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a month column: {0:?}")]
pub struct InvalidMonth(String);

/// A calendar month, as named by the dataset's column headers.
///
/// # Examples
///
/// ```
/// use temperature_server::dataset::Month;
///
/// let feb = Month::parse("Feb").unwrap();
/// assert_eq!(feb.number(), 2);
/// assert_eq!(feb.as_str(), "Feb");
///
/// // Header matching is exact after trimming
/// assert!(Month::parse(" Feb ").is_ok());
/// assert!(Month::parse("feb").is_err());
/// assert!(Month::parse("February").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(u8);

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl Month {
    /// All twelve months in calendar order.
    pub fn all() -> impl Iterator<Item = Month> {
        (1..=12).map(Month)
    }

    /// Parse a header name (`Jan`..`Dec`), ignoring surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidMonth> {
        let s = s.trim();
        MONTH_NAMES
            .iter()
            .position(|name| *name == s)
            .map(|i| Month(i as u8 + 1))
            .ok_or_else(|| InvalidMonth(s.to_string()))
    }

    /// Month number, 1 for January through 12 for December.
    pub fn number(self) -> u8 {
        self.0
    }

    /// The column header for this month.
    pub fn as_str(self) -> &'static str {
        MONTH_NAMES[usize::from(self.0 - 1)]
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One month's readings, aligned with the table's rows.
///
/// `None` marks a missing reading; stored values are always finite.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthColumn {
    pub month: Month,
    pub values: Vec<Option<f32>>,
}

/// The loaded dataset.
///
/// All columns have the same length. Month columns appear only when the
/// source header has them, in calendar order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    stations: Vec<String>,
    years: Vec<Option<i32>>,
    months: Vec<MonthColumn>,
}

impl Table {
    /// Assemble a table from its columns.
    ///
    /// Month columns are re-ordered into calendar order; a second column
    /// for an already-present month is dropped.
    ///
    /// # Panics
    /// Panics if any column length differs from `stations.len()`.
    pub fn new(stations: Vec<String>, years: Vec<Option<i32>>, mut months: Vec<MonthColumn>) -> Self {
        let rows = stations.len();
        assert_eq!(years.len(), rows, "year column length mismatch");
        for column in &months {
            assert_eq!(
                column.values.len(),
                rows,
                "{} column length mismatch",
                column.month
            );
        }

        months.sort_by_key(|c| c.month);
        months.dedup_by_key(|c| c.month);

        Self {
            stations,
            years,
            months,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Station identifier of every row.
    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    /// Year of every row, `None` where the cell was blank or unparsable.
    pub fn years(&self) -> &[Option<i32>] {
        &self.years
    }

    /// Month columns present, in calendar order.
    pub fn month_columns(&self) -> &[MonthColumn] {
        &self.months
    }

    /// The months present, in calendar order.
    pub fn months(&self) -> Vec<Month> {
        self.months.iter().map(|c| c.month).collect()
    }

    /// The present readings of one row, in calendar order, paired with their month.
    pub fn row_readings(&self, row: usize) -> impl Iterator<Item = (Month, f32)> + '_ {
        self.months
            .iter()
            .filter_map(move |c| c.values[row].map(|v| (c.month, v)))
    }
}
