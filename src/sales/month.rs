//! Calendar month selection and the half-open date range it covers.

use time::{Date, Month, OffsetDateTime};

use crate::Error;

/// A calendar month of a specific year.
///
/// The year is always explicit: callers that want "this year" must read the
/// clock themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthSelector {
    /// The calendar year.
    pub year: i32,
    /// The month, 1 (January) to 12 (December).
    pub month: u8,
}

impl MonthSelector {
    /// Create a selector without validating it. See [filter_by_month].
    pub fn new(year: i32, month: u8) -> Self {
        Self { year, month }
    }
}

/// A half-open interval of instants, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// The first instant in the range.
    pub start: OffsetDateTime,
    /// The first instant after the range.
    pub end: OffsetDateTime,
}

impl DateRange {
    /// Whether `instant` falls inside the range.
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Get the range from the first instant of the selected month (UTC) up to,
/// but not including, the first instant of the following month.
///
/// # Errors
/// Returns [Error::InvalidSelector] if the month is not in 1..=12 or the year
/// cannot be represented as a calendar date.
pub fn filter_by_month(selector: MonthSelector) -> Result<DateRange, Error> {
    let month = Month::try_from(selector.month).map_err(|_| {
        Error::InvalidSelector(format!(
            "month must be between 1 and 12, got {}",
            selector.month
        ))
    })?;

    let start = first_instant(selector.year, month)?;

    let (next_year, next_month) = match month {
        Month::December => (
            selector.year.checked_add(1).ok_or_else(|| {
                Error::InvalidSelector(format!("year {} is out of range", selector.year))
            })?,
            Month::January,
        ),
        month => (selector.year, month.next()),
    };
    let end = first_instant(next_year, next_month)?;

    Ok(DateRange { start, end })
}

fn first_instant(year: i32, month: Month) -> Result<OffsetDateTime, Error> {
    Date::from_calendar_date(year, month, 1)
        .map(|date| date.midnight().assume_utc())
        .map_err(|error| Error::InvalidSelector(format!("year {year} is out of range: {error}")))
}
