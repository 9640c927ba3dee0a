use crate::error::{config_error, TallyResult};
use chrono::{Datelike, Duration, Months, NaiveDate, Utc};
use chrono_tz::Tz;

/// Parse a date string in YYYY-MM-DD format
pub fn parse_date(date_str: &str) -> TallyResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| config_error(&format!("Invalid date '{}', expected YYYY-MM-DD", date_str)))
}

/// Parse an IANA timezone name like "Europe/Helsinki"
pub fn parse_timezone(name: &str) -> TallyResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| config_error(&format!("Unknown timezone '{}'", name)))
}

/// Today's date in the given timezone
pub fn today_in(timezone: Tz) -> NaiveDate {
    Utc::now().with_timezone(&timezone).date_naive()
}

/// Monday-to-Sunday week containing the given date
pub fn week_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date
        .checked_sub_signed(Duration::days(
            date.weekday().num_days_from_monday() as i64
        ))
        .unwrap_or(date);

    let sunday = monday
        .checked_add_signed(Duration::days(6))
        .unwrap_or(monday);

    (monday, sunday)
}

/// First-to-last day of the month containing the given date
pub fn month_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);

    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next_month| next_month.checked_sub_signed(Duration::days(1)))
        .unwrap_or(first);

    (first, last)
}

/// First-to-last day of the calendar quarter containing the given date
pub fn quarter_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first_month = (date.month0() / 3) * 3 + 1;
    let first = NaiveDate::from_ymd_opt(date.year(), first_month, 1).unwrap_or(date);

    let last = first
        .checked_add_months(Months::new(3))
        .and_then(|next_quarter| next_quarter.checked_sub_signed(Duration::days(1)))
        .unwrap_or(first);

    (first, last)
}

/// First-to-last day of the year containing the given date
pub fn year_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
    let last = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);

    (first, last)
}
