use super::models::CalendarEvent;
use crate::analytics::TrackedEvent;
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse an RFC 3339 timestamp and convert it into the viewer's timezone
fn parse_date_time(raw: &str, timezone: Tz) -> Option<DateTime<Tz>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&timezone))
}

/// Interpret an all-day date as local midnight in the viewer's timezone
fn parse_all_day(raw: &str, timezone: Tz) -> Option<DateTime<Tz>> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    local_midnight(date.and_time(NaiveTime::MIN), timezone)
}

fn local_midnight(naive: NaiveDateTime, timezone: Tz) -> Option<DateTime<Tz>> {
    match timezone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => None,
    }
}

/// Event start in the viewer's timezone, `None` when unparseable
pub fn event_start(event: &CalendarEvent, timezone: Tz) -> Option<DateTime<Tz>> {
    if let Some(raw) = &event.start_date_time {
        parse_date_time(raw, timezone)
    } else if let Some(raw) = &event.start_date {
        parse_all_day(raw, timezone)
    } else {
        None
    }
}

/// Event end in the viewer's timezone, `None` when unparseable
pub fn event_end(event: &CalendarEvent, timezone: Tz) -> Option<DateTime<Tz>> {
    if let Some(raw) = &event.end_date_time {
        parse_date_time(raw, timezone)
    } else if let Some(raw) = &event.end_date {
        parse_all_day(raw, timezone)
    } else {
        None
    }
}

/// Normalize a fetched event into the viewer's timezone.
///
/// Timestamps that fail to parse become `None`; the event itself is never
/// dropped here.
pub fn localize(event: &CalendarEvent, timezone: Tz) -> TrackedEvent {
    TrackedEvent {
        calendar_name: event.calendar_name.clone(),
        title: event.summary.clone(),
        start: event_start(event, timezone),
        end: event_end(event, timezone),
    }
}

/// UTC instant where the given local day begins
fn day_start(day: NaiveDate, timezone: Tz) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);
    match timezone.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // Zones that skip midnight on a DST transition start the day at
        // the first valid instant instead
        LocalResult::None => timezone
            .from_local_datetime(&(midnight + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight)),
    }
}

/// Half-open UTC fetch window covering an inclusive local date range
pub fn utc_window(
    range_start: NaiveDate,
    range_end: NaiveDate,
    timezone: Tz,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let end_exclusive = range_end
        .checked_add_signed(Duration::days(1))
        .unwrap_or(range_end);

    (day_start(range_start, timezone), day_start(end_exclusive, timezone))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZONE: Tz = chrono_tz::Europe::Helsinki;

    fn event_with_times(
        start_date_time: Option<&str>,
        start_date: Option<&str>,
    ) -> CalendarEvent {
        CalendarEvent {
            id: String::from("evt"),
            start_date_time: start_date_time.map(String::from),
            start_date: start_date.map(String::from),
            ..CalendarEvent::default()
        }
    }

    #[test]
    fn test_rfc3339_start_converts_into_viewer_zone() {
        // 07:00 UTC is 09:00 in Helsinki (UTC+2 in winter)
        let event = event_with_times(Some("2025-03-10T07:00:00Z"), None);
        let start = event_start(&event, ZONE).unwrap();

        assert_eq!(start, ZONE.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_all_day_start_is_local_midnight() {
        let event = event_with_times(None, Some("2025-03-10"));
        let start = event_start(&event, ZONE).unwrap();

        assert_eq!(start, ZONE.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_unparseable_timestamps_become_none() {
        assert!(event_start(&event_with_times(Some("not a time"), None), ZONE).is_none());
        assert!(event_start(&event_with_times(None, Some("10.03.2025")), ZONE).is_none());
        assert!(event_start(&event_with_times(None, None), ZONE).is_none());
    }

    #[test]
    fn test_localize_keeps_calendar_name_and_title() {
        let mut event = event_with_times(Some("2025-03-10T07:00:00Z"), None);
        event.calendar_name = Some(String::from("Prod Support"));
        event.summary = Some(String::from("Incident review"));
        event.end_date_time = Some(String::from("2025-03-10T08:00:00Z"));

        let tracked = localize(&event, ZONE);

        assert_eq!(tracked.calendar_name.as_deref(), Some("Prod Support"));
        assert_eq!(tracked.title.as_deref(), Some("Incident review"));
        assert!(tracked.start.is_some());
        assert!(tracked.end.is_some());
    }

    #[test]
    fn test_utc_window_covers_the_local_range() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 19).unwrap();

        let (time_min, time_max) = utc_window(start, end, ZONE);

        // Helsinki midnight is 22:00 UTC the previous evening in January
        assert_eq!(
            time_min,
            Utc.with_ymd_and_hms(2025, 1, 12, 22, 0, 0).unwrap()
        );
        assert_eq!(
            time_max,
            Utc.with_ymd_and_hms(2025, 1, 19, 22, 0, 0).unwrap()
        );
    }
}
