use crate::analytics::category::{Category, RuleSet};
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use std::collections::BTreeMap;

/// A calendar event normalized into the viewer's timezone.
///
/// Timestamps that could not be parsed arrive as `None`; such events still
/// count, they just carry zero duration.
#[derive(Debug, Clone)]
pub struct TrackedEvent {
    /// Display name of the calendar the event belongs to
    pub calendar_name: Option<String>,
    /// Event title
    pub title: Option<String>,
    /// Localized start time
    pub start: Option<DateTime<Tz>>,
    /// Localized end time
    pub end: Option<DateTime<Tz>>,
}

/// Accumulated totals for one `(day, category)` cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bucket {
    /// Total event duration in whole seconds
    pub seconds: i64,
    /// Number of events
    pub events: usize,
}

impl Bucket {
    /// Total duration in hours, for display
    pub fn hours(&self) -> f64 {
        self.seconds as f64 / 3600.0
    }
}

/// Duration of one event in seconds, clamped to zero.
///
/// Events missing either timestamp, and events ending before they start,
/// contribute no time but are never dropped.
pub fn event_seconds(event: &TrackedEvent) -> i64 {
    match (event.start, event.end) {
        (Some(start), Some(end)) => (end - start).num_seconds().max(0),
        _ => 0,
    }
}

/// Day an event is attributed to: its start day in the viewer's timezone.
/// Overnight events belong wholly to the day they started on. Events with
/// no parseable start land on `fallback_day` so counts stay accurate.
fn event_day(event: &TrackedEvent, fallback_day: NaiveDate) -> NaiveDate {
    match event.start {
        Some(start) => start.date_naive(),
        None => fallback_day,
    }
}

/// Classify and bucket events into per-day per-category totals.
///
/// Every input event lands in exactly one bucket, so bucket event counts
/// always sum to the input length and bucket seconds always sum to the
/// clamped event durations. The result is a fresh value computed only from
/// the arguments.
pub fn aggregate(
    events: &[TrackedEvent],
    rules: &RuleSet,
    fallback_day: NaiveDate,
) -> BTreeMap<(NaiveDate, Category), Bucket> {
    let mut buckets: BTreeMap<(NaiveDate, Category), Bucket> = BTreeMap::new();

    for event in events {
        let category = rules.classify(event.calendar_name.as_deref());
        let day = event_day(event, fallback_day);

        let bucket = buckets.entry((day, category)).or_default();
        bucket.seconds += event_seconds(event);
        bucket.events += 1;
    }

    buckets
}
