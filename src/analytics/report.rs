use crate::analytics::aggregate::{aggregate, Bucket, TrackedEvent};
use crate::analytics::category::{Category, RuleSet};
use crate::analytics::summary::{summarize, Summary};
use crate::utils::time;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

/// Reporting granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl View {
    /// Stable identifier used in JSON output
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Day => "day",
            View::Week => "week",
            View::Month => "month",
            View::Quarter => "quarter",
            View::Year => "year",
        }
    }

    /// Inclusive date range covered at this granularity around a
    /// reference date
    pub fn date_range(&self, reference: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            View::Day => (reference, reference),
            View::Week => time::week_range(reference),
            View::Month => time::month_range(reference),
            View::Quarter => time::quarter_range(reference),
            View::Year => time::year_range(reference),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully computed tally over one date range.
///
/// Reports are plain values: building one twice from the same inputs gives
/// the same report. The reference date is injected by the caller.
#[derive(Debug, Clone)]
pub struct TallyReport {
    /// Granularity the report was computed for
    pub view: View,
    /// Reference date the range was derived from
    pub reference: NaiveDate,
    /// Inclusive first day of the range
    pub range_start: NaiveDate,
    /// Inclusive last day of the range
    pub range_end: NaiveDate,
    /// IANA name of the timezone the events were localized to
    pub timezone: String,
    /// Per-day per-category totals
    pub buckets: BTreeMap<(NaiveDate, Category), Bucket>,
    /// Headline numbers for the whole range
    pub summary: Summary,
}

impl TallyReport {
    /// Classify, bucket and summarize events for one view
    pub fn build(
        view: View,
        reference: NaiveDate,
        timezone: &str,
        events: &[TrackedEvent],
        rules: &RuleSet,
    ) -> Self {
        let (range_start, range_end) = view.date_range(reference);
        let buckets = aggregate(events, rules, reference);
        let summary = summarize(&buckets);

        TallyReport {
            view,
            reference,
            range_start,
            range_end,
            timezone: timezone.to_string(),
            buckets,
            summary,
        }
    }

    /// True when the range holds no events at all
    pub fn is_empty(&self) -> bool {
        self.summary.total_events == 0
    }

    /// Per-category totals summed over the whole range
    pub fn category_totals(&self) -> BTreeMap<Category, Bucket> {
        let mut totals: BTreeMap<Category, Bucket> = BTreeMap::new();
        for ((_, category), bucket) in &self.buckets {
            let entry = totals.entry(*category).or_default();
            entry.seconds += bucket.seconds;
            entry.events += bucket.events;
        }
        totals
    }

    /// Buckets regrouped by day, for multi-day rendering
    pub fn days(&self) -> BTreeMap<NaiveDate, BTreeMap<Category, Bucket>> {
        let mut days: BTreeMap<NaiveDate, BTreeMap<Category, Bucket>> = BTreeMap::new();
        for ((day, category), bucket) in &self.buckets {
            days.entry(*day).or_default().insert(*category, *bucket);
        }
        days
    }
}
