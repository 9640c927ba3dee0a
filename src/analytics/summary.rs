use crate::analytics::aggregate::Bucket;
use crate::analytics::category::Category;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Headline numbers across a whole report range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Number of events in the range
    pub total_events: usize,
    /// Total clamped duration in seconds
    pub total_seconds: i64,
    /// Category with the most accumulated time, `None` when there were
    /// no events at all
    pub most_common: Option<Category>,
}

impl Summary {
    /// Total active time in hours, for display
    pub fn active_hours(&self) -> f64 {
        self.total_seconds as f64 / 3600.0
    }
}

/// Derive the headline summary from aggregated buckets.
///
/// `most_common` considers only categories with at least one event; ties
/// resolve to the earliest category in [`Category::ALL`] order.
pub fn summarize(buckets: &BTreeMap<(NaiveDate, Category), Bucket>) -> Summary {
    let mut total_events = 0;
    let mut total_seconds = 0;
    let mut per_category: BTreeMap<Category, Bucket> = BTreeMap::new();

    for ((_, category), bucket) in buckets {
        total_events += bucket.events;
        total_seconds += bucket.seconds;

        let entry = per_category.entry(*category).or_default();
        entry.seconds += bucket.seconds;
        entry.events += bucket.events;
    }

    // BTreeMap iterates categories in their fixed order, so keeping the
    // first strictly-largest total resolves ties toward earlier categories
    let mut most_common: Option<(Category, i64)> = None;
    for (category, bucket) in &per_category {
        if bucket.events == 0 {
            continue;
        }
        match most_common {
            Some((_, best)) if bucket.seconds <= best => {}
            _ => most_common = Some((*category, bucket.seconds)),
        }
    }

    Summary {
        total_events,
        total_seconds,
        most_common: most_common.map(|(category, _)| category),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn bucket(seconds: i64, events: usize) -> Bucket {
        Bucket { seconds, events }
    }

    #[test]
    fn test_empty_buckets_summarize_to_none() {
        let buckets = BTreeMap::new();
        let summary = summarize(&buckets);

        assert_eq!(summary.total_events, 0);
        assert_eq!(summary.total_seconds, 0);
        assert_eq!(summary.most_common, None);
        assert_eq!(summary.active_hours(), 0.0);
    }

    #[test]
    fn test_totals_sum_across_days_and_categories() {
        let mut buckets = BTreeMap::new();
        buckets.insert((day(10), Category::Production), bucket(7200, 2));
        buckets.insert((day(11), Category::Production), bucket(3600, 1));
        buckets.insert((day(10), Category::AdminRest), bucket(1800, 1));

        let summary = summarize(&buckets);

        assert_eq!(summary.total_events, 4);
        assert_eq!(summary.total_seconds, 12600);
        assert_eq!(summary.most_common, Some(Category::Production));
        assert!((summary.active_hours() - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_most_common_tie_breaks_in_fixed_order() {
        let mut buckets = BTreeMap::new();
        buckets.insert((day(10), Category::Other), bucket(3600, 1));
        buckets.insert((day(10), Category::AdminRest), bucket(3600, 1));

        let summary = summarize(&buckets);

        // AdminRest comes before Other in the fixed order
        assert_eq!(summary.most_common, Some(Category::AdminRest));
    }

    #[test]
    fn test_most_common_counts_zero_duration_events() {
        let mut buckets = BTreeMap::new();
        buckets.insert((day(10), Category::NonProduction), bucket(0, 3));

        let summary = summarize(&buckets);

        assert_eq!(summary.most_common, Some(Category::NonProduction));
    }
}
