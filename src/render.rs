use crate::analytics::{Bucket, Category, TallyReport, View};
use crate::error::TallyResult;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Width of a full bar in the terminal view
const BAR_WIDTH: usize = 28;

/// Output format for one-shot reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Render a report in the requested format
pub fn render(report: &TallyReport, format: OutputFormat) -> TallyResult<String> {
    match format {
        OutputFormat::Text => Ok(to_text(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&to_json(report))?),
    }
}

/// Render a report as an aligned terminal bar view
pub fn to_text(report: &TallyReport) -> String {
    let mut out = String::new();

    if report.view == View::Day {
        out.push_str(&format!(
            "{} {} ({})\n\n",
            report.view, report.range_start, report.timezone
        ));
    } else {
        out.push_str(&format!(
            "{} {} - {} ({})\n\n",
            report.view, report.range_start, report.range_end, report.timezone
        ));
    }

    if report.is_empty() {
        out.push_str("  No events in this range.\n");
        return out;
    }

    if report.view == View::Day {
        let totals = report.category_totals();
        let max_seconds = max_seconds_of(&totals);

        for category in Category::ALL {
            if let Some(bucket) = totals.get(&category) {
                out.push_str(&category_row(category, bucket, max_seconds));
            }
        }
    } else {
        let days = report.days();
        let max_seconds = report
            .buckets
            .values()
            .map(|bucket| bucket.seconds)
            .max()
            .unwrap_or(0);

        for (day, categories) in &days {
            out.push_str(&format!("{}\n", day.format("%a %Y-%m-%d")));
            for category in Category::ALL {
                if let Some(bucket) = categories.get(&category) {
                    out.push_str(&category_row(category, bucket, max_seconds));
                }
            }
            out.push('\n');
        }
    }

    out.push('\n');
    out.push_str(&format!(
        "{}, {:.1}h active",
        plural(report.summary.total_events, "event"),
        report.summary.active_hours()
    ));
    if let Some(category) = report.summary.most_common {
        out.push_str(&format!(", most time in {}", category.label()));
    }
    out.push('\n');

    out
}

/// Render a report as chart-ready JSON.
///
/// Single-day reports carry a flat `categories` mapping; multi-day reports
/// nest day -> category and add range-wide `totals`. Days without events
/// are omitted; every included mapping carries all four categories so the
/// shape stays stable for the charting layer.
pub fn to_json(report: &TallyReport) -> Value {
    let summary = json!({
        "total_events": report.summary.total_events,
        "total_seconds": report.summary.total_seconds,
        "active_hours": report.summary.active_hours(),
        "most_common": report.summary.most_common.map(|category| category.as_str()),
    });

    if report.view == View::Day {
        json!({
            "view": report.view.as_str(),
            "date": report.range_start.format("%Y-%m-%d").to_string(),
            "timezone": report.timezone,
            "categories": categories_value(&report.category_totals()),
            "summary": summary,
        })
    } else {
        let mut days = Map::new();
        for (day, categories) in report.days() {
            days.insert(
                day.format("%Y-%m-%d").to_string(),
                categories_value(&categories),
            );
        }

        json!({
            "view": report.view.as_str(),
            "range": {
                "start": report.range_start.format("%Y-%m-%d").to_string(),
                "end": report.range_end.format("%Y-%m-%d").to_string(),
            },
            "timezone": report.timezone,
            "days": days,
            "totals": categories_value(&report.category_totals()),
            "summary": summary,
        })
    }
}

/// One aligned category row of the terminal view
fn category_row(category: Category, bucket: &Bucket, max_seconds: i64) -> String {
    format!(
        "  {:<14} {:>6}  {:<width$}  {}\n",
        category.label(),
        format!("{:.1}h", bucket.hours()),
        bar(bucket.seconds, max_seconds),
        plural(bucket.events, "event"),
        width = BAR_WIDTH,
    )
}

/// Bar scaled against the largest row on display
fn bar(seconds: i64, max_seconds: i64) -> String {
    if seconds <= 0 || max_seconds <= 0 {
        return String::new();
    }

    let width = ((seconds * BAR_WIDTH as i64) / max_seconds).max(1) as usize;
    "█".repeat(width.min(BAR_WIDTH))
}

fn max_seconds_of(totals: &BTreeMap<Category, Bucket>) -> i64 {
    totals.values().map(|bucket| bucket.seconds).max().unwrap_or(0)
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// All four categories, zero-filled where absent
fn categories_value(totals: &BTreeMap<Category, Bucket>) -> Value {
    let mut map = Map::new();
    for category in Category::ALL {
        let bucket = totals.get(&category).copied().unwrap_or_default();
        map.insert(
            category.as_str().to_string(),
            json!({
                "seconds": bucket.seconds,
                "hours": bucket.hours(),
                "events": bucket.events,
            }),
        );
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{RuleSet, TrackedEvent};
    use chrono::{NaiveDate, TimeZone};
    use chrono_tz::Tz;

    const ZONE: Tz = chrono_tz::Europe::Helsinki;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn event(calendar: Option<&str>, d: u32, start: (u32, u32), end: (u32, u32)) -> TrackedEvent {
        TrackedEvent {
            calendar_name: calendar.map(String::from),
            title: None,
            start: Some(ZONE.with_ymd_and_hms(2025, 3, d, start.0, start.1, 0).unwrap()),
            end: Some(ZONE.with_ymd_and_hms(2025, 3, d, end.0, end.1, 0).unwrap()),
        }
    }

    fn sample_day_report() -> TallyReport {
        let events = vec![
            event(Some("Prod Support"), 10, (9, 0), (11, 0)),
            event(Some("Admin Tasks"), 10, (11, 0), (11, 30)),
            event(None, 10, (14, 0), (15, 0)),
        ];
        TallyReport::build(
            View::Day,
            date(10),
            "Europe/Helsinki",
            &events,
            &RuleSet::default(),
        )
    }

    #[test]
    fn test_day_json_is_a_flat_category_mapping() {
        let value = to_json(&sample_day_report());

        assert_eq!(value["view"], "day");
        assert_eq!(value["date"], "2025-03-10");
        assert_eq!(value["timezone"], "Europe/Helsinki");
        assert!(value.get("days").is_none());

        let categories = &value["categories"];
        assert_eq!(categories["production"]["seconds"], 7200);
        assert_eq!(categories["production"]["events"], 1);
        assert_eq!(categories["admin_rest"]["seconds"], 1800);
        assert_eq!(categories["other"]["seconds"], 3600);
        // Absent categories are zero-filled, not missing
        assert_eq!(categories["non_production"]["seconds"], 0);

        assert_eq!(value["summary"]["total_events"], 3);
        assert_eq!(value["summary"]["active_hours"], 3.5);
        assert_eq!(value["summary"]["most_common"], "production");
    }

    #[test]
    fn test_multi_day_json_nests_days_and_totals() {
        let events = vec![
            event(Some("Prod Support"), 10, (9, 0), (10, 0)),
            event(Some("Prod Support"), 11, (9, 0), (11, 0)),
        ];
        let report = TallyReport::build(
            View::Week,
            date(10),
            "Europe/Helsinki",
            &events,
            &RuleSet::default(),
        );

        let value = to_json(&report);

        assert_eq!(value["view"], "week");
        assert_eq!(value["range"]["start"], "2025-03-10");
        assert_eq!(value["range"]["end"], "2025-03-16");
        assert_eq!(value["days"]["2025-03-10"]["production"]["seconds"], 3600);
        assert_eq!(value["days"]["2025-03-11"]["production"]["seconds"], 7200);
        // Days without events are omitted entirely
        assert!(value["days"].get("2025-03-12").is_none());
        assert_eq!(value["totals"]["production"]["seconds"], 10800);
    }

    #[test]
    fn test_empty_report_json_carries_zeroes() {
        let report = TallyReport::build(
            View::Day,
            date(10),
            "UTC",
            &[],
            &RuleSet::default(),
        );

        let value = to_json(&report);

        assert_eq!(value["summary"]["total_events"], 0);
        assert_eq!(value["summary"]["total_seconds"], 0);
        assert_eq!(value["summary"]["most_common"], Value::Null);
        assert_eq!(value["categories"]["production"]["seconds"], 0);
    }

    #[test]
    fn test_text_view_lists_categories_and_summary() {
        let text = to_text(&sample_day_report());

        assert!(text.contains("day 2025-03-10 (Europe/Helsinki)"));
        assert!(text.contains("Production"));
        assert!(text.contains("2.0h"));
        assert!(text.contains("Admin & rest"));
        assert!(text.contains("0.5h"));
        assert!(text.contains("3 events, 3.5h active, most time in Production"));
        // Nothing was filed under non-production
        assert!(!text.contains("Non-production"));
    }

    #[test]
    fn test_text_view_has_an_explicit_empty_line() {
        let report = TallyReport::build(
            View::Week,
            date(10),
            "UTC",
            &[],
            &RuleSet::default(),
        );

        let text = to_text(&report);

        assert!(text.contains("No events in this range."));
    }

    #[test]
    fn test_bars_scale_to_the_largest_row() {
        let full = bar(7200, 7200);
        let half = bar(3600, 7200);
        let none = bar(0, 7200);

        assert_eq!(full.chars().count(), BAR_WIDTH);
        assert_eq!(half.chars().count(), BAR_WIDTH / 2);
        assert!(none.is_empty());
        // Tiny but nonzero durations still show a sliver
        assert_eq!(bar(1, 7200).chars().count(), 1);
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "event"), "1 event");
        assert_eq!(plural(2, "event"), "2 events");
        assert_eq!(plural(0, "event"), "0 events");
    }
}
