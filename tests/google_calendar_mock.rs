use chrono::NaiveDate;
use chrono_tz::Tz;
use worktally::analytics::{aggregate, Category, RuleSet, TrackedEvent};
use worktally::components::google_calendar::models::CalendarEvent;
use worktally::components::google_calendar::time::localize;
use worktally::error::TallyResult;

const ZONE: Tz = chrono_tz::Europe::Helsinki;

/// Mock implementation of the Google Calendar handle for testing
#[derive(Debug, Clone, Default)]
pub struct MockGoogleCalendarHandle {
    events: Vec<CalendarEvent>,
}

impl MockGoogleCalendarHandle {
    /// Create a new mock handle with predefined events
    pub fn new() -> Self {
        let events = vec![
            CalendarEvent {
                id: "event1".to_string(),
                calendar_id: "oncall".to_string(),
                calendar_name: Some("Prod Oncall".to_string()),
                summary: Some("Incident review".to_string()),
                start_date_time: Some("2025-03-10T09:00:00+02:00".to_string()),
                end_date_time: Some("2025-03-10T11:00:00+02:00".to_string()),
                ..Default::default()
            },
            CalendarEvent {
                id: "event2".to_string(),
                calendar_id: "admin".to_string(),
                calendar_name: Some("Admin".to_string()),
                summary: Some("Timesheets".to_string()),
                start_date: Some("2025-03-10".to_string()),
                end_date: Some("2025-03-11".to_string()),
                ..Default::default()
            },
        ];

        Self { events }
    }

    /// Localized events, mirroring what the real handle returns
    pub async fn events_in_range(&self, timezone: Tz) -> TallyResult<Vec<TrackedEvent>> {
        Ok(self
            .events
            .iter()
            .map(|event| localize(event, timezone))
            .collect())
    }

    /// Shutdown the mock
    #[allow(dead_code)]
    pub async fn shutdown(&self) -> TallyResult<()> {
        Ok(())
    }
}

/// Test that demonstrates how to use the mock
#[tokio::test]
async fn test_google_calendar_mock() {
    // Create the mock
    let mock_handle = MockGoogleCalendarHandle::new();

    // Get localized events from the mock
    let events = mock_handle.events_in_range(ZONE).await.unwrap();

    // Verify events
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].calendar_name.as_deref(), Some("Prod Oncall"));
    assert!(events[0].start.is_some());

    // The all-day event spans local midnight to local midnight
    let all_day = &events[1];
    let start = all_day.start.unwrap();
    let end = all_day.end.unwrap();
    assert_eq!((end - start).num_hours(), 24);
}

/// Mock events feed straight into aggregation
#[tokio::test]
async fn test_mock_events_aggregate() {
    let mock_handle = MockGoogleCalendarHandle::new();
    let events = mock_handle.events_in_range(ZONE).await.unwrap();

    let rules = RuleSet::default();
    let fallback = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let buckets = aggregate(&events, &rules, fallback);

    let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    assert_eq!(
        buckets.get(&(day, Category::Production)).map(|b| b.seconds),
        Some(7200)
    );
    assert_eq!(
        buckets.get(&(day, Category::AdminRest)).map(|b| b.seconds),
        Some(24 * 3600)
    );
}
