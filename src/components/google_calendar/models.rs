/// One entry of the account's calendar list
#[derive(Debug, Clone, Default)]
pub struct Calendar {
    pub id: String,
    /// Display name shown in the Google Calendar UI
    pub summary: Option<String>,
    pub primary: bool,
}

/// Simplified calendar event representation.
///
/// Start and end arrive either as an RFC 3339 `dateTime` or as an all-day
/// `date`, exactly as the API sends them; parsing happens at localization.
#[derive(Debug, Clone, Default)]
pub struct CalendarEvent {
    pub id: String,
    /// Calendar the event was fetched from
    pub calendar_id: String,
    /// Display name of that calendar, used for classification
    pub calendar_name: Option<String>,
    pub summary: Option<String>,
    pub start_date_time: Option<String>,
    pub start_date: Option<String>,
    pub end_date_time: Option<String>,
    pub end_date: Option<String>,
}
