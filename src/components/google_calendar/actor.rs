use super::models::{Calendar, CalendarEvent};
use super::token::TokenManager;
use crate::components::redis_service::RedisActorHandle;
use crate::config::Config;
use crate::error::{google_calendar_error, TallyResult};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};
use url::Url;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// The Google Calendar actor that processes messages
pub struct GoogleCalendarActor {
    config: Arc<RwLock<Config>>,
    token_manager: TokenManager,
    client: Client,
    command_rx: mpsc::Receiver<GoogleCalendarCommand>,
}

/// Commands that can be sent to the Google Calendar actor
pub enum GoogleCalendarCommand {
    ListCalendars(mpsc::Sender<TallyResult<Vec<Calendar>>>),
    FetchEvents {
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        response_tx: mpsc::Sender<TallyResult<Vec<CalendarEvent>>>,
    },
    Shutdown,
}

/// Handle for communicating with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarActorHandle {
    command_tx: mpsc::Sender<GoogleCalendarCommand>,
}

impl GoogleCalendarActorHandle {
    /// List the account's calendars
    pub async fn list_calendars(&self) -> TallyResult<Vec<Calendar>> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(GoogleCalendarCommand::ListCalendars(response_tx))
            .await
            .map_err(|e| google_calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| google_calendar_error("Response channel closed"))?
    }

    /// Fetch events from every selected calendar for a UTC window
    pub async fn fetch_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> TallyResult<Vec<CalendarEvent>> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(GoogleCalendarCommand::FetchEvents {
                time_min,
                time_max,
                response_tx,
            })
            .await
            .map_err(|e| google_calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| google_calendar_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> TallyResult<()> {
        let _ = self.command_tx.send(GoogleCalendarCommand::Shutdown).await;
        Ok(())
    }
}

impl GoogleCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(
        config: Arc<RwLock<Config>>,
        redis_handle: RedisActorHandle,
    ) -> (Self, GoogleCalendarActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            config: Arc::clone(&config),
            token_manager: TokenManager::new(config, redis_handle),
            client: Client::new(),
            command_rx,
        };

        let handle = GoogleCalendarActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Google Calendar actor started");

        // Process commands
        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                GoogleCalendarCommand::ListCalendars(response_tx) => {
                    let result = self.get_calendars().await;
                    let _ = response_tx.send(result).await;
                }
                GoogleCalendarCommand::FetchEvents {
                    time_min,
                    time_max,
                    response_tx,
                } => {
                    let result = self.get_events(time_min, time_max).await;
                    let _ = response_tx.send(result).await;
                }
                GoogleCalendarCommand::Shutdown => {
                    info!("Google Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Google Calendar actor shut down");
    }

    /// Fetch the account's calendar list
    async fn get_calendars(&self) -> TallyResult<Vec<Calendar>> {
        let token = self.token_manager.get_token().await?;
        let access_token = access_token_of(&token)?;

        Self::list_calendars(&self.client, &access_token).await
    }

    /// Fetch events from every selected calendar, tagging each event with
    /// the display name of the calendar it came from
    async fn get_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> TallyResult<Vec<CalendarEvent>> {
        let token = self.token_manager.get_token().await?;
        let access_token = access_token_of(&token)?;

        // Optional restriction to specific calendar IDs
        let restriction = {
            let config_read = self.config.read().await;
            config_read.calendars.clone()
        };

        let calendars = Self::list_calendars(&self.client, &access_token).await?;
        let selected: Vec<Calendar> = match &restriction {
            Some(ids) => calendars
                .into_iter()
                .filter(|calendar| ids.iter().any(|id| id == &calendar.id))
                .collect(),
            None => calendars,
        };

        let time_min = time_min.to_rfc3339();
        let time_max = time_max.to_rfc3339();

        let mut events = Vec::new();
        for calendar in &selected {
            let mut fetched = Self::fetch_calendar_events(
                &self.client,
                &access_token,
                calendar,
                &time_min,
                &time_max,
            )
            .await?;
            events.append(&mut fetched);
        }

        debug!(
            "Fetched {} events from {} calendars",
            events.len(),
            selected.len()
        );

        Ok(events)
    }

    /// Fetch the calendar list, following pagination
    async fn list_calendars(client: &Client, access_token: &str) -> TallyResult<Vec<Calendar>> {
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = Url::parse(&format!("{}/users/me/calendarList", CALENDAR_API_BASE))
                .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let response_data = Self::get_json(client, url, access_token).await?;

            if let Some(items) = response_data.get("items").and_then(|i| i.as_array()) {
                for item in items {
                    let id = item
                        .get("id")
                        .and_then(|id| id.as_str())
                        .unwrap_or("")
                        .to_string();
                    let summary = item
                        .get("summary")
                        .and_then(|s| s.as_str())
                        .map(|s| s.to_string());
                    let primary = item
                        .get("primary")
                        .and_then(|p| p.as_bool())
                        .unwrap_or(false);

                    calendars.push(Calendar { id, summary, primary });
                }
            }

            page_token = next_page_token(&response_data);
            if page_token.is_none() {
                break;
            }
        }

        Ok(calendars)
    }

    /// Fetch one calendar's events for a UTC window, following pagination
    async fn fetch_calendar_events(
        client: &Client,
        access_token: &str,
        calendar: &Calendar,
        time_min: &str,
        time_max: &str,
    ) -> TallyResult<Vec<CalendarEvent>> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = Url::parse(&format!("{}/calendars", CALENDAR_API_BASE))
                .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

            // Calendar IDs can contain characters like '#', so they go in
            // as a path segment rather than into the format string
            url.path_segments_mut()
                .map_err(|_| google_calendar_error("Invalid calendar API base URL"))?
                .push(&calendar.id)
                .push("events");

            {
                let mut query = url.query_pairs_mut();
                query.append_pair("timeMin", time_min);
                query.append_pair("timeMax", time_max);
                query.append_pair("singleEvents", "true");
                query.append_pair("orderBy", "startTime");
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let response_data = Self::get_json(client, url, access_token).await?;

            if let Some(items) = response_data.get("items").and_then(|i| i.as_array()) {
                for item in items {
                    events.push(parse_event(item, calendar));
                }
            }

            page_token = next_page_token(&response_data);
            if page_token.is_none() {
                break;
            }
        }

        Ok(events)
    }

    /// Make an authenticated GET request and parse the JSON response
    async fn get_json(client: &Client, url: Url, access_token: &str) -> TallyResult<Value> {
        let response = client
            .get(url)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to fetch from API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "API request failed: HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse API response: {}", e)))
    }
}

/// Extract the access token string from a token JSON
fn access_token_of(token: &Value) -> TallyResult<String> {
    token
        .get("access_token")
        .and_then(|t| t.as_str())
        .map(|t| t.to_string())
        .ok_or_else(|| google_calendar_error("No access token available"))
}

/// Pagination cursor of a list response, if any
fn next_page_token(response_data: &Value) -> Option<String> {
    response_data
        .get("nextPageToken")
        .and_then(|t| t.as_str())
        .map(|t| t.to_string())
}

/// Convert one API event item into a [`CalendarEvent`]
fn parse_event(event: &Value, calendar: &Calendar) -> CalendarEvent {
    let id = event
        .get("id")
        .and_then(|id| id.as_str())
        .unwrap_or("")
        .to_string();
    let summary = event
        .get("summary")
        .and_then(|s| s.as_str())
        .map(|s| s.to_string());

    let start_date_time = event
        .get("start")
        .and_then(|start| start.get("dateTime"))
        .and_then(|dt| dt.as_str())
        .map(|s| s.to_string());

    let start_date = event
        .get("start")
        .and_then(|start| start.get("date"))
        .and_then(|d| d.as_str())
        .map(|s| s.to_string());

    let end_date_time = event
        .get("end")
        .and_then(|end| end.get("dateTime"))
        .and_then(|dt| dt.as_str())
        .map(|s| s.to_string());

    let end_date = event
        .get("end")
        .and_then(|end| end.get("date"))
        .and_then(|d| d.as_str())
        .map(|s| s.to_string());

    CalendarEvent {
        id,
        calendar_id: calendar.id.clone(),
        calendar_name: calendar.summary.clone(),
        summary,
        start_date_time,
        start_date,
        end_date_time,
        end_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_event_tags_the_owning_calendar() {
        let calendar = Calendar {
            id: String::from("team@example.com"),
            summary: Some(String::from("Prod Support")),
            primary: false,
        };
        let item = json!({
            "id": "evt1",
            "summary": "Incident review",
            "start": { "dateTime": "2025-03-10T09:00:00+02:00" },
            "end": { "dateTime": "2025-03-10T10:00:00+02:00" },
        });

        let event = parse_event(&item, &calendar);

        assert_eq!(event.id, "evt1");
        assert_eq!(event.calendar_id, "team@example.com");
        assert_eq!(event.calendar_name.as_deref(), Some("Prod Support"));
        assert_eq!(
            event.start_date_time.as_deref(),
            Some("2025-03-10T09:00:00+02:00")
        );
        assert!(event.start_date.is_none());
    }

    #[test]
    fn test_parse_event_reads_all_day_dates() {
        let calendar = Calendar::default();
        let item = json!({
            "id": "evt2",
            "start": { "date": "2025-03-10" },
            "end": { "date": "2025-03-11" },
        });

        let event = parse_event(&item, &calendar);

        assert_eq!(event.start_date.as_deref(), Some("2025-03-10"));
        assert_eq!(event.end_date.as_deref(), Some("2025-03-11"));
        assert!(event.start_date_time.is_none());
        assert!(event.summary.is_none());
    }

    #[test]
    fn test_next_page_token() {
        assert_eq!(
            next_page_token(&json!({ "nextPageToken": "abc" })),
            Some(String::from("abc"))
        );
        assert_eq!(next_page_token(&json!({ "items": [] })), None);
    }
}
