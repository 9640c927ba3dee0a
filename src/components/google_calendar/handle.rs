use super::actor::GoogleCalendarActorHandle;
use super::models::Calendar;
use super::time;
use crate::analytics::TrackedEvent;
use crate::components::redis_service::RedisActorHandle;
use crate::config::Config;
use crate::error::TallyResult;
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Handle for interacting with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarHandle {
    actor_handle: GoogleCalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl GoogleCalendarHandle {
    /// Create a new GoogleCalendarHandle and spawn the actor
    pub fn new(config: Arc<RwLock<Config>>, redis_handle: RedisActorHandle) -> Self {
        use super::actor::GoogleCalendarActor;

        // Create the actor and get its handle
        let (mut actor, handle) = GoogleCalendarActor::new(config, redis_handle);

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// List the account's calendars
    pub async fn list_calendars(&self) -> TallyResult<Vec<Calendar>> {
        self.actor_handle.list_calendars().await
    }

    /// Fetch events covering an inclusive local date range, normalized
    /// into the viewer's timezone
    pub async fn events_in_range(
        &self,
        range_start: NaiveDate,
        range_end: NaiveDate,
        timezone: Tz,
    ) -> TallyResult<Vec<TrackedEvent>> {
        let (time_min, time_max) = time::utc_window(range_start, range_end, timezone);
        let events = self.actor_handle.fetch_events(time_min, time_max).await?;

        Ok(events
            .iter()
            .map(|event| time::localize(event, timezone))
            .collect())
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> TallyResult<()> {
        self.actor_handle.shutdown().await
    }
}
