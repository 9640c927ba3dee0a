mod actor;
mod handle;
pub mod models;
pub mod time;
pub mod token;

pub use handle::GoogleCalendarHandle;
pub use models::{Calendar, CalendarEvent};

use crate::config::Config;
use crate::error::TallyResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::redis_service::RedisActorHandle;

/// Google Calendar component owning the fetch actor
#[derive(Default)]
pub struct GoogleCalendar {
    handle: RwLock<Option<GoogleCalendarHandle>>,
}

impl GoogleCalendar {
    /// Create a new Google Calendar component
    pub fn new() -> Self {
        Self {
            handle: RwLock::new(None),
        }
    }

    /// Get the handle if it exists
    pub async fn get_handle(&self) -> Option<GoogleCalendarHandle> {
        let handle_lock = self.handle.read().await;
        handle_lock.clone()
    }
}

#[async_trait]
impl super::Component for GoogleCalendar {
    fn name(&self) -> &'static str {
        "google_calendar"
    }

    async fn init(
        &self,
        config: Arc<RwLock<Config>>,
        redis_handle: RedisActorHandle,
    ) -> TallyResult<()> {
        // Create a new handle if one doesn't exist
        let mut handle_lock = self.handle.write().await;
        if handle_lock.is_none() {
            *handle_lock = Some(GoogleCalendarHandle::new(config, redis_handle));
        }

        Ok(())
    }

    async fn shutdown(&self) -> TallyResult<()> {
        // Shutdown the handle if it exists
        let handle_lock = self.handle.read().await;
        if let Some(handle) = &*handle_lock {
            handle.shutdown().await?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
