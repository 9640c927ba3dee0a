use crate::analytics::{TallyReport, View};
use crate::components::{calendar_handle, ComponentManager};
use crate::config::Config;
use crate::error::{component_error, TallyResult};
use crate::utils::debounce::Debouncer;
use crate::utils::time;
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, error, info};

/// What the tally actor recomputes on every firing
#[derive(Debug, Clone, Copy)]
pub struct TallyParams {
    pub view: View,
    pub timezone: Tz,
    /// Fixed reference date; `None` recomputes around the current day
    pub reference: Option<NaiveDate>,
}

/// The tally actor that owns the debounce policy.
///
/// Triggers coalesce through a [`Debouncer`]; when the window goes quiet
/// the actor fetches fresh events, rebuilds the report and publishes it.
/// Nothing is cached between recomputations.
pub struct TallyActor {
    config: Arc<RwLock<Config>>,
    manager: Arc<ComponentManager>,
    params: TallyParams,
    report_tx: mpsc::Sender<TallyReport>,
    command_rx: mpsc::Receiver<TallyCommand>,
}

/// Commands that can be sent to the tally actor
pub enum TallyCommand {
    /// Request a recomputation through the debounce window
    Trigger,
    /// Recompute immediately, bypassing the debounce window
    Recompute(mpsc::Sender<TallyResult<()>>),
    Shutdown,
}

/// Handle for communicating with the tally actor
#[derive(Clone)]
pub struct TallyActorHandle {
    command_tx: mpsc::Sender<TallyCommand>,
}

impl TallyActorHandle {
    /// Request a debounced recomputation
    pub async fn trigger(&self) -> TallyResult<()> {
        self.command_tx
            .send(TallyCommand::Trigger)
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))
    }

    /// Recompute immediately and wait for the result
    pub async fn recompute(&self) -> TallyResult<()> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(TallyCommand::Recompute(response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> TallyResult<()> {
        let _ = self.command_tx.send(TallyCommand::Shutdown).await;
        Ok(())
    }
}

impl TallyActor {
    /// Create a new actor and return its handle
    pub fn new(
        config: Arc<RwLock<Config>>,
        manager: Arc<ComponentManager>,
        params: TallyParams,
        report_tx: mpsc::Sender<TallyReport>,
    ) -> (Self, TallyActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            config,
            manager,
            params,
            report_tx,
            command_rx,
        };

        let handle = TallyActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Tally actor started");

        let delay = {
            let config_read = self.config.read().await;
            Duration::from_millis(config_read.debounce_ms)
        };
        let mut debouncer = Debouncer::new(delay);

        loop {
            tokio::select! {
                maybe_cmd = self.command_rx.recv() => {
                    match maybe_cmd {
                        Some(TallyCommand::Trigger) => {
                            debouncer.trigger();
                        }
                        Some(TallyCommand::Recompute(response_tx)) => {
                            // An immediate recompute makes any pending
                            // debounced one redundant
                            debouncer.disarm();
                            let result = self.recompute().await;
                            let _ = response_tx.send(result).await;
                        }
                        Some(TallyCommand::Shutdown) | None => {
                            info!("Tally actor shutting down");
                            break;
                        }
                    }
                }
                _ = debouncer.expired() => {
                    // Watch mode keeps its last rendering on transient
                    // fetch failures
                    if let Err(e) = self.recompute().await {
                        error!("Failed to recompute tally: {}", e);
                    }
                }
            }
        }

        info!("Tally actor shut down");
    }

    /// Fetch fresh events and publish a newly built report
    async fn recompute(&self) -> TallyResult<()> {
        let calendar = calendar_handle(&self.manager).await?;

        let timezone = self.params.timezone;
        let reference = self
            .params
            .reference
            .unwrap_or_else(|| time::today_in(timezone));
        let (range_start, range_end) = self.params.view.date_range(reference);

        let events = calendar
            .events_in_range(range_start, range_end, timezone)
            .await?;

        let rules = {
            let config_read = self.config.read().await;
            config_read.rules.clone()
        };

        let report = TallyReport::build(
            self.params.view,
            reference,
            timezone.name(),
            &events,
            &rules,
        );

        debug!(
            "Recomputed {} tally: {} events between {} and {}",
            report.view, report.summary.total_events, report.range_start, report.range_end
        );

        self.report_tx
            .send(report)
            .await
            .map_err(|_| component_error("Report channel closed"))
    }
}
