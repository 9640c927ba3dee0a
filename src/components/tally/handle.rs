use super::actor::{TallyActor, TallyActorHandle, TallyParams};
use crate::analytics::TallyReport;
use crate::components::ComponentManager;
use crate::config::Config;
use crate::error::TallyResult;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

/// Handle for interacting with the tally actor
#[derive(Clone)]
pub struct TallyHandle {
    actor_handle: TallyActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl TallyHandle {
    /// Create a new TallyHandle and spawn the actor
    pub fn new(
        config: Arc<RwLock<Config>>,
        manager: Arc<ComponentManager>,
        params: TallyParams,
        report_tx: mpsc::Sender<TallyReport>,
    ) -> Self {
        // Create the actor and get its handle
        let (mut actor, handle) = TallyActor::new(config, manager, params, report_tx);

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Request a debounced recomputation
    pub async fn trigger(&self) -> TallyResult<()> {
        self.actor_handle.trigger().await
    }

    /// Recompute immediately, bypassing the debounce window
    pub async fn recompute(&self) -> TallyResult<()> {
        self.actor_handle.recompute().await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> TallyResult<()> {
        self.actor_handle.shutdown().await
    }
}
