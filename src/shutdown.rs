use crate::components::redis_service::RedisActorHandle;
use crate::components::tally::TallyHandle;
use crate::components::ComponentManager;
use crate::error::{other_error, TallyResult};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};
#[cfg(windows)]
use tokio::signal::windows::{ctrl_break, ctrl_c};

/// Set up signal handlers for graceful shutdown of watch mode
pub async fn handle_signals(
    shutdown_send: oneshot::Sender<()>,
    component_manager: Arc<ComponentManager>,
    redis_handle: RedisActorHandle,
    tally_handle: TallyHandle,
) {
    // Wait for a termination signal
    wait_for_signal().await;

    // Stop recomputations first so nothing publishes into a closing loop
    if let Err(e) = tally_handle.shutdown().await {
        error!("Error shutting down tally actor: {:?}", e);
    }

    // Shut down all components
    if let Err(e) = component_manager.shutdown_all().await {
        error!("Error shutting down components: {:?}", e);
    } else {
        info!("All components shut down successfully");
    }

    // Shut down Redis actor
    if let Err(e) = redis_handle.shutdown().await {
        error!("Error shutting down Redis actor: {:?}", e);
    } else {
        info!("Redis actor shut down successfully");
    }

    // Send shutdown signal to main task
    let _ = shutdown_send.send(());
}

/// Platform-specific signal handling implementation
#[cfg(unix)]
async fn wait_for_signal() {
    // Handle SIGTERM (sent by process managers)
    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to create SIGTERM signal handler");
    // Handle SIGINT (Ctrl+C)
    let mut sigint = signal(SignalKind::interrupt()).expect("Failed to create SIGINT signal handler");

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM signal, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT signal, initiating graceful shutdown");
        }
    }
}

/// Platform-specific signal handling implementation
#[cfg(windows)]
async fn wait_for_signal() {
    // Handle Ctrl+C
    let mut ctrlc = ctrl_c().expect("Failed to create Ctrl+C signal handler");
    // Handle Ctrl+Break
    let mut ctrlbreak = ctrl_break().expect("Failed to create Ctrl+Break signal handler");

    tokio::select! {
        _ = ctrlc.recv() => {
            info!("Received Ctrl+C signal, initiating graceful shutdown");
        }
        _ = ctrlbreak.recv() => {
            info!("Received Ctrl+Break signal, initiating graceful shutdown");
        }
    }
}

/// Terminal resize notifications, used by watch mode to repaint
pub struct ResizeListener {
    #[cfg(unix)]
    signal: Signal,
}

impl ResizeListener {
    #[cfg(unix)]
    pub fn new() -> TallyResult<Self> {
        let signal = signal(SignalKind::window_change())
            .map_err(|e| other_error(&format!("Failed to create SIGWINCH signal handler: {}", e)))?;
        Ok(Self { signal })
    }

    #[cfg(windows)]
    pub fn new() -> TallyResult<Self> {
        Ok(Self {})
    }

    /// Wait for the next resize; pends forever where unsupported
    #[cfg(unix)]
    pub async fn recv(&mut self) {
        self.signal.recv().await;
    }

    #[cfg(windows)]
    pub async fn recv(&mut self) {
        std::future::pending::<()>().await
    }
}
