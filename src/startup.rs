use crate::analytics::View;
use crate::components::redis_service::{RedisActor, RedisActorHandle};
use crate::components::tally::{TallyHandle, TallyParams};
use crate::components::{calendar_handle, google_calendar::GoogleCalendar, ComponentManager};
use crate::config::Config;
use crate::error::{component_error, Error, TallyResult};
use crate::render::{self, OutputFormat};
use crate::shutdown;
use crate::utils::time;
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Options for a one-shot report
pub struct ReportOptions {
    pub view: View,
    pub date: Option<String>,
    pub timezone: Option<String>,
    pub format: OutputFormat,
}

/// Options for watch mode
pub struct WatchOptions {
    pub view: View,
    pub timezone: Option<String>,
    pub interval: Option<u64>,
}

/// Compute one report and print it
pub async fn run_report(config: Arc<RwLock<Config>>, options: ReportOptions) -> miette::Result<()> {
    let timezone = resolve_timezone(&config, options.timezone).await?;
    let reference = match &options.date {
        Some(raw) => Some(time::parse_date(raw)?),
        None => None,
    };

    let (component_manager, redis_handle) = bootstrap(Arc::clone(&config)).await?;

    // One-shot reports run through the same tally actor as watch mode
    let (report_tx, mut report_rx) = mpsc::channel(8);
    let params = TallyParams {
        view: options.view,
        timezone,
        reference,
    };
    let tally_handle = TallyHandle::new(
        Arc::clone(&config),
        Arc::clone(&component_manager),
        params,
        report_tx,
    );

    let report = match tally_handle.recompute().await {
        Ok(()) => report_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Tally actor closed without publishing a report")),
        Err(e) => Err(e),
    };

    shutdown_actors(&tally_handle, &component_manager, &redis_handle).await;

    println!("{}", render::render(&report?, options.format)?);
    Ok(())
}

/// List visible calendars with the category each one resolves to
pub async fn run_calendars(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    let (component_manager, redis_handle) = bootstrap(Arc::clone(&config)).await?;
    let calendar = calendar_handle(&component_manager).await?;

    let result = calendar.list_calendars().await;

    if let Err(e) = component_manager.shutdown_all().await {
        error!("Error shutting down components: {:?}", e);
    }
    if let Err(e) = redis_handle.shutdown().await {
        error!("Error shutting down Redis actor: {:?}", e);
    }

    let calendars = result?;
    if calendars.is_empty() {
        println!("No calendars visible to this account.");
        return Ok(());
    }

    let rules = {
        let config_read = config.read().await;
        config_read.rules.clone()
    };

    for entry in &calendars {
        let category = rules.classify(entry.summary.as_deref());
        let name = entry.summary.as_deref().unwrap_or("(unnamed)");
        let marker = if entry.primary { " (primary)" } else { "" };
        println!("{:<32} -> {}{}", name, category, marker);
    }

    Ok(())
}

/// Re-render the report whenever a refresh fires, debounced by the actor
pub async fn run_watch(config: Arc<RwLock<Config>>, options: WatchOptions) -> miette::Result<()> {
    let timezone = resolve_timezone(&config, options.timezone).await?;

    let interval_secs = match options.interval {
        Some(secs) => secs,
        None => {
            let config_read = config.read().await;
            config_read.refresh_interval
        }
    };

    let (component_manager, redis_handle) = bootstrap(Arc::clone(&config)).await?;

    let (report_tx, mut report_rx) = mpsc::channel(8);
    let params = TallyParams {
        view: options.view,
        timezone,
        reference: None,
    };
    let tally_handle = TallyHandle::new(
        Arc::clone(&config),
        Arc::clone(&component_manager),
        params,
        report_tx,
    );

    // The first paint fails loudly; later refreshes only log
    if let Err(e) = tally_handle.recompute().await {
        shutdown_actors(&tally_handle, &component_manager, &redis_handle).await;
        return Err(e.into());
    }

    // Create shutdown channel
    let (shutdown_send, mut shutdown_recv) = oneshot::channel();

    // Clone handles for the shutdown handler
    let shutdown_tally = tally_handle.clone();
    let shutdown_components = Arc::clone(&component_manager);
    let shutdown_redis = redis_handle.clone();

    // Spawn signal handler task
    tokio::spawn(async move {
        shutdown::handle_signals(
            shutdown_send,
            shutdown_components,
            shutdown_redis,
            shutdown_tally,
        )
        .await;
    });

    // Terminal resizes and the refresh timer both go through the
    // debounced trigger
    let mut resize = shutdown::ResizeListener::new()?;
    let mut refresh = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately and the initial paint
    // already covers it
    refresh.tick().await;

    info!(
        "Watching the {} view, refreshing every {}s",
        options.view, interval_secs
    );

    loop {
        tokio::select! {
            maybe_report = report_rx.recv() => {
                match maybe_report {
                    Some(report) => {
                        // Clear the terminal before repainting
                        print!("\x1B[2J\x1B[H");
                        println!("{}", render::to_text(&report));
                    }
                    None => break,
                }
            }
            _ = refresh.tick() => {
                if let Err(e) = tally_handle.trigger().await {
                    error!("Failed to request a refresh: {}", e);
                }
            }
            _ = resize.recv() => {
                if let Err(e) = tally_handle.trigger().await {
                    error!("Failed to request a refresh: {}", e);
                }
            }
            _ = &mut shutdown_recv => {
                info!("Received shutdown signal, stopping watch mode");
                break;
            }
        }
    }

    Ok(())
}

/// Spawn the actors every command needs and initialize components
async fn bootstrap(
    config: Arc<RwLock<Config>>,
) -> miette::Result<(Arc<ComponentManager>, RedisActorHandle)> {
    // Initialize Redis service
    let (mut redis_actor, redis_handle) = RedisActor::new(Arc::clone(&config));

    // Spawn Redis actor task
    tokio::spawn(async move {
        redis_actor.run().await;
    });

    // Initialize component manager
    let mut component_manager = ComponentManager::new(Arc::clone(&config));

    // Register Google Calendar component
    component_manager.register(GoogleCalendar::new());

    // Initialize components
    component_manager
        .init_all(Arc::clone(&config), redis_handle.clone())
        .await?;

    Ok((Arc::new(component_manager), redis_handle))
}

/// Viewer timezone: the command-line override or the configured one
async fn resolve_timezone(
    config: &Arc<RwLock<Config>>,
    override_tz: Option<String>,
) -> TallyResult<Tz> {
    let name = match override_tz {
        Some(name) => name,
        None => {
            let config_read = config.read().await;
            config_read.timezone.clone()
        }
    };
    time::parse_timezone(&name)
}

/// Shut down actors after a one-shot command
async fn shutdown_actors(
    tally_handle: &TallyHandle,
    component_manager: &ComponentManager,
    redis_handle: &RedisActorHandle,
) {
    if let Err(e) = tally_handle.shutdown().await {
        error!("Error shutting down tally actor: {:?}", e);
    }
    if let Err(e) = component_manager.shutdown_all().await {
        error!("Error shutting down components: {:?}", e);
    }
    if let Err(e) = redis_handle.shutdown().await {
        error!("Error shutting down Redis actor: {:?}", e);
    }
}
