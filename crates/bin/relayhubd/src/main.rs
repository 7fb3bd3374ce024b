//! # relayhubd: relayhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`relayhub.toml` plus env vars) and install logging
//! - Open the selected store backend (`SQLite` or Realtime-Database REST)
//! - Construct application services, injecting adapters via port traits
//! - Start the timer scheduler and the sensor watcher
//! - Build the axum router, bind and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT) and stop background tasks
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use relayhub_adapter_http_axum::state::AppState;
use relayhub_adapter_ollama::OllamaClient;
use relayhub_adapter_rtdb::RtdbStore;
use relayhub_adapter_storage_sqlite_sqlx::{
    SqliteRelayStore, SqliteSensorSource, SqliteSettingsRepository, SqliteTimerRepository,
};
use relayhub_app::ports::{RelayStore, SensorSource, SettingsRepository, TimerRepository};
use relayhub_app::services::assistant::Assistant;
use relayhub_app::services::command_interpreter::CommandInterpreter;
use relayhub_app::services::relay_service::RelayService;
use relayhub_app::services::sensor_watcher::SensorWatcher;
use relayhub_app::services::settings_service::SettingsService;
use relayhub_app::services::status_service::StatusService;
use relayhub_app::services::timer_scheduler::TimerScheduler;

use crate::config::{Config, StoreBackend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    let filter = EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter `{}`: {err}", config.logging.filter);
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let model = relayhub_adapter_ollama::Config {
        base_url: config.ollama.base_url.clone(),
        model: config.ollama.model.clone(),
        timeout: Duration::from_secs(config.ollama.timeout_secs),
    }
    .build()?;

    match config.store.backend {
        StoreBackend::Sqlite => {
            let db = relayhub_adapter_storage_sqlite_sqlx::Config {
                database_url: config.database.url.clone(),
            }
            .build()
            .await?;
            let pool = db.pool().clone();
            tracing::info!(url = %config.database.url, "using sqlite store");

            serve(
                &config,
                Arc::new(SqliteTimerRepository::new(pool.clone())),
                Arc::new(SqliteRelayStore::new(pool.clone())),
                Arc::new(SqliteSensorSource::new(pool.clone())),
                Arc::new(SqliteSettingsRepository::new(pool)),
                model,
            )
            .await
        }
        StoreBackend::Rtdb => {
            let client = relayhub_adapter_rtdb::Config {
                base_url: config.rtdb.url.clone(),
                auth: config.rtdb.auth.clone(),
                timeout: Duration::from_secs(config.rtdb.timeout_secs),
            }
            .build()?;
            let store = Arc::new(RtdbStore::new(client));
            tracing::info!(url = %config.rtdb.url, "using realtime database store");

            serve(
                &config,
                Arc::clone(&store),
                Arc::clone(&store),
                Arc::clone(&store),
                store,
                model,
            )
            .await
        }
    }
}

/// Wire services over the chosen store and run until a shutdown signal.
async fn serve<T, S, Z, R>(
    config: &Config,
    timers: T,
    relay_store: S,
    sensors: Z,
    settings_repo: R,
    model: OllamaClient,
) -> Result<(), Box<dyn std::error::Error>>
where
    T: TimerRepository + Send + Sync + 'static,
    S: RelayStore + Clone + Send + Sync + 'static,
    Z: SensorSource + Clone + Send + Sync + 'static,
    R: SettingsRepository + Clone + Send + Sync + 'static,
{
    let relays = RelayService::new(relay_store, config.polarity());
    let scheduler = Arc::new(TimerScheduler::new(timers, relays.clone()));
    let interpreter = CommandInterpreter::new(
        relays.clone(),
        Arc::clone(&scheduler),
        StatusService::new(sensors.clone()),
    );
    let assistant = Arc::new(Assistant::new(interpreter, model));
    let settings = Arc::new(SettingsService::new(settings_repo.clone()));

    let scheduler_task = Arc::clone(&scheduler).start(config.tick_period());
    let watcher_task = config.automation.enabled.then(|| {
        let watcher = SensorWatcher::new(
            sensors,
            relays,
            SettingsService::new(settings_repo),
            config.automation.user_id.clone(),
        );
        Arc::new(watcher).start(config.poll_period())
    });

    let state = AppState::new(assistant, scheduler, settings);
    let app = relayhub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("relayhubd listening on http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down background tasks");
    scheduler_task.stop().await;
    if let Some(task) = watcher_task {
        task.stop().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

