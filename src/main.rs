//! Keepa Alert Relay — Binary Entrypoint
//! Boots the Axum HTTP server and the background poll scheduler, wiring the
//! feed provider, Slack notifier, and shared engine state.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use keepa_alert_relay::api::{self, AppState};
use keepa_alert_relay::config::Config;
use keepa_alert_relay::engine::AlertEngine;
use keepa_alert_relay::feed::KeepaRssProvider;
use keepa_alert_relay::metrics::Metrics;
use keepa_alert_relay::notify::slack::SlackNotifier;
use keepa_alert_relay::notify::Notifier;
use keepa_alert_relay::scheduler::{spawn_poll_scheduler, PollSchedulerCfg};

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();

    let cfg = Config::from_env().context("configuration error")?;
    init_tracing(&cfg.log_level);

    let metrics = Metrics::init();
    tracing::info!("starting Keepa alert relay");

    let feed = Arc::new(KeepaRssProvider::from_url(cfg.feed_url.clone()));
    let notifier: Arc<dyn Notifier> = Arc::new(SlackNotifier::new(cfg.slack_webhook_url.clone()));
    let engine = Arc::new(AlertEngine::new(feed, notifier.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = spawn_poll_scheduler(
        engine.clone(),
        PollSchedulerCfg {
            interval_secs: cfg.poll_interval_secs,
            recovery_secs: 60,
        },
        shutdown_rx,
    );

    let app = api::router(AppState { engine, notifier }).merge(metrics.router());

    let addr = format!("{}:{}", Config::HOST, cfg.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;

    // Stop the poll loop and let an in-flight iteration finish.
    let _ = shutdown_tx.send(true);
    let _ = scheduler.await;
    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
