//! Respawn Admin - back-office JSON API on port 3001.
//!
//! Admin accounts sign in with their backend credentials; every list, edit
//! and moderation call is forwarded to the REST backend with that admin's
//! bearer token. The catalog cache is off so edits show up immediately.

#![cfg_attr(not(test), forbid(unsafe_code))]

use respawn_admin::config::{AdminConfig, LogFormat};
use respawn_admin::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "respawn_admin=info,respawn_api=info,tower_http=debug";

#[tokio::main]
async fn main() {
    let config = AdminConfig::from_env().expect("Failed to load admin configuration");

    let sentry_guard = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: config.sentry_environment.clone().map(Into::into),
                attach_stacktrace: true,
                ..Default::default()
            },
        ))
    });
    init_tracing(config.log_format);
    if sentry_guard.is_some() {
        tracing::info!("Sentry error reporting enabled for admin");
    }

    let state = AppState::new(config.clone()).expect("Failed to initialize application state");
    tracing::info!(
        backend = %config.backend_url,
        user_cache_ttl_secs = config.user_cache_ttl.as_secs(),
        "Backend client ready"
    );

    let app = respawn_admin::app(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {addr}: {e}"));
    tracing::info!(%addr, "admin listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Ctrl+C handler unavailable: {e}");
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutting down admin");
        })
        .await
        .expect("Server error");
}

/// Flattened JSON in production so log shippers see top-level fields.
fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let sentry_layer = sentry_tracing::layer().event_filter(|metadata| match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::DEBUG | tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    });

    let registry = tracing_subscriber::registry().with(filter).with(sentry_layer);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
