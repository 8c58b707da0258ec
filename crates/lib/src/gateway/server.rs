//! Gateway HTTP server: webhook verification, event intake, health.

use crate::channels::{Outbound, WebhookPayload, WhatsAppClient};
use crate::config::Settings;
use crate::directory::CoordinatorDirectory;
use crate::dispatch::Dispatcher;
use crate::gateway::protocol::VerifyQuery;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared state for the gateway: resolved settings and the dispatcher. Read-only.
#[derive(Clone)]
pub struct GatewayState {
    pub settings: Arc<Settings>,
    pub dispatcher: Dispatcher,
}

impl GatewayState {
    /// State with an explicit outbound sender.
    pub fn new(settings: Arc<Settings>, outbound: Arc<dyn Outbound>) -> Self {
        let directory = Arc::new(CoordinatorDirectory::new(&settings.coordinators));
        Self {
            dispatcher: Dispatcher::new(outbound, directory),
            settings,
        }
    }

    /// State sending through the Cloud API client built from `settings`.
    pub fn from_settings(settings: Settings) -> Self {
        let client = Arc::new(WhatsAppClient::new(&settings));
        Self::new(Arc::new(settings), client)
    }
}

/// Routes: `GET /`, `GET /webhook`, `POST /webhook`.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .with_state(state)
}

/// Log configuration gaps. Missing credentials are not fatal; sends fail until they are set.
fn warn_missing_settings(state: &GatewayState) {
    let missing = state.settings.missing_credentials();
    if !missing.is_empty() {
        log::warn!(
            "outbound messages will fail: set {} (env or config)",
            missing.join(" and ")
        );
    }
    for key in state.dispatcher.directory().unconfigured() {
        log::warn!("no coordinator configured for {}; handoffs will not be forwarded", key);
    }
}

/// Run the gateway; binds to settings.bind:settings.port and blocks until Ctrl+C / SIGTERM.
pub async fn run_gateway(settings: Settings) -> Result<()> {
    let state = GatewayState::from_settings(settings);
    warn_missing_settings(&state);

    let bind_addr = format!("{}:{}", state.settings.bind, state.settings.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET /webhook — registration handshake. Echo the challenge or 403 with no body.
/// A query that does not parse (e.g. a repeated `hub.mode`) is a mismatch too.
async fn verify_webhook(
    State(state): State<GatewayState>,
    query: Result<Query<VerifyQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(q)) => q,
        Err(e) => {
            log::warn!("webhook verification rejected: {}", e);
            return StatusCode::FORBIDDEN.into_response();
        }
    };
    match query.accept(&state.settings.verify_token) {
        Some(challenge) => {
            log::info!("webhook verified");
            (StatusCode::OK, challenge.to_string()).into_response()
        }
        None => {
            log::warn!(
                "webhook verification rejected (mode: {:?})",
                query.mode.as_deref().unwrap_or("")
            );
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

/// POST /webhook — event intake. Payloads without a message (status callbacks, garbage) are
/// acknowledged with 200; dispatch failures become 500 so the platform redelivers.
async fn receive_webhook(State(state): State<GatewayState>, body: Bytes) -> StatusCode {
    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            log::debug!("ignoring unparseable webhook payload: {}", e);
            return StatusCode::OK;
        }
    };
    let Some(message) = payload.first_message() else {
        return StatusCode::OK;
    };
    let event = message.to_event();
    log::info!("message from {}: {:?}", event.from, event.code);

    match state.dispatcher.dispatch_event(&event).await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            log::error!("dispatch for {} failed: {}", event.from, e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.settings.port,
    }))
}
