//! HTTP server: the channel webhook and a health probe.

use crate::activity::Activity;
use crate::bot::Dispatcher;
use crate::channel::{ConnectorClient, ConversationApi, TokenProvider};
use crate::config::{ChannelSettings, Config, LlmSettings};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

pub const SERVICE_NAME: &str = "teams-llm-bot";

/// Last-resort messages for errors that escape the dispatcher.
const TURN_ERROR_TEXT: &str = "The bot encountered an error or bug.";
const TURN_ERROR_HINT: &str = "To continue to run this bot, please fix the bot configuration.";

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
    auth: Arc<TokenProvider>,
}

/// Resolve settings, bind, and serve until SIGINT/SIGTERM.
pub async fn run_server(config: Config) -> Result<()> {
    let llm = LlmSettings::resolve(&config);
    let channel = ChannelSettings::resolve(&config);
    if channel.app_id.is_none() {
        log::warn!("no app id configured; connector will send unauthenticated (emulator mode)");
    }
    let state = AppState {
        dispatcher: Arc::new(Dispatcher::new(llm)),
        auth: Arc::new(TokenProvider::new(channel)),
    };

    let app = Router::new()
        .route("/api/messages", post(messages_handler))
        .route("/health", get(health_http))
        .with_state(state);

    let bind_addr = format!("{}:{}", config.server.bind.trim(), config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("{} listening on {}", SERVICE_NAME, bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited")?;
    log::info!("server stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// POST /api/messages — receives a channel activity, runs the dispatcher
/// against a connector bound to the activity's service URL.
async fn messages_handler(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let activity: Activity = match serde_json::from_slice(&body) {
        Ok(a) => a,
        Err(e) => {
            log::debug!("rejecting malformed activity: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };
    let Some(ref service_url) = activity.service_url else {
        log::debug!("activity without serviceUrl, nothing to reply to");
        return StatusCode::OK;
    };
    let connector = ConnectorClient::new(service_url.clone(), state.auth.clone());

    if let Err(e) = state.dispatcher.handle_activity(&activity, &connector).await {
        log::error!("unhandled turn error: {}", e);
        apologize(&activity, &connector).await;
    }
    StatusCode::OK
}

/// Best-effort apology when a turn fails outside the dispatcher's own
/// error handling.
async fn apologize(activity: &Activity, connector: &ConnectorClient) {
    let Some(ref conversation) = activity.conversation else {
        return;
    };
    for text in [TURN_ERROR_TEXT, TURN_ERROR_HINT] {
        if let Err(e) = connector
            .send_activity(&conversation.id, &Activity::message(text))
            .await
        {
            log::debug!("apology delivery failed: {}", e);
            return;
        }
    }
}

/// GET /health returns a fixed health JSON (for probes).
async fn health_http() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
    }))
}
