//! Webhook transport: `POST /webhook` for updates, `GET /` for status.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use gasbot_core::{config::Config, dispatcher::Dispatcher, errors::Error};

#[derive(Clone)]
pub struct WebhookState {
    pub cfg: Arc<Config>,
    pub dispatcher: Dispatcher,
}

/// An update the dispatcher refused; answered with 500 so the platform sees it.
struct WebhookError(Error);

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false, "error": self.0.to_string() })),
        )
            .into_response()
    }
}

pub fn app(state: WebhookState) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/webhook", post(webhook))
        .with_state(state)
}

async fn status(State(state): State<WebhookState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "online",
        "bot": state.cfg.display_name,
        "api": state.cfg.api_base,
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn webhook(
    State(state): State<WebhookState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, WebhookError> {
    let raw: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, bytes = body.len(), "webhook body is not JSON");
        WebhookError(Error::MalformedUpdate(format!("invalid JSON: {e}")))
    })?;
    debug!(update = %raw, "webhook received");

    state.dispatcher.handle(&raw).await.map_err(WebhookError)?;
    Ok(Json(json!({ "ok": true })))
}

/// Serve until `shutdown` fires, then stop accepting and drain open requests.
pub async fn serve(
    listener: TcpListener,
    state: WebhookState,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "webhook server listening (POST /webhook, GET /)");
    }
    axum::serve(listener, app(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("webhook server stopped");
    Ok(())
}
