//! Local return listener powered by axum.
//!
//! Stands in for the app URL the payment provider redirects back to:
//! - `GET /setup/return`: provider return, query string is captured
//! - `GET /setup/health`: health check
//!
//! The first hit on `/setup/return` is handed to the waiting flow; the
//! listener shuts down right after.

use crate::error::{ConsoleError, Result};
use axum::{
    Router,
    extract::State,
    http::Uri,
    response::{Html, Json},
    routing::get,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const RETURN_PAGE: &str = "<!doctype html><html><head><title>Tenant Console</title></head>\
<body><h2>You're all set</h2><p>Return to the terminal to finish setup. \
You can close this tab.</p></body></html>";

const ALREADY_HANDLED_PAGE: &str = "<!doctype html><html><head><title>Tenant Console</title>\
</head><body><p>This setup return was already handled. You can close this tab.</p></body></html>";

/// Shared state for the return listener.
#[derive(Clone)]
pub struct ReturnState {
    origin: String,
    sender: Arc<Mutex<Option<oneshot::Sender<String>>>>,
}

impl ReturnState {
    /// `origin` is `scheme://host:port`, used to rebuild the full return URL.
    pub fn new(origin: impl Into<String>) -> (Self, oneshot::Receiver<String>) {
        let (tx, rx) = oneshot::channel();
        let state = Self {
            origin: origin.into(),
            sender: Arc::new(Mutex::new(Some(tx))),
        };
        (state, rx)
    }
}

/// Build the axum router for the return listener.
pub fn build_router(state: ReturnState) -> Router {
    Router::new()
        .route("/setup/return", get(handle_return))
        .route("/setup/health", get(health_check))
        .with_state(state)
}

/// GET /setup/return: provider return.
async fn handle_return(State(state): State<ReturnState>, uri: Uri) -> Html<&'static str> {
    let full = format!("{}{}", state.origin, uri);
    let sender = state.sender.lock().ok().and_then(|mut slot| slot.take());
    match sender {
        Some(tx) => {
            tracing::info!("Payment provider returned to {}", uri.path());
            if tx.send(full).is_err() {
                tracing::warn!("Return arrived after the setup flow stopped waiting");
            }
            Html(RETURN_PAGE)
        }
        None => {
            tracing::debug!("Ignoring repeated return request");
            Html(ALREADY_HANDLED_PAGE)
        }
    }
}

/// GET /setup/health: Health check.
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}

/// Bound but not yet serving. Binding first lets the flow learn the real
/// return URL (and fail early on a busy port) before calling the backend.
pub struct ReturnListener {
    listener: TcpListener,
    addr: SocketAddr,
}

impl ReturnListener {
    pub async fn bind(host: &str, port: u16) -> Result<Self> {
        let listener = TcpListener::bind((host, port)).await.map_err(|e| {
            ConsoleError::Handoff(format!(
                "Could not listen on {host}:{port} for the payment return: {e}"
            ))
        })?;
        let addr = listener.local_addr()?;
        tracing::debug!("Return listener bound on http://{}", addr);
        Ok(Self { listener, addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn return_url(&self) -> String {
        format!("http://{}/setup/return", self.addr)
    }

    /// Serve until the provider comes back and return the full return URL.
    ///
    /// `None` waits without limit.
    pub async fn wait(self, timeout: Option<Duration>) -> Result<String> {
        let (state, rx) = ReturnState::new(format!("http://{}", self.addr));
        let app = build_router(state);
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        tracing::info!("Waiting for the payment provider on http://{}", self.addr);
        let server = tokio::spawn(async move {
            axum::serve(self.listener, app)
                .with_graceful_shutdown(async {
                    let _ = stop_rx.await;
                })
                .await
        });

        let received = match timeout {
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(result) => result.map_err(|_| ()),
                Err(_) => {
                    let _ = stop_tx.send(());
                    server.abort();
                    return Err(ConsoleError::Handoff(format!(
                        "Gave up waiting for the payment provider after {}s",
                        limit.as_secs()
                    )));
                }
            },
            None => rx.await.map_err(|_| ()),
        };

        let _ = stop_tx.send(());
        match tokio::time::timeout(Duration::from_secs(2), server).await {
            Ok(Ok(Err(e))) => tracing::warn!("Return listener error: {}", e),
            Ok(Err(e)) => tracing::warn!("Return listener task failed: {}", e),
            Err(_) => tracing::debug!("Return listener still draining, leaving it"),
            Ok(Ok(Ok(()))) => {}
        }

        received.map_err(|_| {
            ConsoleError::Handoff("Return listener stopped before the provider came back".into())
        })
    }
}
