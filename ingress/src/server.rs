//! Webhook HTTP server.

use std::sync::Arc;

use tracing::info;

use crate::handlers::{router, AppState};

/// The webhook server, configured with a bind address and shared state.
pub struct WebhookServer {
    pub bind: String,
    pub port: u16,
    pub state: Arc<AppState>,
}

impl WebhookServer {
    pub fn new(bind: impl Into<String>, port: u16, state: Arc<AppState>) -> Self {
        Self {
            bind: bind.into(),
            port,
            state,
        }
    }

    /// Start listening for webhook deliveries. Runs until shutdown.
    pub async fn start(&self) -> std::io::Result<()> {
        let app = router(self.state.clone());
        let addr = format!("{}:{}", self.bind, self.port);
        info!("webhook server listening on {}", addr);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await
    }
}
