// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON API over the Drive and WordPress gateways.

mod drive;
mod error;
mod wordpress;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
};
use tracing::{error, info};

use crate::drive::{DRIVE_API_URL, DriveClient, RetryPolicy};
use crate::http::HttpClient;
use crate::wordpress::WordPressGateway;

pub use error::{ApiError, PublishApiError, bearer_token};

/// Shared state of all routes
///
/// Drive calls are made with the caller's own access token, so only the
/// transport is shared; a [`DriveClient`] is built per request.
#[derive(Clone)]
pub struct AppState<C> {
    pub http: C,
    pub drive_api_url: String,
    pub retry: RetryPolicy,
    pub wordpress: Option<Arc<dyn WordPressGateway>>,
}

impl<C: HttpClient + Clone> AppState<C> {
    pub fn new(http: C) -> Self {
        Self {
            http,
            drive_api_url: DRIVE_API_URL.to_string(),
            retry: RetryPolicy::default(),
            wordpress: None,
        }
    }

    pub fn with_wordpress(mut self, wordpress: Arc<dyn WordPressGateway>) -> Self {
        self.wordpress = Some(wordpress);
        self
    }

    fn drive(&self, access_token: &str) -> DriveClient<C> {
        DriveClient::new(self.http.clone(), access_token)
            .with_base_url(self.drive_api_url.clone())
            .with_retry(self.retry)
    }
}

pub fn router<C>(state: AppState<C>) -> Router
where
    C: HttpClient + Clone + 'static,
{
    Router::new()
        .route("/api/drive/list", get(drive::list::<C>))
        .route("/api/drive/rename", patch(drive::rename::<C>))
        .route("/api/wordpress/update", post(wordpress::update::<C>))
        .with_state(state)
}

/// Serve the API until SIGINT or SIGTERM
pub async fn serve<C>(addr: SocketAddr, state: AppState<C>) -> std::io::Result<()>
where
    C: HttpClient + Clone + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
