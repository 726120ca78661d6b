//! Integration tests for the DevLog frontend.
//!
//! Everything runs in-process: [`MockBackend`] is an axum implementation
//! of the blog REST API bound to an ephemeral port, and
//! [`spawn_frontend`] serves the real frontend router against it. Tests
//! drive the real `reqwest` client stack end to end - no external
//! servers, no fixtures on disk.
//!
//! # Test Categories
//!
//! - `client` - API client behavior (bearer header, status mapping, caching)
//! - `listing` - Listing service fallback and stale-response discard
//! - `likes` - Like-toggle protocol against live responses
//! - `frontend` - Full request/response flows through the rendered pages

// Test support code; unwraps abort the test run, which is what we want.
#![allow(clippy::unwrap_used)]

pub mod mock;

pub use mock::{ADMIN_EMAIL, ADMIN_PASSWORD, ADMIN_TOKEN, MockBackend};

use axum::Router;
use tokio::net::TcpListener;

use devlog_web::config::DevlogConfig;
use devlog_web::middleware::create_session_layer;
use devlog_web::routes;
use devlog_web::state::AppState;

/// Serve the real frontend router against `api_url` on an ephemeral
/// port; returns its base URL.
pub async fn spawn_frontend(api_url: &str) -> String {
    let config = DevlogConfig {
        api_url: api_url.trim_end_matches('/').to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        sentry_dsn: None,
    };

    let state = AppState::new(config.clone());
    let session_layer = create_session_layer(&config);

    let app = Router::new()
        .merge(routes::routes())
        .layer(session_layer)
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}
