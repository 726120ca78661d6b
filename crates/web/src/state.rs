//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::BlogClient;
use crate::config::DevlogConfig;
use crate::services::ListingService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend API client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DevlogConfig,
    api: BlogClient,
    listing: ListingService,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: DevlogConfig) -> Self {
        let api = BlogClient::new(&config.api_url);
        let listing = ListingService::new(api.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                listing,
            }),
        }
    }

    /// Get a reference to the frontend configuration.
    #[must_use]
    pub fn config(&self) -> &DevlogConfig {
        &self.inner.config
    }

    /// Get a reference to the blog backend API client.
    #[must_use]
    pub fn api(&self) -> &BlogClient {
        &self.inner.api
    }

    /// Get a reference to the listing service.
    #[must_use]
    pub fn listing(&self) -> &ListingService {
        &self.inner.listing
    }
}
