//! Blog backend REST API client.
//!
//! # Architecture
//!
//! - The backend is the source of truth - NO local storage, direct API calls
//! - One configured `reqwest` client behind an `Arc`, shared by all handlers
//! - `Authorization: Bearer <token>` attached whenever a token is supplied
//! - In-memory caching via `moka` for the category list (short TTL)
//!
//! # Example
//!
//! ```rust,ignore
//! use devlog_web::api::BlogClient;
//!
//! let client = BlogClient::new(&config.api_url);
//!
//! // Fetch a page of posts
//! let page = client.list_posts(&query).await?;
//!
//! // Toggle a like as the current actor
//! let status = client.toggle_like(post_id, token.as_deref()).await?;
//! ```

mod client;
pub mod types;

pub use client::BlogClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the blog backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Backend rejected the bearer token (or its absence) with 401.
    ///
    /// Callers clear the stored token and degrade to anonymous.
    #[error("Unauthorized")]
    Unauthorized,

    /// Backend refused the action with 403.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Business-rule conflict (4xx); the server's message is kept verbatim.
    #[error("{0}")]
    Rejected(String),

    /// Backend failure (5xx).
    #[error("Backend error: HTTP {0}")]
    Upstream(u16),
}

impl ApiError {
    /// Whether the backend invalidated the current token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// A message safe to surface in a user-visible notice.
    ///
    /// Server-provided messages (business rules, permission refusals) are
    /// passed through verbatim; transport and backend failures collapse
    /// to a generic notice instead of leaking internals.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Forbidden(message) | Self::Rejected(message) | Self::NotFound(message) => {
                message.clone()
            }
            Self::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            Self::Http(_) | Self::Parse(_) | Self::Upstream(_) => {
                "The blog backend could not be reached. Please try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("post 123".to_string());
        assert_eq!(err.to_string(), "Not found: post 123");

        let err = ApiError::Rejected("wrong password".to_string());
        assert_eq!(err.to_string(), "wrong password");

        let err = ApiError::Upstream(502);
        assert_eq!(err.to_string(), "Backend error: HTTP 502");
    }

    #[test]
    fn test_server_messages_surface_verbatim() {
        let err = ApiError::Rejected("이미 좋아요를 눌렀습니다".to_string());
        assert_eq!(err.user_message(), "이미 좋아요를 눌렀습니다");

        let err = ApiError::Forbidden("admin only".to_string());
        assert_eq!(err.user_message(), "admin only");
    }

    #[test]
    fn test_backend_failures_do_not_leak() {
        let err = ApiError::Upstream(500);
        assert!(!err.user_message().contains("500"));
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert!(!ApiError::Upstream(500).is_unauthorized());
    }
}
