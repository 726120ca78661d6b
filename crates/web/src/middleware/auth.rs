//! Authentication middleware and extractors.
//!
//! The presence of a bearer token in the session is the sole auth
//! signal: there is no cached user object and no refresh protocol.
//! Handlers read it through the extractors below instead of touching
//! session storage directly.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for storing the admin bearer token.
    pub const ADMIN_TOKEN: &str = "admin_token";
}

/// The bearer token persisted in the session after login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminToken {
    /// Raw access token sent as `Authorization: Bearer <token>`.
    pub access_token: String,
}

/// Extractor that requires an admin token.
///
/// If no token is held, returns a redirect to the login page (or a bare
/// 401 for API requests).
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(token): RequireAdmin,
/// ) -> impl IntoResponse {
///     // token.access_token authenticates backend calls
/// }
/// ```
pub struct RequireAdmin(pub AdminToken);

/// Error returned when authentication is required but no token is held.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let token: AdminToken = session
            .get(session_keys::ADMIN_TOKEN)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                // Check if this is an API request
                let is_api = parts.uri.path().starts_with("/api/");
                if is_api {
                    AuthRejection::Unauthorized
                } else {
                    AuthRejection::RedirectToLogin
                }
            })?;

        Ok(Self(token))
    }
}

/// Extractor that optionally gets the admin token.
///
/// Unlike `RequireAdmin`, this does not reject the request when no
/// token is held; anonymous rendering proceeds with `None`.
pub struct OptionalAdmin(pub Option<AdminToken>);

impl OptionalAdmin {
    /// The raw token for backend calls, if one is held.
    #[must_use]
    pub fn bearer(&self) -> Option<&str> {
        self.0.as_ref().map(|token| token.access_token.as_str())
    }

    /// Whether the UI should render authenticated controls.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

impl<S> FromRequestParts<S> for OptionalAdmin
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<AdminToken>(session_keys::ADMIN_TOKEN)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(token))
    }
}

/// Helper to persist the admin token in the session after login.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_admin_token(
    session: &Session,
    token: &AdminToken,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::ADMIN_TOKEN, token).await
}

/// Helper to clear the admin token from the session.
///
/// Called on logout, and silently whenever the backend answers 401: the
/// UI degrades to anonymous without forcing navigation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_admin_token(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session.remove::<AdminToken>(session_keys::ADMIN_TOKEN).await?;
    Ok(())
}
