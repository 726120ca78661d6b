//! Authentication route handlers.
//!
//! Login trades credentials for a bearer token which is persisted in
//! the session; token presence is the only auth signal the UI reads.
//! There is no registration flow here: accounts are provisioned on the
//! backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::middleware::{AdminToken, OptionalAdmin, clear_admin_token, set_admin_token};
use crate::routes::{MessageQuery, redirect_with};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub is_admin: bool,
    pub error: String,
    pub notice: String,
}

/// Display the login page.
pub async fn login_page(
    admin: OptionalAdmin,
    Query(message): Query<MessageQuery>,
) -> LoginTemplate {
    LoginTemplate {
        is_admin: admin.is_authenticated(),
        error: message.error_text(),
        notice: message.notice_text(),
    }
}

/// Handle login form submission.
///
/// On success the returned token is persisted to the session and the
/// user lands back on the listing; on failure the backend's message is
/// shown on the login page.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        return redirect_with("/auth/login", "error", "Email and password are required.")
            .into_response();
    }

    match state.api().login(email, &form.password).await {
        Ok(access_token) => {
            let token = AdminToken { access_token };
            if let Err(e) = set_admin_token(&session, &token).await {
                tracing::error!("Failed to set session: {e}");
                return redirect_with("/auth/login", "error", "Session error. Please try again.")
                    .into_response();
            }
            Redirect::to("/").into_response()
        }
        Err(err) => {
            tracing::warn!("Login failed: {err}");
            // A 401 here means bad credentials, not an expired session
            let message = if err.is_unauthorized() {
                "Invalid email or password.".to_string()
            } else {
                err.user_message()
            };
            redirect_with("/auth/login", "error", &message).into_response()
        }
    }
}

/// Handle logout.
///
/// Clears the stored token and destroys the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_admin_token(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }

    // Also destroy the entire session
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {e}");
    }

    Redirect::to("/").into_response()
}
