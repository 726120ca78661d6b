//! HTTP route handlers for the frontend.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Post listing (keyword/category/page in query)
//! GET  /health                  - Health check
//!
//! # Posts
//! GET  /posts/:id               - Post detail
//! GET  /write                   - Write page (admin)
//! POST /posts                   - Create post (admin)
//! GET  /posts/:id/edit          - Edit page (admin)
//! POST /posts/:id/update        - Update post (admin)
//! POST /posts/:id/delete        - Delete post (admin)
//! POST /api/images              - Image upload proxy for the editor (admin)
//!
//! # Likes
//! POST /posts/:id/likes         - Toggle like for the current actor
//!
//! # Comments
//! POST /posts/:id/comments      - Create comment (any visitor)
//! POST /comments/:id/delete     - Delete comment (password-checked)
//!
//! # Category admin
//! GET  /admin/categories        - Category management page
//! POST /admin/categories        - Create category
//! POST /admin/categories/:id/rename - Rename category
//! POST /admin/categories/:id/delete - Delete category
//!
//! # Auth
//! GET  /auth/login              - Login page
//! POST /auth/login              - Login action
//! POST /auth/logout             - Logout action
//! ```

pub mod auth;
pub mod categories;
pub mod comments;
pub mod home;
pub mod likes;
pub mod posts;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use serde::{Deserialize, Deserializer};

use crate::state::AppState;

/// Query parameters for notice/error display.
#[derive(Debug, Deserialize, Default)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl MessageQuery {
    /// Error text for the layout banner ("" when absent).
    #[must_use]
    pub fn error_text(&self) -> String {
        self.error.clone().unwrap_or_default()
    }

    /// Notice text for the layout banner ("" when absent).
    #[must_use]
    pub fn notice_text(&self) -> String {
        self.notice.clone().unwrap_or_default()
    }
}

/// Redirect to `path` carrying a banner message as a query parameter.
///
/// `key` is `error` or `notice`; the message is percent-encoded so
/// server-provided text survives the round trip verbatim.
#[must_use]
pub fn redirect_with(path: &str, key: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{path}?{key}={}", urlencoding::encode(message)))
}

/// Deserialize empty strings as None for optional numeric fields.
///
/// HTML forms submit unselected `<select>`/`<input>` values as empty
/// strings, which would otherwise fail integer parsing.
pub(crate) fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Create the post routes router.
pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(posts::create))
        .route("/{id}", get(posts::show))
        .route("/{id}/edit", get(posts::edit_page))
        .route("/{id}/update", post(posts::update))
        .route("/{id}/delete", post(posts::delete))
        .route("/{id}/likes", post(likes::toggle))
        .route("/{id}/comments", post(comments::create))
}

/// Create the category admin routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route("/{id}/rename", post(categories::rename))
        .route("/{id}/delete", post(categories::delete))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the frontend.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Listing page
        .route("/", get(home::index))
        // Post routes
        .nest("/posts", post_routes())
        // Write page (admin)
        .route("/write", get(posts::write_page))
        // Editor image upload proxy
        .route("/api/images", post(posts::upload_image))
        // Comment deletion (addressed by comment id, not post)
        .route("/comments/{id}/delete", post(comments::delete))
        // Category admin
        .nest("/admin/categories", category_routes())
        // Auth routes
        .nest("/auth", auth_routes())
}
