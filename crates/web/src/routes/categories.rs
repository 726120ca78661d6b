//! Category admin route handlers.
//!
//! Flat named-entity CRUD, admin-gated. Every mutation redirects back
//! to the management page, which refetches the full list; local state
//! is never patched. Deleting a category may orphan posts' category
//! reference; those semantics are the backend's.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use devlog_core::CategoryId;

use crate::middleware::RequireAdmin;
use crate::routes::posts::forget_token;
use crate::routes::{MessageQuery, redirect_with};
use crate::state::AppState;

const CATEGORIES_PATH: &str = "/admin/categories";

/// Category form data (create and rename share it).
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
}

/// Category row display data.
#[derive(Clone)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
}

/// Category management page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesTemplate {
    pub categories: Vec<CategoryRow>,
    pub is_admin: bool,
    pub error: String,
    pub notice: String,
}

/// Display the category management page.
#[instrument(skip(state, _token))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_token): RequireAdmin,
    Query(message): Query<MessageQuery>,
) -> CategoriesTemplate {
    let categories = state
        .api()
        .list_categories()
        .await
        .unwrap_or_else(|err| {
            warn!(error = %err, "Category fetch failed");
            Vec::new()
        })
        .iter()
        .map(|category| CategoryRow {
            id: category.id.as_i64(),
            name: category.name.clone(),
        })
        .collect();

    CategoriesTemplate {
        categories,
        is_admin: true,
        error: message.error_text(),
        notice: message.notice_text(),
    }
}

/// Handle category creation.
#[instrument(skip(state, session, token, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(token): RequireAdmin,
    Form(form): Form<CategoryForm>,
) -> Response {
    let name = form.name.trim();
    if name.is_empty() {
        return redirect_with(CATEGORIES_PATH, "error", "Category name is required.")
            .into_response();
    }

    match state.api().create_category(&token.access_token, name).await {
        Ok(_) => {
            state.listing().invalidate().await;
            redirect_with(CATEGORIES_PATH, "notice", "Category added.").into_response()
        }
        Err(err) => mutation_failure(&state, &session, err).await,
    }
}

/// Handle category rename.
#[instrument(skip(state, session, token, form))]
pub async fn rename(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(token): RequireAdmin,
    Path(id): Path<i64>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let name = form.name.trim();
    if name.is_empty() {
        return redirect_with(CATEGORIES_PATH, "error", "Category name is required.")
            .into_response();
    }

    match state
        .api()
        .rename_category(&token.access_token, CategoryId::new(id), name)
        .await
    {
        Ok(_) => {
            state.listing().invalidate().await;
            redirect_with(CATEGORIES_PATH, "notice", "Category renamed.").into_response()
        }
        Err(err) => mutation_failure(&state, &session, err).await,
    }
}

/// Handle category deletion.
#[instrument(skip(state, session, token))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(token): RequireAdmin,
    Path(id): Path<i64>,
) -> Response {
    match state
        .api()
        .delete_category(&token.access_token, CategoryId::new(id))
        .await
    {
        Ok(()) => {
            state.listing().invalidate().await;
            redirect_with(CATEGORIES_PATH, "notice", "Category deleted.").into_response()
        }
        Err(err) => mutation_failure(&state, &session, err).await,
    }
}

async fn mutation_failure(
    state: &AppState,
    session: &Session,
    err: crate::api::ApiError,
) -> Response {
    // Even a failed mutation may have gone through partially
    state.api().invalidate_categories().await;

    if err.is_unauthorized() {
        forget_token(session).await;
        return redirect_with(
            "/auth/login",
            "error",
            "Your session has expired. Please log in again.",
        )
        .into_response();
    }

    redirect_with(CATEGORIES_PATH, "error", &err.user_message()).into_response()
}
