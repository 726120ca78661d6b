//! Post detail, authoring, and upload route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use devlog_core::{CategoryId, LikeState, LikeToggle, PostId};

use crate::api::types::{Category, PostDraft};
use crate::error::AppError;
use crate::middleware::{OptionalAdmin, RequireAdmin, clear_admin_token};
use crate::preview;
use crate::routes::{MessageQuery, empty_string_as_none, redirect_with};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Post authoring form data (write and edit pages share it).
#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub title: String,
    /// HTML produced by the rich-text editor.
    pub content: String,
    #[serde(
        default,
        rename = "categoryId",
        deserialize_with = "empty_string_as_none"
    )]
    pub category_id: Option<i64>,
}

// =============================================================================
// View Types
// =============================================================================

/// Comment display data.
#[derive(Clone)]
pub struct CommentView {
    pub id: i64,
    pub author_name: String,
    pub content: String,
    pub created: String,
}

/// Category option for the authoring select.
#[derive(Clone)]
pub struct CategoryOption {
    pub id: i64,
    pub name: String,
    pub selected: bool,
}

// =============================================================================
// Templates
// =============================================================================

/// Post detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "posts/show.html")]
pub struct PostShowTemplate {
    pub post_id: i64,
    pub title: String,
    pub body_html: String,
    pub category_name: String,
    pub author_name: String,
    pub created: String,
    pub view_count: u64,
    pub liked: bool,
    pub like_count: u64,
    pub comments: Vec<CommentView>,
    pub comment_count: usize,
    pub is_admin: bool,
    pub error: String,
    pub notice: String,
}

/// Write page template.
#[derive(Template, WebTemplate)]
#[template(path = "posts/write.html")]
pub struct WriteTemplate {
    pub categories: Vec<CategoryOption>,
    pub is_admin: bool,
    pub error: String,
    pub notice: String,
}

/// Edit page template.
#[derive(Template, WebTemplate)]
#[template(path = "posts/edit.html")]
pub struct EditTemplate {
    pub post_id: i64,
    pub title: String,
    pub content: String,
    pub categories: Vec<CategoryOption>,
    pub is_admin: bool,
    pub error: String,
    pub notice: String,
}

// =============================================================================
// Detail Page
// =============================================================================

/// Display a post with its like state and comment thread.
///
/// The like relationship is fetched fresh on every page load, scoped to
/// the current actor; it is never stored between sessions.
///
/// # Errors
///
/// Returns 404 if the post doesn't exist.
#[instrument(skip(state, session, admin))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    admin: OptionalAdmin,
    Path(id): Path<i64>,
    Query(message): Query<MessageQuery>,
) -> Result<PostShowTemplate, AppError> {
    let id = PostId::new(id);
    let post = state.api().get_post(id).await?;

    // Comments and like status are independent fetches
    let (comments, like_status) = tokio::join!(
        state.api().list_comments(id),
        state.api().like_status(id, admin.bearer()),
    );

    let comments: Vec<CommentView> = comments
        .unwrap_or_else(|err| {
            warn!(error = %err, "Comment fetch failed");
            Vec::new()
        })
        .iter()
        .map(|comment| CommentView {
            id: comment.id.as_i64(),
            author_name: comment.author_name.clone(),
            content: comment.content.clone(),
            created: comment.created_at.format("%b %d, %Y %H:%M").to_string(),
        })
        .collect();

    // Hydrate the like machine from the status fetch; a failed fetch
    // leaves it Unknown and the button renders unliked at zero.
    let mut is_admin = admin.is_authenticated();
    let mut like = LikeToggle::new();
    match like_status {
        Ok(status) => like.hydrate(status.into()),
        Err(err) => {
            warn!(error = %err, "Like status fetch failed");
            // A revoked token degrades the page to anonymous in place
            if err.is_unauthorized() {
                forget_token(&session).await;
                is_admin = false;
            }
        }
    }
    let shown = like.shown().unwrap_or(LikeState::new(false, 0));

    Ok(PostShowTemplate {
        post_id: id.as_i64(),
        title: post.title,
        body_html: post.content,
        category_name: post.category_name.unwrap_or_else(|| "General".to_string()),
        author_name: post.author_name.unwrap_or_else(|| "Admin".to_string()),
        created: post.created_at.format("%b %d, %Y").to_string(),
        view_count: post.view_count,
        liked: shown.liked,
        like_count: shown.count,
        comment_count: comments.len(),
        comments,
        is_admin,
        error: message.error_text(),
        notice: message.notice_text(),
    })
}

// =============================================================================
// Authoring Pages
// =============================================================================

/// Display the write page with the category select.
#[instrument(skip(state, _token))]
pub async fn write_page(
    State(state): State<AppState>,
    RequireAdmin(_token): RequireAdmin,
    Query(message): Query<MessageQuery>,
) -> WriteTemplate {
    let categories = fetch_category_options(&state, None).await;

    WriteTemplate {
        categories,
        is_admin: true,
        error: message.error_text(),
        notice: message.notice_text(),
    }
}

/// Handle the write form submission.
#[instrument(skip(state, session, token, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(token): RequireAdmin,
    Form(form): Form<PostForm>,
) -> Response {
    let Some(draft) = validate_draft(&form) else {
        return redirect_with("/write", "error", "Title and content are required.")
            .into_response();
    };

    match state.api().create_post(&token.access_token, &draft).await {
        Ok(post) => {
            state.listing().invalidate().await;
            Redirect::to(&format!("/posts/{}", post.id)).into_response()
        }
        Err(err) if err.is_unauthorized() => expire_session(&session).await,
        Err(err) => redirect_with("/write", "error", &err.user_message()).into_response(),
    }
}

/// Display the edit page prefilled with the post.
///
/// # Errors
///
/// Returns 404 if the post doesn't exist.
#[instrument(skip(state, _token))]
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAdmin(_token): RequireAdmin,
    Path(id): Path<i64>,
    Query(message): Query<MessageQuery>,
) -> Result<EditTemplate, AppError> {
    let post = state.api().get_post(PostId::new(id)).await?;
    let categories =
        fetch_category_options(&state, post.category_id.map(|id| id.as_i64())).await;

    Ok(EditTemplate {
        post_id: id,
        title: post.title,
        content: post.content,
        categories,
        is_admin: true,
        error: message.error_text(),
        notice: message.notice_text(),
    })
}

/// Handle the edit form submission.
#[instrument(skip(state, session, token, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(token): RequireAdmin,
    Path(id): Path<i64>,
    Form(form): Form<PostForm>,
) -> Response {
    let back = format!("/posts/{id}/edit");
    let Some(draft) = validate_draft(&form) else {
        return redirect_with(&back, "error", "Title and content are required.").into_response();
    };

    match state
        .api()
        .update_post(&token.access_token, PostId::new(id), &draft)
        .await
    {
        Ok(post) => {
            state.listing().invalidate().await;
            Redirect::to(&format!("/posts/{}", post.id)).into_response()
        }
        Err(err) if err.is_unauthorized() => expire_session(&session).await,
        Err(err) => redirect_with(&back, "error", &err.user_message()).into_response(),
    }
}

/// Handle post deletion.
#[instrument(skip(state, session, token))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(token): RequireAdmin,
    Path(id): Path<i64>,
) -> Response {
    match state
        .api()
        .delete_post(&token.access_token, PostId::new(id))
        .await
    {
        Ok(()) => {
            state.listing().invalidate().await;
            Redirect::to("/").into_response()
        }
        Err(err) if err.is_unauthorized() => expire_session(&session).await,
        Err(err) => {
            redirect_with(&format!("/posts/{id}"), "error", &err.user_message()).into_response()
        }
    }
}

// =============================================================================
// Editor Image Upload
// =============================================================================

/// Proxy an editor image upload to the backend.
///
/// Returns `{url}` JSON for the editor to insert.
///
/// # Errors
///
/// Returns 400 when no file field is present, or the backend's refusal.
#[instrument(skip(state, session, token, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(token): RequireAdmin,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload.bin").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let url = match state
            .api()
            .upload_image(&token.access_token, &filename, &content_type, bytes.to_vec())
            .await
        {
            Ok(url) => url,
            Err(err) => {
                if err.is_unauthorized() {
                    forget_token(&session).await;
                }
                return Err(err.into());
            }
        };

        return Ok(Json(serde_json::json!({ "url": url })));
    }

    Err(AppError::BadRequest("missing file field".to_string()))
}

// =============================================================================
// Helpers
// =============================================================================

/// Validate the authoring form; blank titles and markup-only bodies are
/// rejected before any request is dispatched.
fn validate_draft(form: &PostForm) -> Option<PostDraft> {
    let title = form.title.trim();
    if title.is_empty() || preview::is_blank_markup(&form.content) {
        return None;
    }

    Some(PostDraft {
        title: title.to_string(),
        content: form.content.clone(),
        category_id: form.category_id.map(CategoryId::new),
    })
}

async fn fetch_category_options(state: &AppState, selected: Option<i64>) -> Vec<CategoryOption> {
    let categories: Vec<Category> = state.api().list_categories().await.unwrap_or_else(|err| {
        warn!(error = %err, "Category fetch failed");
        Vec::new()
    });

    categories
        .iter()
        .enumerate()
        .map(|(index, category)| CategoryOption {
            id: category.id.as_i64(),
            name: category.name.clone(),
            // The first category is preselected when nothing else is
            selected: selected.map_or(index == 0, |id| id == category.id.as_i64()),
        })
        .collect()
}

/// The backend rejected the token: clear it and restart at the login page.
async fn expire_session(session: &Session) -> Response {
    forget_token(session).await;
    redirect_with(
        "/auth/login",
        "error",
        "Your session has expired. Please log in again.",
    )
    .into_response()
}

/// Silently drop the stored token after a backend 401.
pub(crate) async fn forget_token(session: &Session) {
    if let Err(e) = clear_admin_token(session).await {
        tracing::error!("Failed to clear session token: {e}");
    }
}
