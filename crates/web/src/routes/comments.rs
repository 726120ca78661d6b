//! Comment route handlers.
//!
//! Comments belong to visitors, not accounts: creation takes a display
//! name and a write-once deletion password, and deletion proves
//! ownership by re-entering that password. Both mutations redirect back
//! to the post, which refetches the thread.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use devlog_core::{CommentId, PostId};

use crate::api::types::CommentDraft;
use crate::routes::redirect_with;
use crate::state::AppState;

/// Comment creation form data.
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(rename = "authorName")]
    pub author_name: String,
    pub password: String,
    pub content: String,
}

/// Comment deletion form data.
///
/// The password is prompted at delete time; it is never stored in the
/// frontend. `postId` routes the redirect back to the right thread.
#[derive(Debug, Deserialize)]
pub struct CommentDeleteForm {
    pub password: String,
    #[serde(rename = "postId")]
    pub post_id: i64,
}

/// Handle comment creation.
///
/// All three fields are required; validation happens here, before any
/// request is dispatched. The confirm dialog lives in the form itself.
#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Response {
    let back = format!("/posts/{id}");

    let author_name = form.author_name.trim();
    let password = form.password.trim();
    let content = form.content.trim();
    if author_name.is_empty() || password.is_empty() || content.is_empty() {
        return redirect_with(&back, "error", "Name, password and comment are all required.")
            .into_response();
    }

    let draft = CommentDraft {
        author_name: author_name.to_string(),
        password: password.to_string(),
        content: content.to_string(),
    };

    match state.api().create_comment(PostId::new(id), &draft).await {
        Ok(_) => redirect_with(&back, "notice", "Comment posted.").into_response(),
        Err(err) => redirect_with(&back, "error", &err.user_message()).into_response(),
    }
}

/// Handle comment deletion.
///
/// A wrong password comes back from the backend as a business-rule
/// refusal; its message is surfaced verbatim.
#[instrument(skip(state, form))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<CommentDeleteForm>,
) -> Response {
    let back = format!("/posts/{}", form.post_id);

    if form.password.trim().is_empty() {
        return redirect_with(&back, "error", "Enter the comment password to delete it.")
            .into_response();
    }

    match state
        .api()
        .delete_comment(CommentId::new(id), form.password.trim())
        .await
    {
        Ok(()) => redirect_with(&back, "notice", "Comment deleted.").into_response(),
        Err(err) => redirect_with(&back, "error", &err.user_message()).into_response(),
    }
}
