//! Like-toggle route handler.
//!
//! Each toggle request drives a [`LikeToggle`] machine through its full
//! cycle: hydrate from the status fetch, press (which applies the
//! optimistic flip and may refuse an anonymous unlike without touching
//! the backend), dispatch, then settle on the authoritative reply or
//! roll back on failure.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::{debug, instrument, warn};

use devlog_core::{LikeToggle, PostId, Press};

use crate::middleware::OptionalAdmin;
use crate::routes::posts::forget_token;
use crate::routes::redirect_with;
use crate::state::AppState;

/// Toggle the like for a post as the current actor.
///
/// Anonymous actors are identified by the backend (IP-based); only the
/// unlike of an anonymous like is refused, and that refusal happens
/// here without a toggle round-trip.
#[instrument(skip(state, session, admin))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    admin: OptionalAdmin,
    Path(id): Path<i64>,
) -> Response {
    let id = PostId::new(id);
    let back = format!("/posts/{id}");

    let status = match state.api().like_status(id, admin.bearer()).await {
        Ok(status) => status,
        Err(err) => {
            warn!(error = %err, "Like status fetch failed");
            if err.is_unauthorized() {
                forget_token(&session).await;
            }
            return redirect_with(&back, "error", &err.user_message()).into_response();
        }
    };

    let mut like = LikeToggle::idle(status.into());
    match like.press(admin.is_authenticated()) {
        Press::Refused => redirect_with(
            &back,
            "error",
            "Removing a like requires logging in.",
        )
        .into_response(),
        Press::Ignored => Redirect::to(&back).into_response(),
        Press::Dispatch => {
            debug!(shown = ?like.shown(), "Dispatching like toggle");
            match state.api().toggle_like(id, admin.bearer()).await {
                Ok(authoritative) => {
                    // The server's pair replaces the optimistic guess
                    like.settle(authoritative.into());
                    Redirect::to(&back).into_response()
                }
                Err(err) => {
                    like.rollback();
                    warn!(error = %err, restored = ?like.shown(), "Like toggle failed");
                    if err.is_unauthorized() {
                        forget_token(&session).await;
                    }
                    redirect_with(&back, "error", &err.user_message()).into_response()
                }
            }
        }
    }
}
