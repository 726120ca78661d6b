//! Like-toggle protocol against live backend responses.
//!
//! These drive the same [`LikeToggle`] machine the like route uses,
//! with real requests through the API client.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;

use devlog_core::{LikeState, LikeToggle, PostId, Press};
use devlog_integration_tests::MockBackend;
use devlog_web::api::BlogClient;

#[tokio::test]
async fn test_like_settles_on_authoritative_state() {
    let backend = MockBackend::spawn().await;
    let id = PostId::new(backend.seed_post("A post", "<p>body</p>", None));
    let client = BlogClient::new(&backend.base_url);

    let status = client.like_status(id, None).await.unwrap();
    let mut like = LikeToggle::idle(status.into());
    assert_eq!(like.shown(), Some(LikeState::new(false, 0)));

    assert_eq!(like.press(false), Press::Dispatch);
    let authoritative = client.toggle_like(id, None).await.unwrap();
    like.settle(authoritative.into());
    assert_eq!(like.shown(), Some(LikeState::new(true, 1)));

    // A fresh status fetch agrees
    let status = client.like_status(id, None).await.unwrap();
    assert!(status.liked_by_me);
    assert_eq!(status.like_count, 1);
}

#[tokio::test]
async fn test_declined_toggle_reconciles_to_server_state() {
    let backend = MockBackend::spawn().await;
    let id = PostId::new(backend.seed_post("A post", "<p>body</p>", None));
    backend.state.reject_toggle.store(true, Ordering::SeqCst);
    let client = BlogClient::new(&backend.base_url);

    let status = client.like_status(id, None).await.unwrap();
    let mut like = LikeToggle::idle(status.into());

    like.press(false);
    assert_eq!(like.shown(), Some(LikeState::new(true, 1)), "optimistic");

    // The server declined the duplicate and answered with the old pair;
    // the optimistic guess must not survive.
    let authoritative = client.toggle_like(id, None).await.unwrap();
    like.settle(authoritative.into());
    assert_eq!(like.shown(), Some(LikeState::new(false, 0)));
}

#[tokio::test]
async fn test_failed_toggle_rolls_back_exactly() {
    let backend = MockBackend::spawn().await;
    let id = PostId::new(backend.seed_post("A post", "<p>body</p>", None));
    let client = BlogClient::new(&backend.base_url);

    // Establish a non-trivial starting state: one anonymous like
    client.toggle_like(id, None).await.unwrap();

    let status = client.like_status(id, None).await.unwrap();
    let mut like = LikeToggle::idle(status.into());
    assert_eq!(like.shown(), Some(LikeState::new(true, 1)));

    backend.state.fail_toggle.store(true, Ordering::SeqCst);

    assert_eq!(like.press(true), Press::Dispatch);
    assert_eq!(like.shown(), Some(LikeState::new(false, 0)), "optimistic");

    let err = client.toggle_like(id, None).await.expect_err("500 expected");
    like.rollback();
    assert_eq!(like.shown(), Some(LikeState::new(true, 1)));
    assert!(!err.user_message().is_empty());
}

#[tokio::test]
async fn test_anonymous_unlike_issues_no_request() {
    let backend = MockBackend::spawn().await;
    let id = PostId::new(backend.seed_post("A post", "<p>body</p>", None));
    let client = BlogClient::new(&backend.base_url);

    // The anonymous actor already liked the post
    client.toggle_like(id, None).await.unwrap();
    let toggles_before = backend
        .requests_to("/likes")
        .iter()
        .filter(|r| r.method == "POST")
        .count();

    let status = client.like_status(id, None).await.unwrap();
    let mut like = LikeToggle::idle(status.into());

    // No credential held: the press is refused client-side
    assert_eq!(like.press(false), Press::Refused);
    assert_eq!(like.shown(), Some(LikeState::new(true, 1)));

    let toggles_after = backend
        .requests_to("/likes")
        .iter()
        .filter(|r| r.method == "POST")
        .count();
    assert_eq!(toggles_before, toggles_after, "a refused press must not dispatch");
}
