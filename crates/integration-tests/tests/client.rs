//! API client behavior against the in-process mock backend.

#![allow(clippy::unwrap_used)]

use devlog_core::{CommentId, ListingQuery, PostId};
use devlog_integration_tests::{ADMIN_EMAIL, ADMIN_PASSWORD, ADMIN_TOKEN, MockBackend};
use devlog_web::api::types::PostDraft;
use devlog_web::api::{ApiError, BlogClient};

// ============================================================================
// Pagination & Query Tests
// ============================================================================

#[tokio::test]
async fn test_listing_page_is_sent_zero_based() {
    let backend = MockBackend::spawn().await;
    backend.seed_posts(25);
    let client = BlogClient::new(&backend.base_url);

    // UI page 3 of 25 posts at size 10
    let query = ListingQuery::from_params(None, None, Some(3));
    let page = client.list_posts(&query).await.expect("list posts");
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.total_elements, 25);
    assert_eq!(page.content.len(), 5);

    let requests = backend.requests_to("/posts");
    let last = requests.last().expect("a recorded request");
    assert!(last.query.contains("page=2"), "query was {}", last.query);
    assert!(last.query.contains("size=10"), "query was {}", last.query);
}

#[tokio::test]
async fn test_listing_filters_are_forwarded() {
    let backend = MockBackend::spawn().await;
    let ids = backend.seed_categories(&["Rust"]);
    backend.seed_post("Async pitfalls", "<p>await</p>", Some(ids[0]));
    backend.seed_post("Unrelated", "<p>other</p>", None);
    let client = BlogClient::new(&backend.base_url);

    let query = ListingQuery::from_params(Some("Async"), Some(ids[0]), Some(1));
    let page = client.list_posts(&query).await.expect("list posts");
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].title, "Async pitfalls");

    let requests = backend.requests_to("/posts");
    let last = requests.last().unwrap();
    assert!(last.query.contains("keyword=Async"));
    assert!(last.query.contains(&format!("categoryId={}", ids[0])));
}

// ============================================================================
// Bearer Header Tests
// ============================================================================

#[tokio::test]
async fn test_bearer_attached_exactly_when_token_present() {
    let backend = MockBackend::spawn().await;
    let id = backend.seed_post("A post", "<p>body</p>", None);
    let client = BlogClient::new(&backend.base_url);

    client
        .like_status(PostId::new(id), Some(ADMIN_TOKEN))
        .await
        .expect("status with token");
    let with_token = backend.requests_to("/likes");
    assert_eq!(
        with_token.last().unwrap().bearer.as_deref(),
        Some(ADMIN_TOKEN)
    );

    client
        .like_status(PostId::new(id), None)
        .await
        .expect("status without token");
    let without_token = backend.requests_to("/likes");
    assert_eq!(without_token.last().unwrap().bearer, None);
}

// ============================================================================
// Status Mapping Tests
// ============================================================================

#[tokio::test]
async fn test_stale_token_maps_to_unauthorized() {
    let backend = MockBackend::spawn().await;
    let client = BlogClient::new(&backend.base_url);

    let draft = PostDraft {
        title: "Title".to_string(),
        content: "<p>body</p>".to_string(),
        category_id: None,
    };
    let err = client
        .create_post("stale-token", &draft)
        .await
        .expect_err("401 expected");
    assert!(matches!(err, ApiError::Unauthorized));
}

#[tokio::test]
async fn test_missing_post_maps_to_not_found() {
    let backend = MockBackend::spawn().await;
    let client = BlogClient::new(&backend.base_url);

    let err = client
        .get_post(PostId::new(999))
        .await
        .expect_err("404 expected");
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_wrong_comment_password_surfaces_server_message() {
    let backend = MockBackend::spawn().await;
    let post = backend.seed_post("A post", "<p>body</p>", None);
    let comment = backend.seed_comment(post, "visitor", "secret");
    let client = BlogClient::new(&backend.base_url);

    let err = client
        .delete_comment(CommentId::new(comment), "wrong")
        .await
        .expect_err("password mismatch expected");
    assert_eq!(err.user_message(), "Wrong password.");

    // The comment survives a failed deletion
    assert_eq!(backend.state.comments.lock().unwrap().len(), 1);

    client
        .delete_comment(CommentId::new(comment), "secret")
        .await
        .expect("deletion with the right password");
    assert!(backend.state.comments.lock().unwrap().is_empty());
}

// ============================================================================
// Auth & Upload Tests
// ============================================================================

#[tokio::test]
async fn test_login_round_trip() {
    let backend = MockBackend::spawn().await;
    let client = BlogClient::new(&backend.base_url);

    let token = client
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("login");
    assert_eq!(token, ADMIN_TOKEN);

    let err = client
        .login(ADMIN_EMAIL, "nope")
        .await
        .expect_err("bad credentials");
    assert!(matches!(err, ApiError::Unauthorized));
}

#[tokio::test]
async fn test_image_upload_returns_url() {
    let backend = MockBackend::spawn().await;
    let client = BlogClient::new(&backend.base_url);

    let url = client
        .upload_image(ADMIN_TOKEN, "photo.png", "image/png", vec![0x89, 0x50])
        .await
        .expect("upload");
    assert!(url.contains("photo.png"));
}

// ============================================================================
// Category Cache Tests
// ============================================================================

#[tokio::test]
async fn test_category_list_is_cached_and_invalidated_on_mutation() {
    let backend = MockBackend::spawn().await;
    backend.seed_categories(&["Rust", "Go"]);
    let client = BlogClient::new(&backend.base_url);

    let first = client.list_categories().await.expect("first fetch");
    assert_eq!(first.len(), 2);
    let second = client.list_categories().await.expect("cached fetch");
    assert_eq!(second.len(), 2);

    let gets = |backend: &MockBackend| {
        backend
            .requests_to("/categories")
            .iter()
            .filter(|r| r.method == "GET")
            .count()
    };
    assert_eq!(gets(&backend), 1, "second fetch should hit the cache");

    // A mutation drops the cache, so the next read refetches
    client
        .create_category(ADMIN_TOKEN, "Databases")
        .await
        .expect("create category");
    let third = client.list_categories().await.expect("refetch");
    assert_eq!(third.len(), 3);
    assert_eq!(gets(&backend), 2);
}
