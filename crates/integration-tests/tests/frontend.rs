//! Full request/response flows through the rendered frontend.
//!
//! The real router (with its session layer) runs against the mock
//! backend; a cookie-holding reqwest client plays the browser.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;

use devlog_integration_tests::{ADMIN_EMAIL, ADMIN_PASSWORD, MockBackend, spawn_frontend};
use reqwest::{Client, StatusCode, redirect::Policy};

/// A browser-like client: holds cookies, does not follow redirects.
fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn login(client: &Client, frontend: &str) {
    let response = client
        .post(format!("{frontend}/auth/login"))
        .form(&[("email", ADMIN_EMAIL), ("password", ADMIN_PASSWORD)])
        .send()
        .await
        .expect("login request");
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/");
}

// ============================================================================
// Listing Page Tests
// ============================================================================

#[tokio::test]
async fn test_home_renders_posts_and_translates_page_number() {
    let backend = MockBackend::spawn().await;
    backend.seed_posts(15);
    let frontend = spawn_frontend(&backend.base_url).await;
    let client = browser();

    let body = client
        .get(format!("{frontend}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Post 1"));
    // Two pages exist, so a link to the second is rendered
    assert!(body.contains("page=2"));

    let body = client
        .get(format!("{frontend}/?page=2"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Post 11"));

    // UI page 2 went out as zero-based page 1
    let last = backend.requests_to("/posts").pop().unwrap();
    assert!(last.query.contains("page=1"), "query was {}", last.query);
}

#[tokio::test]
async fn test_home_renders_empty_state() {
    let backend = MockBackend::spawn().await;
    let frontend = spawn_frontend(&backend.base_url).await;

    let body = browser()
        .get(format!("{frontend}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("No posts here"));
}

#[tokio::test]
async fn test_category_pills_toggle_in_rendered_addresses() {
    let backend = MockBackend::spawn().await;
    let ids = backend.seed_categories(&["Rust"]);
    backend.seed_posts(1);
    let frontend = spawn_frontend(&backend.base_url).await;
    let client = browser();

    // Unselected: the pill links to the category filter
    let body = client
        .get(format!("{frontend}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains(&format!("categoryId={}", ids[0])));

    // Selected: the same pill now links back to the unfiltered listing
    let body = client
        .get(format!("{frontend}/?categoryId={}", ids[0]))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("pill-active"));
}

// ============================================================================
// Auth Flow Tests
// ============================================================================

#[tokio::test]
async fn test_login_and_logout_gate_the_nav() {
    let backend = MockBackend::spawn().await;
    let frontend = spawn_frontend(&backend.base_url).await;
    let client = browser();

    let body = client
        .get(format!("{frontend}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Log in"));
    assert!(!body.contains("/write"));

    login(&client, &frontend).await;

    let body = client
        .get(format!("{frontend}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("/write"));

    let response = client
        .post(format!("{frontend}/auth/logout"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());

    let body = client
        .get(format!("{frontend}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Log in"));
}

#[tokio::test]
async fn test_failed_login_shows_message() {
    let backend = MockBackend::spawn().await;
    let frontend = spawn_frontend(&backend.base_url).await;
    let client = browser();

    let response = client
        .post(format!("{frontend}/auth/login"))
        .form(&[("email", ADMIN_EMAIL), ("password", "wrong")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    let target = location(&response);
    assert!(target.starts_with("/auth/login?error="));

    let body = client
        .get(format!("{frontend}{target}"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Invalid email or password."));
}

#[tokio::test]
async fn test_backend_401_clears_token_silently() {
    let backend = MockBackend::spawn().await;
    let frontend = spawn_frontend(&backend.base_url).await;
    let client = browser();

    login(&client, &frontend).await;

    // The backend stops accepting the token mid-session
    backend.state.revoke_token.store(true, Ordering::SeqCst);

    let response = client
        .post(format!("{frontend}/posts"))
        .form(&[("title", "Title"), ("content", "<p>body</p>")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert!(location(&response).starts_with("/auth/login?error="));

    // The stored token is gone: the UI renders anonymous without crashing
    let body = client
        .get(format!("{frontend}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Log in"));
    assert!(!body.contains("/write"));
}

#[tokio::test]
async fn test_admin_pages_redirect_anonymous_visitors() {
    let backend = MockBackend::spawn().await;
    let frontend = spawn_frontend(&backend.base_url).await;

    let response = browser()
        .get(format!("{frontend}/admin/categories"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/auth/login");
}

// ============================================================================
// Detail Page & Comment Tests
// ============================================================================

#[tokio::test]
async fn test_post_detail_renders_thread_and_like_state() {
    let backend = MockBackend::spawn().await;
    let id = backend.seed_post("Reading logs", "<p>grep everything</p>", None);
    backend.seed_comment(id, "visitor", "secret");
    let frontend = spawn_frontend(&backend.base_url).await;

    let body = browser()
        .get(format!("{frontend}/posts/{id}"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Reading logs"));
    assert!(body.contains("grep everything"));
    assert!(body.contains("visitor"));
    assert!(body.contains("like-button"));
}

#[tokio::test]
async fn test_missing_post_is_404() {
    let backend = MockBackend::spawn().await;
    let frontend = spawn_frontend(&backend.base_url).await;

    let response = browser()
        .get(format!("{frontend}/posts/999"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_comment_is_blocked_before_dispatch() {
    let backend = MockBackend::spawn().await;
    let id = backend.seed_post("A post", "<p>body</p>", None);
    let frontend = spawn_frontend(&backend.base_url).await;

    let response = browser()
        .post(format!("{frontend}/posts/{id}/comments"))
        .form(&[("authorName", "visitor"), ("password", "pw"), ("content", "   ")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert!(location(&response).contains("error="));

    // Nothing reached the backend's comment store
    assert!(backend.state.comments.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_comment_create_and_delete_round_trip() {
    let backend = MockBackend::spawn().await;
    let id = backend.seed_post("A post", "<p>body</p>", None);
    let frontend = spawn_frontend(&backend.base_url).await;
    let client = browser();

    let response = client
        .post(format!("{frontend}/posts/{id}/comments"))
        .form(&[
            ("authorName", "visitor"),
            ("password", "secret"),
            ("content", "great write-up"),
        ])
        .send()
        .await
        .unwrap();
    assert!(location(&response).contains("notice="));

    let comment_id = backend.state.comments.lock().unwrap()[0].id;
    let post_id = id.to_string();

    // Wrong password: the server's message survives into the redirect
    let response = client
        .post(format!("{frontend}/comments/{comment_id}/delete"))
        .form(&[("password", "wrong"), ("postId", post_id.as_str())])
        .send()
        .await
        .unwrap();
    assert!(location(&response).contains("error="));
    assert_eq!(backend.state.comments.lock().unwrap().len(), 1);

    let response = client
        .post(format!("{frontend}/comments/{comment_id}/delete"))
        .form(&[("password", "secret"), ("postId", post_id.as_str())])
        .send()
        .await
        .unwrap();
    assert!(location(&response).contains("notice="));
    assert!(backend.state.comments.lock().unwrap().is_empty());
}
