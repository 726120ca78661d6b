//! Listing service fallback and stale-response ordering.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;
use std::time::Duration;

use devlog_core::ListingQuery;
use devlog_integration_tests::MockBackend;
use devlog_web::api::BlogClient;
use devlog_web::services::ListingService;

#[tokio::test]
async fn test_failed_fetch_serves_last_good_listing() {
    let backend = MockBackend::spawn().await;
    backend.seed_posts(3);
    let service = ListingService::new(BlogClient::new(&backend.base_url));

    let listing = service.load(&ListingQuery::default()).await;
    assert!(!listing.stale);
    assert_eq!(listing.page.content.len(), 3);

    backend.state.fail_listing.store(true, Ordering::SeqCst);

    // A search bypasses the page cache, so the failure is observed;
    // the previously fetched listing stays on screen.
    let query = ListingQuery::from_params(Some("anything"), None, None);
    let fallback = service.load(&query).await;
    assert!(fallback.stale);
    assert_eq!(fallback.page.content.len(), 3);
}

#[tokio::test]
async fn test_failed_fetch_with_no_history_is_empty() {
    let backend = MockBackend::spawn().await;
    backend.state.fail_listing.store(true, Ordering::SeqCst);
    let service = ListingService::new(BlogClient::new(&backend.base_url));

    let listing = service.load(&ListingQuery::default()).await;
    assert!(listing.stale);
    assert!(listing.page.content.is_empty());
    assert_eq!(listing.page.total_pages, 0);
}

#[tokio::test]
async fn test_superseded_fetch_does_not_overwrite_newer_result() {
    let backend = MockBackend::spawn().await;
    // One post matches the delayed "slow" keyword; the full listing has four
    backend.seed_post("slow cooking", "<p>braise</p>", None);
    backend.seed_posts(3);
    let service = ListingService::new(BlogClient::new(&backend.base_url));

    // Query A: delayed by the mock, resolves last
    let slow = {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .load(&ListingQuery::from_params(Some("slow"), None, None))
                .await
        })
    };

    // Query B: issued after A, resolves first
    tokio::time::sleep(Duration::from_millis(100)).await;
    let fast = service.load(&ListingQuery::default()).await;
    assert!(!fast.stale);
    assert_eq!(fast.page.content.len(), 4);

    // A's own response still renders for A's request...
    let slow = slow.await.unwrap();
    assert_eq!(slow.page.content.len(), 1);

    // ...but the shared snapshot must hold B's result, not A's
    backend.state.fail_listing.store(true, Ordering::SeqCst);
    let fallback = service
        .load(&ListingQuery::from_params(Some("missing"), None, None))
        .await;
    assert!(fallback.stale);
    assert_eq!(
        fallback.page.content.len(),
        4,
        "the superseded slow response overwrote the newer snapshot"
    );
}
