//! Wire types for the blog backend REST API.
//!
//! The backend speaks camelCase JSON. Field names follow the canonical
//! contract (`authorName`, `createdAt`); list endpoints wrap their items
//! in a Spring-style page object with a `content` array.

use chrono::{DateTime, Utc};
use devlog_core::{CategoryId, CommentId, PostId};
use serde::{Deserialize, Serialize};

use devlog_core::like::LikeState;

/// A blog post as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    /// Post body as HTML produced by the rich-text editor.
    pub content: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
}

/// One page of posts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub content: Vec<Post>,
    pub total_pages: u32,
    pub total_elements: u64,
}

impl PostPage {
    /// The page rendered when nothing could be fetched.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            content: Vec::new(),
            total_pages: 0,
            total_elements: 0,
        }
    }
}

/// Body sent when creating or updating a post.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub category_id: Option<CategoryId>,
}

/// A post category.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A comment under a post.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Comment list response (`{content: [...]}`, unpaginated).
#[derive(Debug, Clone, Deserialize)]
pub struct CommentPage {
    pub content: Vec<Comment>,
}

/// Body sent when creating a comment.
///
/// The password is write-once: the backend stores a digest and the
/// frontend never sees it again.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDraft {
    pub author_name: String,
    pub password: String,
    pub content: String,
}

/// Like status for a post, scoped to the current actor.
///
/// The actor is the bearer token when one is sent, or a server-inferred
/// anonymous identity otherwise.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub liked_by_me: bool,
    pub like_count: u64,
}

impl From<LikeStatus> for LikeState {
    fn from(status: LikeStatus) -> Self {
        Self::new(status.liked_by_me, status.like_count)
    }
}

/// Successful login response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
}

/// Successful image upload response.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    pub url: String,
}

/// Error body the backend attaches to non-2xx responses (best effort).
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_page_deserializes_spring_shape() {
        let json = r#"{
            "content": [{
                "id": 1,
                "title": "Hello",
                "content": "<p>body</p>",
                "categoryId": 2,
                "categoryName": "Rust",
                "authorName": "jyo",
                "createdAt": "2026-01-05T09:30:00Z",
                "viewCount": 12,
                "likeCount": 3
            }],
            "totalPages": 4,
            "totalElements": 31
        }"#;

        let page: PostPage = serde_json::from_str(json).expect("deserialize");
        assert_eq!(page.total_pages, 4);
        assert_eq!(page.content.len(), 1);
        let post = &page.content[0];
        assert_eq!(post.category_name.as_deref(), Some("Rust"));
        assert_eq!(post.view_count, 12);
    }

    #[test]
    fn test_post_tolerates_missing_optional_fields() {
        let json = r#"{
            "id": 7,
            "title": "Untitled",
            "content": "",
            "createdAt": "2026-01-05T09:30:00Z"
        }"#;

        let post: Post = serde_json::from_str(json).expect("deserialize");
        assert_eq!(post.category_name, None);
        assert_eq!(post.author_name, None);
        assert_eq!(post.like_count, 0);
    }

    #[test]
    fn test_like_status_maps_to_like_state() {
        let status: LikeStatus =
            serde_json::from_str(r#"{"likedByMe": true, "likeCount": 5}"#).expect("deserialize");
        assert_eq!(LikeState::from(status), LikeState::new(true, 5));
    }

    #[test]
    fn test_comment_draft_serializes_camel_case() {
        let draft = CommentDraft {
            author_name: "visitor".to_string(),
            password: "pw".to_string(),
            content: "nice post".to_string(),
        };
        let json = serde_json::to_value(&draft).expect("serialize");
        assert_eq!(json["authorName"], "visitor");
        assert!(json.get("author_name").is_none());
    }
}
