//! Blog backend API client implementation.
//!
//! Uses `reqwest` for HTTP and `moka` to cache the category list
//! (60-second TTL, invalidated on category mutations).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use devlog_core::{CategoryId, CommentId, ListingQuery, PAGE_SIZE, PostId};

use crate::api::ApiError;
use crate::api::types::{
    Category, Comment, CommentDraft, CommentPage, ErrorBody, LikeStatus, LoginResponse, Post,
    PostDraft, PostPage, UploadedImage,
};

/// Sort order requested for listings (Spring `sort` parameter).
const LISTING_SORT: &str = "createdAt,desc";

/// Cache key for the category list.
const CATEGORY_CACHE_KEY: &str = "categories";

/// Category cache TTL.
const CATEGORY_CACHE_TTL: Duration = Duration::from_secs(60);

// =============================================================================
// BlogClient
// =============================================================================

/// Client for the blog backend REST API.
///
/// Attaches `Authorization: Bearer <token>` to any request made with a
/// token; every other part of the request pipeline is identical for
/// anonymous and authenticated calls.
#[derive(Clone)]
pub struct BlogClient {
    inner: Arc<BlogClientInner>,
}

struct BlogClientInner {
    client: reqwest::Client,
    base_url: String,
    categories: Cache<String, Vec<Category>>,
}

impl BlogClient {
    /// Create a new backend API client.
    ///
    /// `base_url` must not end with a slash (config normalizes this).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let categories = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATEGORY_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(BlogClientInner {
                client: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
                categories,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Start a request, attaching the bearer token when one is held.
    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let mut request = self.inner.client.request(method, self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Send a request and decode a JSON response body.
    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose success response carries no body.
    async fn send_no_content(request: RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await?;
            return Err(Self::status_error(status, &body));
        }

        Ok(())
    }

    /// Map a non-success status to the error taxonomy.
    fn status_error(status: StatusCode, body: &str) -> ApiError {
        // Backend error bodies are `{message}`; fall back to raw text
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| body.chars().take(200).collect());

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            s if s.is_client_error() => ApiError::Rejected(message),
            s => ApiError::Upstream(s.as_u16()),
        }
    }

    // =========================================================================
    // Post Methods
    // =========================================================================

    /// Fetch one page of posts for a resolved listing query.
    ///
    /// The backend takes a **zero-based** page; the query's one-based
    /// page number is translated here and nowhere else.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(page = query.page(), keyword = ?query.keyword()))]
    pub async fn list_posts(&self, query: &ListingQuery) -> Result<PostPage, ApiError> {
        let mut params: Vec<(&str, String)> = vec![
            ("page", query.backend_page().to_string()),
            ("size", PAGE_SIZE.to_string()),
            ("sort", LISTING_SORT.to_string()),
        ];
        if let Some(keyword) = query.keyword() {
            params.push(("keyword", keyword.to_string()));
        }
        if let Some(category) = query.category() {
            params.push(("categoryId", category.to_string()));
        }

        let request = self.inner.client.get(self.url("/posts")).query(&params);
        Self::send(request).await
    }

    /// Fetch a single post.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the post doesn't exist.
    #[instrument(skip(self), fields(post_id = %id))]
    pub async fn get_post(&self, id: PostId) -> Result<Post, ApiError> {
        Self::send(self.inner.client.get(self.url(&format!("/posts/{id}")))).await
    }

    /// Create a post (author-authenticated).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the draft or the token.
    #[instrument(skip(self, token, draft))]
    pub async fn create_post(&self, token: &str, draft: &PostDraft) -> Result<Post, ApiError> {
        let request = self.request(Method::POST, "/posts", Some(token)).json(draft);
        Self::send(request).await
    }

    /// Update a post (author-authenticated).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the draft or the token.
    #[instrument(skip(self, token, draft), fields(post_id = %id))]
    pub async fn update_post(
        &self,
        token: &str,
        id: PostId,
        draft: &PostDraft,
    ) -> Result<Post, ApiError> {
        let request = self
            .request(Method::PUT, &format!("/posts/{id}"), Some(token))
            .json(draft);
        Self::send(request).await
    }

    /// Delete a post (author-authenticated).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the deletion.
    #[instrument(skip(self, token), fields(post_id = %id))]
    pub async fn delete_post(&self, token: &str, id: PostId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("/posts/{id}"), Some(token));
        Self::send_no_content(request).await
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// Fetch the category list (cached briefly).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(categories) = self.inner.categories.get(CATEGORY_CACHE_KEY).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> =
            Self::send(self.inner.client.get(self.url("/categories"))).await?;

        self.inner
            .categories
            .insert(CATEGORY_CACHE_KEY.to_string(), categories.clone())
            .await;

        Ok(categories)
    }

    /// Create a category (admin-gated).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the mutation.
    #[instrument(skip(self, token))]
    pub async fn create_category(&self, token: &str, name: &str) -> Result<Category, ApiError> {
        let request = self
            .request(Method::POST, "/categories", Some(token))
            .json(&serde_json::json!({ "name": name }));
        let category = Self::send(request).await?;
        self.invalidate_categories().await;
        Ok(category)
    }

    /// Rename a category (admin-gated).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the mutation.
    #[instrument(skip(self, token), fields(category_id = %id))]
    pub async fn rename_category(
        &self,
        token: &str,
        id: CategoryId,
        name: &str,
    ) -> Result<Category, ApiError> {
        let request = self
            .request(Method::PUT, &format!("/categories/{id}"), Some(token))
            .json(&serde_json::json!({ "name": name }));
        let category = Self::send(request).await?;
        self.invalidate_categories().await;
        Ok(category)
    }

    /// Delete a category (admin-gated).
    ///
    /// Orphaned-post effects are the backend's business.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the mutation.
    #[instrument(skip(self, token), fields(category_id = %id))]
    pub async fn delete_category(&self, token: &str, id: CategoryId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("/categories/{id}"), Some(token));
        Self::send_no_content(request).await?;
        self.invalidate_categories().await;
        Ok(())
    }

    /// Drop the cached category list.
    pub async fn invalidate_categories(&self) {
        self.inner
            .categories
            .invalidate(CATEGORY_CACHE_KEY)
            .await;
    }

    // =========================================================================
    // Comment Methods (not cached - mutable state)
    // =========================================================================

    /// Fetch the full comment collection for a post (unpaginated).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(post_id = %post))]
    pub async fn list_comments(&self, post: PostId) -> Result<Vec<Comment>, ApiError> {
        let page: CommentPage = Self::send(
            self.inner
                .client
                .get(self.url(&format!("/posts/{post}/comments"))),
        )
        .await?;
        Ok(page.content)
    }

    /// Create a comment as any visitor.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the draft.
    #[instrument(skip(self, draft), fields(post_id = %post))]
    pub async fn create_comment(
        &self,
        post: PostId,
        draft: &CommentDraft,
    ) -> Result<Comment, ApiError> {
        let request = self
            .inner
            .client
            .post(self.url(&format!("/posts/{post}/comments")))
            .json(draft);
        Self::send(request).await
    }

    /// Delete a comment by proving knowledge of its password.
    ///
    /// The password travels in the request body; a mismatch comes back
    /// as `ApiError::Rejected` with the server's message.
    ///
    /// # Errors
    ///
    /// Returns an error if the password is wrong or the request fails.
    #[instrument(skip(self, password), fields(comment_id = %id))]
    pub async fn delete_comment(&self, id: CommentId, password: &str) -> Result<(), ApiError> {
        let request = self
            .inner
            .client
            .delete(self.url(&format!("/comments/{id}")))
            .json(&serde_json::json!({ "password": password }));
        Self::send_no_content(request).await
    }

    // =========================================================================
    // Like Methods
    // =========================================================================

    /// Fetch the like status for a post, scoped to the current actor.
    ///
    /// With a token the backend resolves the authenticated identity;
    /// without one it falls back to an IP-based anonymous identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(post_id = %post))]
    pub async fn like_status(
        &self,
        post: PostId,
        token: Option<&str>,
    ) -> Result<LikeStatus, ApiError> {
        let request = self.request(Method::GET, &format!("/posts/{post}/likes"), token);
        Self::send(request).await
    }

    /// Toggle the like for a post and return the authoritative status.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the toggle.
    #[instrument(skip(self, token), fields(post_id = %post))]
    pub async fn toggle_like(
        &self,
        post: PostId,
        token: Option<&str>,
    ) -> Result<LikeStatus, ApiError> {
        let request = self.request(Method::POST, &format!("/posts/{post}/likes"), token);
        Self::send(request).await
    }

    // =========================================================================
    // Auth & Upload Methods
    // =========================================================================

    /// Log in and return the bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let request = self
            .inner
            .client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }));
        let response: LoginResponse = Self::send(request).await?;
        Ok(response.access_token)
    }

    /// Upload an image for the editor and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload is refused.
    #[instrument(skip(self, token, bytes), fields(filename = %filename))]
    pub async fn upload_image(
        &self,
        token: &str,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let request = self
            .request(Method::POST, "/files/images", Some(token))
            .multipart(form);
        let uploaded: UploadedImage = Self::send(request).await?;
        Ok(uploaded.url)
    }
}
