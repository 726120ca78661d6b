//! In-process mock of the blog REST backend.
//!
//! Implements the wire contract the frontend consumes (camelCase JSON,
//! Spring-style page objects, `{message}` error bodies) with in-memory
//! state, plus a few failure switches tests flip to exercise the
//! degradation paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Admin credentials the mock accepts.
pub const ADMIN_EMAIL: &str = "admin@devlog.test";
pub const ADMIN_PASSWORD: &str = "open sesame";
/// Token issued on successful login.
pub const ADMIN_TOKEN: &str = "test-access-token";

/// Actor key for requests carrying no (valid) token.
const ANON_ACTOR: &str = "anon";

// =============================================================================
// Records
// =============================================================================

/// A post held by the mock.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub author_name: Option<String>,
    pub created_at: String,
    pub view_count: u64,
    pub like_count: u64,
}

/// A category held by the mock.
#[derive(Debug, Clone, Serialize)]
pub struct MockCategory {
    pub id: i64,
    pub name: String,
}

/// A comment held by the mock (password kept server-side only).
#[derive(Debug, Clone)]
pub struct MockComment {
    pub id: i64,
    pub post_id: i64,
    pub author_name: String,
    pub password: String,
    pub content: String,
    pub created_at: String,
}

/// One request the mock received, as seen on the wire.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub bearer: Option<String>,
}

// =============================================================================
// State
// =============================================================================

/// Shared mutable state of the mock backend.
#[derive(Default)]
pub struct MockState {
    pub posts: Mutex<Vec<MockPost>>,
    pub categories: Mutex<Vec<MockCategory>>,
    pub comments: Mutex<Vec<MockComment>>,
    /// (post id, actor) pairs that have liked.
    pub likes: Mutex<HashMap<(i64, String), ()>>,
    pub requests: Mutex<Vec<RecordedRequest>>,
    /// Listing endpoint answers 500.
    pub fail_listing: AtomicBool,
    /// Like toggle endpoint answers 500.
    pub fail_toggle: AtomicBool,
    /// Like toggle is accepted but changes nothing (duplicate declined).
    pub reject_toggle: AtomicBool,
    /// The admin token stops being accepted (simulates expiry).
    pub revoke_token: AtomicBool,
    next_id: AtomicI64,
}

impl MockState {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_admin(&self, bearer: Option<&str>) -> bool {
        bearer == Some(ADMIN_TOKEN) && !self.revoke_token.load(Ordering::SeqCst)
    }

    /// Actor key for like scoping: the token identity when valid, an
    /// implicit anonymous identity otherwise.
    fn actor(&self, bearer: Option<&str>) -> String {
        if self.is_admin(bearer) {
            format!("user:{ADMIN_TOKEN}")
        } else {
            ANON_ACTOR.to_string()
        }
    }

    fn like_count(&self, post_id: i64) -> u64 {
        self.likes
            .lock()
            .unwrap()
            .keys()
            .filter(|(id, _)| *id == post_id)
            .count() as u64
    }
}

// =============================================================================
// MockBackend
// =============================================================================

/// A running mock backend.
pub struct MockBackend {
    /// Base URL including the `/api` prefix, ready for `BlogClient`.
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockBackend {
    /// Bind the mock on an ephemeral port and start serving.
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::default());

        let api = Router::new()
            .route("/posts", get(list_posts).post(create_post))
            .route(
                "/posts/{id}",
                get(get_post).put(update_post).delete(delete_post),
            )
            .route("/posts/{id}/comments", get(list_comments).post(create_comment))
            .route("/posts/{id}/likes", get(like_status).post(toggle_like))
            .route("/comments/{id}", delete(delete_comment))
            .route("/categories", get(list_categories).post(create_category))
            .route(
                "/categories/{id}",
                axum::routing::put(rename_category).delete(delete_category),
            )
            .route("/auth/login", post(login))
            .route("/files/images", post(upload_image))
            .layer(middleware::from_fn_with_state(state.clone(), record_request))
            .with_state(state.clone());

        let app = Router::new().nest("/api", api);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
        }
    }

    /// Seed `count` posts titled `Post 1..=count`, oldest first.
    pub fn seed_posts(&self, count: usize) {
        let mut posts = self.state.posts.lock().unwrap();
        for _ in 0..count {
            let id = self.state.next_id();
            posts.push(MockPost {
                id,
                title: format!("Post {id}"),
                content: format!("<p>Body of post {id}</p>"),
                category_id: None,
                category_name: None,
                author_name: Some("jyo".to_string()),
                created_at: "2026-01-05T09:30:00Z".to_string(),
                view_count: 0,
                like_count: 0,
            });
        }
    }

    /// Seed one post with explicit fields; returns its id.
    pub fn seed_post(&self, title: &str, content: &str, category_id: Option<i64>) -> i64 {
        let id = self.state.next_id();
        self.state.posts.lock().unwrap().push(MockPost {
            id,
            title: title.to_string(),
            content: content.to_string(),
            category_id,
            category_name: None,
            author_name: Some("jyo".to_string()),
            created_at: "2026-01-05T09:30:00Z".to_string(),
            view_count: 0,
            like_count: 0,
        });
        id
    }

    /// Seed categories by name; returns their ids.
    pub fn seed_categories(&self, names: &[&str]) -> Vec<i64> {
        let mut categories = self.state.categories.lock().unwrap();
        names
            .iter()
            .map(|name| {
                let id = self.state.next_id();
                categories.push(MockCategory {
                    id,
                    name: (*name).to_string(),
                });
                id
            })
            .collect()
    }

    /// Seed a comment under a post; returns its id.
    pub fn seed_comment(&self, post_id: i64, author: &str, password: &str) -> i64 {
        let id = self.state.next_id();
        self.state.comments.lock().unwrap().push(MockComment {
            id,
            post_id,
            author_name: author.to_string(),
            password: password.to_string(),
            content: "a comment".to_string(),
            created_at: "2026-01-05T10:00:00Z".to_string(),
        });
        id
    }

    /// Requests received so far whose path ends with `suffix`.
    ///
    /// Suffix matching keeps tests independent of the `/api` mount
    /// point the mock nests its routes under.
    pub fn requests_to(&self, suffix: &str) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path.ends_with(suffix))
            .cloned()
            .collect()
    }
}

// =============================================================================
// Middleware
// =============================================================================

async fn record_request(
    State(state): State<Arc<MockState>>,
    request: Request,
    next: Next,
) -> Response {
    let bearer = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);

    state.requests.lock().unwrap().push(RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().unwrap_or("").to_string(),
        bearer,
    });

    next.run(request).await
}

// =============================================================================
// Handlers
// =============================================================================

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn bearer_from(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

#[derive(Debug, Deserialize)]
struct ListingParams {
    #[serde(default)]
    page: usize,
    #[serde(default = "default_size")]
    size: usize,
    keyword: Option<String>,
    #[serde(rename = "categoryId")]
    category_id: Option<i64>,
}

fn default_size() -> usize {
    10
}

async fn list_posts(
    State(state): State<Arc<MockState>>,
    Query(params): Query<ListingParams>,
) -> Response {
    if state.fail_listing.load(Ordering::SeqCst) {
        return error_body(StatusCode::INTERNAL_SERVER_ERROR, "backend down");
    }

    // Lets a test keep this fetch in flight while a newer one completes
    if params.keyword.as_deref() == Some("slow") {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    let posts = state.posts.lock().unwrap();
    let filtered: Vec<&MockPost> = posts
        .iter()
        .filter(|post| {
            params.keyword.as_ref().is_none_or(|keyword| {
                post.title.contains(keyword.as_str()) || post.content.contains(keyword.as_str())
            })
        })
        .filter(|post| {
            params
                .category_id
                .is_none_or(|category| post.category_id == Some(category))
        })
        .collect();

    let total = filtered.len();
    let total_pages = total.div_ceil(params.size.max(1));
    let content: Vec<&MockPost> = filtered
        .into_iter()
        .skip(params.page * params.size)
        .take(params.size)
        .collect();

    Json(json!({
        "content": content,
        "totalPages": total_pages,
        "totalElements": total,
    }))
    .into_response()
}

async fn get_post(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Response {
    let posts = state.posts.lock().unwrap();
    match posts.iter().find(|post| post.id == id) {
        Some(post) => Json(post.clone()).into_response(),
        None => error_body(StatusCode::NOT_FOUND, "Post not found"),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostBody {
    title: String,
    content: String,
    category_id: Option<i64>,
}

async fn create_post(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<PostBody>,
) -> Response {
    if !state.is_admin(bearer_from(&headers)) {
        return error_body(StatusCode::UNAUTHORIZED, "Invalid or expired token");
    }

    let category_name = body.category_id.and_then(|id| {
        state
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
    });

    let post = MockPost {
        id: state.next_id(),
        title: body.title,
        content: body.content,
        category_id: body.category_id,
        category_name,
        author_name: Some("jyo".to_string()),
        created_at: "2026-01-06T08:00:00Z".to_string(),
        view_count: 0,
        like_count: 0,
    };
    state.posts.lock().unwrap().push(post.clone());
    Json(post).into_response()
}

async fn update_post(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<PostBody>,
) -> Response {
    if !state.is_admin(bearer_from(&headers)) {
        return error_body(StatusCode::UNAUTHORIZED, "Invalid or expired token");
    }

    let mut posts = state.posts.lock().unwrap();
    match posts.iter_mut().find(|post| post.id == id) {
        Some(post) => {
            post.title = body.title;
            post.content = body.content;
            post.category_id = body.category_id;
            Json(post.clone()).into_response()
        }
        None => error_body(StatusCode::NOT_FOUND, "Post not found"),
    }
}

async fn delete_post(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if !state.is_admin(bearer_from(&headers)) {
        return error_body(StatusCode::UNAUTHORIZED, "Invalid or expired token");
    }

    state.posts.lock().unwrap().retain(|post| post.id != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn list_categories(State(state): State<Arc<MockState>>) -> Response {
    let categories = state.categories.lock().unwrap();
    Json(categories.clone()).into_response()
}

#[derive(Debug, Deserialize)]
struct CategoryBody {
    name: String,
}

async fn create_category(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<CategoryBody>,
) -> Response {
    if !state.is_admin(bearer_from(&headers)) {
        return error_body(StatusCode::UNAUTHORIZED, "Invalid or expired token");
    }

    let category = MockCategory {
        id: state.next_id(),
        name: body.name,
    };
    state.categories.lock().unwrap().push(category.clone());
    Json(category).into_response()
}

async fn rename_category(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<CategoryBody>,
) -> Response {
    if !state.is_admin(bearer_from(&headers)) {
        return error_body(StatusCode::UNAUTHORIZED, "Invalid or expired token");
    }

    let mut categories = state.categories.lock().unwrap();
    match categories.iter_mut().find(|category| category.id == id) {
        Some(category) => {
            category.name = body.name;
            Json(category.clone()).into_response()
        }
        None => error_body(StatusCode::NOT_FOUND, "Category not found"),
    }
}

async fn delete_category(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if !state.is_admin(bearer_from(&headers)) {
        return error_body(StatusCode::UNAUTHORIZED, "Invalid or expired token");
    }

    state
        .categories
        .lock()
        .unwrap()
        .retain(|category| category.id != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn list_comments(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Response {
    let comments = state.comments.lock().unwrap();
    let content: Vec<serde_json::Value> = comments
        .iter()
        .filter(|comment| comment.post_id == id)
        .map(|comment| {
            json!({
                "id": comment.id,
                "authorName": comment.author_name,
                "content": comment.content,
                "createdAt": comment.created_at,
            })
        })
        .collect();

    Json(json!({ "content": content })).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentBody {
    author_name: String,
    password: String,
    content: String,
}

async fn create_comment(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    Json(body): Json<CommentBody>,
) -> Response {
    if body.author_name.is_empty() || body.password.is_empty() || body.content.is_empty() {
        return error_body(StatusCode::BAD_REQUEST, "All fields are required");
    }

    let comment = MockComment {
        id: state.next_id(),
        post_id: id,
        author_name: body.author_name,
        password: body.password,
        content: body.content,
        created_at: "2026-01-06T09:00:00Z".to_string(),
    };
    state.comments.lock().unwrap().push(comment.clone());

    Json(json!({
        "id": comment.id,
        "authorName": comment.author_name,
        "content": comment.content,
        "createdAt": comment.created_at,
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
struct DeleteCommentBody {
    password: String,
}

async fn delete_comment(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    Json(body): Json<DeleteCommentBody>,
) -> Response {
    let mut comments = state.comments.lock().unwrap();
    let Some(index) = comments.iter().position(|comment| comment.id == id) else {
        return error_body(StatusCode::NOT_FOUND, "Comment not found");
    };

    if comments[index].password != body.password {
        return error_body(StatusCode::BAD_REQUEST, "Wrong password.");
    }

    comments.remove(index);
    StatusCode::NO_CONTENT.into_response()
}

async fn like_status(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let bearer = bearer_from(&headers);
    if bearer.is_some() && !state.is_admin(bearer) {
        return error_body(StatusCode::UNAUTHORIZED, "Invalid or expired token");
    }

    let actor = state.actor(bearer);
    let liked = state.likes.lock().unwrap().contains_key(&(id, actor));

    Json(json!({
        "likedByMe": liked,
        "likeCount": state.like_count(id),
    }))
    .into_response()
}

async fn toggle_like(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if state.fail_toggle.load(Ordering::SeqCst) {
        return error_body(StatusCode::INTERNAL_SERVER_ERROR, "backend down");
    }

    let bearer = bearer_from(&headers);
    if bearer.is_some() && !state.is_admin(bearer) {
        return error_body(StatusCode::UNAUTHORIZED, "Invalid or expired token");
    }

    let actor = state.actor(bearer);

    // Declined toggles still answer with the authoritative pair
    if !state.reject_toggle.load(Ordering::SeqCst) {
        let mut likes = state.likes.lock().unwrap();
        let key = (id, actor.clone());
        if likes.contains_key(&key) {
            likes.remove(&key);
        } else {
            likes.insert(key, ());
        }
    }

    let liked = state
        .likes
        .lock()
        .unwrap()
        .contains_key(&(id, actor));

    Json(json!({
        "likedByMe": liked,
        "likeCount": state.like_count(id),
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(_state): State<Arc<MockState>>, Json(body): Json<LoginBody>) -> Response {
    if body.email == ADMIN_EMAIL && body.password == ADMIN_PASSWORD {
        Json(json!({ "accessToken": ADMIN_TOKEN })).into_response()
    } else {
        error_body(StatusCode::UNAUTHORIZED, "Invalid email or password")
    }
}

async fn upload_image(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if !state.is_admin(bearer_from(&headers)) {
        return error_body(StatusCode::UNAUTHORIZED, "Invalid or expired token");
    }

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload.bin").to_string();
            let _ = field.bytes().await;
            return Json(json!({ "url": format!("http://files.devlog.test/{filename}") }))
                .into_response();
        }
    }

    error_body(StatusCode::BAD_REQUEST, "file field required")
}
