//! Post listing route handler.
//!
//! The address is the single source of truth for the listing: the
//! handler derives a [`ListingQuery`] from the query parameters and
//! every control it renders (search form, category pills, pagination)
//! is a plain link or form that publishes a new address built from that
//! query. No control mutates list state directly.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::{instrument, warn};

use devlog_core::ListingQuery;

use crate::api::types::{Category, Post};
use crate::filters;
use crate::middleware::OptionalAdmin;
use crate::routes::empty_string_as_none;
use crate::state::AppState;

/// Address parameters of the listing page.
#[derive(Debug, Deserialize)]
pub struct ListingParams {
    pub keyword: Option<String>,
    #[serde(
        default,
        rename = "categoryId",
        deserialize_with = "empty_string_as_none"
    )]
    pub category_id: Option<i64>,
    /// One-based page number.
    pub page: Option<u32>,
    pub error: Option<String>,
}

/// Post display data for the listing grid.
#[derive(Clone)]
pub struct PostCard {
    pub href: String,
    pub title: String,
    /// Raw post HTML; the template reduces it to a text excerpt.
    pub content: String,
    pub category_name: String,
    pub author_name: String,
    pub created: String,
    pub view_count: u64,
}

impl From<&Post> for PostCard {
    fn from(post: &Post) -> Self {
        Self {
            href: format!("/posts/{}", post.id),
            title: post.title.clone(),
            content: post.content.clone(),
            category_name: post
                .category_name
                .clone()
                .unwrap_or_else(|| "General".to_string()),
            author_name: post
                .author_name
                .clone()
                .unwrap_or_else(|| "Admin".to_string()),
            created: post.created_at.format("%b %d, %Y").to_string(),
            view_count: post.view_count,
        }
    }
}

/// Category pill display data.
#[derive(Clone)]
pub struct CategoryPill {
    pub name: String,
    /// Toggle address: selects the category, or clears it when it is
    /// already selected.
    pub href: String,
    pub selected: bool,
}

/// One numbered pagination link.
#[derive(Clone)]
pub struct PageLink {
    pub label: String,
    pub href: String,
    pub current: bool,
}

/// Listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub posts: Vec<PostCard>,
    pub pills: Vec<CategoryPill>,
    pub all_href: String,
    pub all_selected: bool,
    pub keyword: String,
    pub category_value: String,
    pub clear_search_href: String,
    pub show_pagination: bool,
    pub pages: Vec<PageLink>,
    pub prev_href: String,
    pub prev_enabled: bool,
    pub next_href: String,
    pub next_enabled: bool,
    pub stale: bool,
    pub is_admin: bool,
    pub error: String,
    pub notice: String,
}

/// Display the post listing for the address-derived query.
#[instrument(skip(state, admin))]
pub async fn index(
    State(state): State<AppState>,
    admin: OptionalAdmin,
    Query(params): Query<ListingParams>,
) -> HomeTemplate {
    let query = ListingQuery::from_params(
        params.keyword.as_deref(),
        params.category_id,
        params.page,
    );

    // The category set and the post page are independent fetches
    let (categories, listing) = tokio::join!(
        state.api().list_categories(),
        state.listing().load(&query),
    );

    let categories = categories.unwrap_or_else(|err| {
        warn!(error = %err, "Category fetch failed");
        Vec::new()
    });

    let total_pages = listing.page.total_pages;
    let posts = listing.page.content.iter().map(PostCard::from).collect();
    let pills = build_pills(&categories, &query);
    let (pages, prev, next) = build_pagination(&query, total_pages);

    HomeTemplate {
        posts,
        pills,
        all_href: query.clear_category().href(),
        all_selected: query.category().is_none(),
        keyword: query.keyword().unwrap_or_default().to_string(),
        category_value: query
            .category()
            .map_or_else(String::new, |id| id.to_string()),
        clear_search_href: if query.is_search() {
            query.with_search("").href()
        } else {
            String::new()
        },
        show_pagination: total_pages > 1,
        pages,
        prev_href: prev.clone().unwrap_or_default(),
        prev_enabled: prev.is_some(),
        next_href: next.clone().unwrap_or_default(),
        next_enabled: next.is_some(),
        stale: listing.stale,
        is_admin: admin.is_authenticated(),
        error: params.error.unwrap_or_default(),
        notice: String::new(),
    }
}

fn build_pills(categories: &[Category], query: &ListingQuery) -> Vec<CategoryPill> {
    categories
        .iter()
        .map(|category| CategoryPill {
            name: category.name.clone(),
            href: query.toggle_category(category.id).href(),
            selected: query.is_selected(category.id),
        })
        .collect()
}

/// Numbered links plus prev/next, all range-checked through `page_href`.
fn build_pagination(
    query: &ListingQuery,
    total_pages: u32,
) -> (Vec<PageLink>, Option<String>, Option<String>) {
    let pages = (1..=total_pages)
        .filter_map(|n| {
            query.page_href(n, total_pages).map(|href| PageLink {
                label: n.to_string(),
                href,
                current: n == query.page(),
            })
        })
        .collect();

    let prev = query.page_href(query.page().saturating_sub(1), total_pages);
    let next = query.page_href(query.page() + 1, total_pages);

    (pages, prev, next)
}
