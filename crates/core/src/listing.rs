//! Listing query model.
//!
//! The listing page holds no state of its own: the current
//! `(keyword, category, page)` triple is derived from the navigable
//! address, and every user action (search submit, category click, page
//! click) publishes a new address built from a [`ListingQuery`]. Address
//! and rendered data therefore cannot diverge.
//!
//! Page numbers are one-based in the address and the UI; the backend
//! expects zero-based pages, translated by [`ListingQuery::backend_page`].

use crate::types::CategoryId;

/// Number of posts requested per listing page.
pub const PAGE_SIZE: u32 = 10;

/// A resolved listing query: the triple the address encodes.
///
/// Construct via [`ListingQuery::from_params`] (deriving from address
/// parameters) and turn back into an address via [`ListingQuery::href`].
/// The two are inverse on canonical queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    keyword: Option<String>,
    category: Option<CategoryId>,
    /// One-based page number, always >= 1.
    page: u32,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            keyword: None,
            category: None,
            page: 1,
        }
    }
}

impl ListingQuery {
    /// Derive a query from raw address parameters.
    ///
    /// Whitespace-only keywords count as absent; page numbers below 1
    /// (including an absent one) resolve to page 1.
    #[must_use]
    pub fn from_params(
        keyword: Option<&str>,
        category: Option<i64>,
        page: Option<u32>,
    ) -> Self {
        Self {
            keyword: normalize_keyword(keyword),
            category: category.map(CategoryId::new),
            page: page.unwrap_or(1).max(1),
        }
    }

    /// The free-text keyword filter, if any.
    #[must_use]
    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    /// The category filter, if any.
    #[must_use]
    pub const fn category(&self) -> Option<CategoryId> {
        self.category
    }

    /// One-based page number shown in the address and the UI.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Zero-based page number sent to the backend (UI page N => N - 1).
    #[must_use]
    pub const fn backend_page(&self) -> u32 {
        self.page - 1
    }

    /// Whether a keyword filter is active (searches bypass caching).
    #[must_use]
    pub const fn is_search(&self) -> bool {
        self.keyword.is_some()
    }

    /// Whether `id` is the currently selected category.
    #[must_use]
    pub fn is_selected(&self, id: CategoryId) -> bool {
        self.category == Some(id)
    }

    /// Submit a search: replaces the keyword and resets to page 1.
    ///
    /// The category filter is preserved; keyword and category combine
    /// conjunctively on the backend.
    #[must_use]
    pub fn with_search(&self, keyword: &str) -> Self {
        Self {
            keyword: normalize_keyword(Some(keyword)),
            category: self.category,
            page: 1,
        }
    }

    /// Click a category pill: toggle semantics, resetting to page 1.
    ///
    /// Clicking the already-selected category clears the filter; any
    /// other category replaces it. The keyword is left untouched.
    #[must_use]
    pub fn toggle_category(&self, id: CategoryId) -> Self {
        Self {
            keyword: self.keyword.clone(),
            category: if self.category == Some(id) {
                None
            } else {
                Some(id)
            },
            page: 1,
        }
    }

    /// Click the "All" pill: drop the category filter, back to page 1.
    #[must_use]
    pub fn clear_category(&self) -> Self {
        Self {
            keyword: self.keyword.clone(),
            category: None,
            page: 1,
        }
    }

    /// Navigate to a page, preserving keyword and category.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            keyword: self.keyword.clone(),
            category: self.category,
            page: page.max(1),
        }
    }

    /// Build the navigable address for this query.
    ///
    /// Defaults are omitted: no empty parameters, and page 1 produces no
    /// `page` parameter at all, so equivalent queries share one address.
    #[must_use]
    pub fn href(&self) -> String {
        let mut params = Vec::new();
        if let Some(keyword) = &self.keyword {
            params.push(format!("keyword={}", urlencoding::encode(keyword)));
        }
        if let Some(category) = self.category {
            params.push(format!("categoryId={category}"));
        }
        if self.page > 1 {
            params.push(format!("page={}", self.page));
        }

        if params.is_empty() {
            "/".to_string()
        } else {
            format!("/?{}", params.join("&"))
        }
    }

    /// Address for navigating to `page`, or `None` when out of range.
    ///
    /// Page 0 and pages beyond `total_pages` produce no address, so no
    /// fetch and no address change can result from them.
    #[must_use]
    pub fn page_href(&self, page: u32, total_pages: u32) -> Option<String> {
        if page == 0 || page > total_pages {
            return None;
        }
        Some(self.with_page(page).href())
    }
}

fn normalize_keyword(keyword: Option<&str>) -> Option<String> {
    keyword
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}
