//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Renders a plain-text excerpt of an HTML post body.
///
/// Usage in templates: `{{ post.content|excerpt }}`
#[askama::filter_fn]
pub fn excerpt(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(crate::preview::truncate_preview(
        &value.to_string(),
        crate::preview::PREVIEW_LENGTH,
    ))
}
