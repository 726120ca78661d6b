//! Plain-text previews of editor-produced HTML.
//!
//! Post bodies arrive as markup from the rich-text editor. List cards
//! show a short plain-text excerpt instead: tags stripped, the `&nbsp;`
//! entity collapsed to a space, trimmed, and clipped to a fixed
//! character count with an ellipsis marker when clipping happened.

/// Character limit for list-card previews.
pub const PREVIEW_LENGTH: usize = 120;

/// Strip markup tags and collapse `&nbsp;` into plain text.
#[must_use]
pub fn strip_markup(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&nbsp;", " ").trim().to_string()
}

/// Clip plain text derived from `html` to `max_chars` characters.
///
/// Counts characters, not bytes, so multibyte text clips cleanly.
#[must_use]
pub fn truncate_preview(html: &str, max_chars: usize) -> String {
    let text = strip_markup(html);
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut clipped = text
                .get(..cut)
                .unwrap_or_default()
                .trim_end()
                .to_string();
            clipped.push_str("...");
            clipped
        }
        None => text,
    }
}

/// Whether the markup contains no visible text at all.
///
/// The editor emits things like `<p><br></p>` for an empty document;
/// those must not pass the non-empty validation.
#[must_use]
pub fn is_blank_markup(html: &str) -> bool {
    strip_markup(html).is_empty()
}
