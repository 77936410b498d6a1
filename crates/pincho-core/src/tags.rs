//! Tag normalization for outbound notifications.

use std::collections::HashSet;

/// Maximum number of tags sent with one notification.
pub const MAX_TAGS: usize = 10;

/// A tag is valid when it is non-empty and only contains `[a-z0-9_-]`.
pub fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// Normalizes tags for transmission.
///
/// - Lowercases and trims each tag
/// - Drops empty tags and tags with characters outside `[a-z0-9_-]`
/// - Drops duplicates (case-insensitive), keeping first-seen order
/// - Keeps at most [`MAX_TAGS`]
///
/// Returns `None` when nothing survives, so the field is omitted.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Option<Vec<String>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !is_valid_tag(&tag) || seen.contains(&tag) {
            continue;
        }
        seen.insert(tag.clone());
        out.push(tag);
    }

    if out.len() > MAX_TAGS {
        tracing::debug!(dropped = out.len() - MAX_TAGS, "too many tags, keeping the first {MAX_TAGS}");
        out.truncate(MAX_TAGS);
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}
