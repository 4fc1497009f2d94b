//! Slugs for conversation projects and save slots.

const FALLBACK_SLUG: &str = "conversation";

/// Longest slug kept, so slot file names stay short.
pub const MAX_SLUG_LEN: usize = 64;

/// Turn a conversation project or save slot name into a lowercase, filesystem-safe slug.
///
/// Runs of whitespace and punctuation collapse into one `-`, while `-` and `_` typed by
/// the user are kept as written. Names with nothing usable fall back to `conversation`,
/// and longer slugs are cut to [`MAX_SLUG_LEN`] characters.
pub fn sanitize_slug(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len().min(MAX_SLUG_LEN));
    let mut gap = false;
    for ch in raw.chars() {
        match ch {
            c if c.is_ascii_alphanumeric() => {
                if gap && !slug.is_empty() {
                    slug.push('-');
                }
                slug.push(c.to_ascii_lowercase());
                gap = false;
            },
            '-' | '_' if !slug.is_empty() => {
                slug.push(ch);
                gap = false;
            },
            _ => gap = true,
        }
    }
    slug.truncate(MAX_SLUG_LEN);
    let slug = slug.trim_end_matches(['-', '_']);
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}
