//! Shared utility functions for markdown rendering.

/// Compute the in-document anchor for a heading text.
///
/// The text is lower-cased, spaces become hyphens and every character
/// outside `[a-z0-9-]` is dropped.
///
/// # Examples
///
/// ```
/// use twirp_doc_markdown::heading_anchor;
///
/// assert_eq!(heading_anchor("Get User!"), "get-user");
/// assert_eq!(heading_anchor("POST /GetUser"), "post-getuser");
/// assert_eq!(heading_anchor("acme.users.v1.User"), "acmeusersv1user");
/// ```
pub fn heading_anchor(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '-'))
        .collect()
}

/// Number of visible characters in `text`, counted as Unicode code points.
///
/// ```
/// use twirp_doc_markdown::char_width;
///
/// assert_eq!(char_width("abc"), 3);
/// assert_eq!(char_width("héllo"), 5);
/// ```
#[must_use]
pub fn char_width(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_spaces_become_hyphens() {
        assert_eq!(heading_anchor("Twirp Errors"), "twirp-errors");
    }

    #[test]
    fn test_anchor_strips_punctuation() {
        assert_eq!(heading_anchor("Get User!"), "get-user");
        assert_eq!(heading_anchor("a_b.c/d"), "abcd");
    }

    #[test]
    fn test_anchor_keeps_hyphens_and_digits() {
        assert_eq!(heading_anchor("v1-beta 2"), "v1-beta-2");
    }

    #[test]
    fn test_anchor_drops_non_ascii() {
        assert_eq!(heading_anchor("Über Café"), "ber-caf");
    }

    #[test]
    fn test_anchor_empty() {
        assert_eq!(heading_anchor(""), "");
    }

    #[test]
    fn test_char_width_multibyte() {
        assert_eq!(char_width("日本語"), 3);
        assert_eq!("日本語".len(), 9);
    }
}
