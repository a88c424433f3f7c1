//! Pure MIME type validation: functional core.
//!
//! No I/O here. The declared type of a selected file is checked against an
//! exact allow-list; substring or pattern matches are never accepted.

/// MIME types accepted when no configuration overrides the allow-list.
pub const DEFAULT_ACCEPTED_TYPES: [&str; 2] = ["image/png", "image/jpeg"];

/// Returns `true` if `declared` is exactly one of `accepted`.
///
/// Comparison is case-insensitive on the whole type string (MIME types are
/// case-insensitive) but otherwise exact: `image/jpg`, `image/pngx` and
/// `text/png` are all rejected.
pub fn is_accepted_type<S: AsRef<str>>(declared: &str, accepted: &[S]) -> bool {
    let declared = declared.trim();
    if declared.is_empty() {
        return false;
    }
    accepted
        .iter()
        .any(|t| t.as_ref().eq_ignore_ascii_case(declared))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_png_and_jpeg() {
        assert!(is_accepted_type("image/png", &DEFAULT_ACCEPTED_TYPES));
        assert!(is_accepted_type("image/jpeg", &DEFAULT_ACCEPTED_TYPES));
    }

    #[test]
    fn rejects_text_plain() {
        assert!(!is_accepted_type("text/plain", &DEFAULT_ACCEPTED_TYPES));
    }

    #[test]
    fn rejects_loose_pattern_matches() {
        // These all slip through a `image.[png|jpg|jpeg]` style regex.
        for t in ["image/gif", "image/jpg", "imagexpng", "image/pngx"] {
            assert!(!is_accepted_type(t, &DEFAULT_ACCEPTED_TYPES), "{} accepted", t);
        }
    }

    #[test]
    fn mime_case_is_ignored() {
        assert!(is_accepted_type("IMAGE/PNG", &DEFAULT_ACCEPTED_TYPES));
    }

    #[test]
    fn empty_type_is_rejected() {
        assert!(!is_accepted_type("", &DEFAULT_ACCEPTED_TYPES));
        assert!(!is_accepted_type("   ", &DEFAULT_ACCEPTED_TYPES));
    }

    #[test]
    fn custom_allow_list() {
        let accepted = vec!["image/webp".to_string()];
        assert!(is_accepted_type("image/webp", &accepted));
        assert!(!is_accepted_type("image/png", &accepted));
    }
}
