//! Filesystem-safe name sanitization.
//!
//! Category labels and rename suffixes come from operator input and end up
//! as directory or file names, so they are reduced to a conservative ASCII
//! alphabet before touching the disk. Sanitization is total: any input maps
//! to a usable token.

/// Token used when a category label is empty or all-unsafe.
pub const FALLBACK_CATEGORY: &str = "UnknownCategory";

/// Reduce a category label to a filesystem-safe token.
///
/// Output always matches `[A-Za-z0-9._-]+` and is never a pure-dot token
/// (`.` and `..` would resolve to the store root or its parent). Every run
/// of disallowed characters collapses to a single `_`. Empty or
/// whitespace-only input maps to [`FALLBACK_CATEGORY`]. Idempotent on
/// already-safe input.
pub fn sanitize_category(name: &str) -> String {
    if name.trim().is_empty() {
        return FALLBACK_CATEGORY.to_string();
    }

    let mut out = String::with_capacity(name.len());
    let mut in_bad_run = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            out.push(c);
            in_bad_run = false;
        } else if !in_bad_run {
            out.push('_');
            in_bad_run = true;
        }
    }

    if out.is_empty() || out.bytes().all(|b| b == b'.') {
        FALLBACK_CATEGORY.to_string()
    } else {
        out
    }
}

/// Sanitize a rename suffix for use inside a run base name.
///
/// Newlines and tabs collapse to spaces, anything outside
/// `[A-Za-z0-9._ -]` becomes `_`, and the result is trimmed. May be empty
/// (an empty suffix means "remove the suffix").
pub fn sanitize_suffix(suffix: &str) -> String {
    let mut out = String::with_capacity(suffix.len());
    let mut in_ws_run = false;
    for c in suffix.trim().chars() {
        if matches!(c, '\r' | '\n' | '\t') {
            if !in_ws_run {
                out.push(' ');
                in_ws_run = true;
            }
            continue;
        }
        in_ws_run = false;
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | ' ') {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    out.trim().to_string()
}

/// Reject names that could escape the store directory.
pub fn is_safe_name(name: &str) -> bool {
    !(name.contains('/') || name.contains('\\') || name.contains(".."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_safe_token(s: &str) -> bool {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    }

    #[test]
    fn category_output_always_safe() {
        for input in [
            "TeleOp",
            "Blue Alliance / Far",
            "日本語",
            "a b\tc",
            "!!!",
            "már.1-x_2",
        ] {
            assert!(is_safe_token(&sanitize_category(input)), "input: {input:?}");
        }
    }

    #[test]
    fn category_collapses_runs_to_single_underscore() {
        assert_eq!(sanitize_category("Blue Alliance / Far"), "Blue_Alliance_Far");
        assert_eq!(sanitize_category("a   b"), "a_b");
    }

    #[test]
    fn category_empty_maps_to_fallback() {
        assert_eq!(sanitize_category(""), FALLBACK_CATEGORY);
        assert_eq!(sanitize_category("   "), FALLBACK_CATEGORY);
    }

    #[test]
    fn category_pure_dot_tokens_map_to_fallback() {
        // "." and ".." would resolve to the store root or its parent.
        assert_eq!(sanitize_category("."), FALLBACK_CATEGORY);
        assert_eq!(sanitize_category(".."), FALLBACK_CATEGORY);
        assert_eq!(sanitize_category("..."), FALLBACK_CATEGORY);
        // Dots mixed with other safe characters stay usable.
        assert_eq!(sanitize_category("v1.2"), "v1.2");
    }

    #[test]
    fn category_idempotent_on_safe_input() {
        let once = sanitize_category("Tele Op #3");
        assert_eq!(sanitize_category(&once), once);
        assert_eq!(sanitize_category("Auto-v1.2_final"), "Auto-v1.2_final");
    }

    #[test]
    fn suffix_collapses_control_whitespace() {
        assert_eq!(sanitize_suffix("  good\trun\n"), "good run");
        assert_eq!(sanitize_suffix("bad/name"), "bad_name");
        assert_eq!(sanitize_suffix(""), "");
    }

    #[test]
    fn safe_name_rejects_traversal() {
        assert!(is_safe_name("0007 good"));
        assert!(!is_safe_name("../etc"));
        assert!(!is_safe_name("a/b"));
        assert!(!is_safe_name("a\\b"));
    }
}
