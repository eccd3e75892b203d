//! Sanitizers for untrusted client input.
//!
//! Every function is total: a value that fails validation is replaced by the
//! supplied default rather than reported. A malformed optional parameter can
//! therefore never fail a redemption.

use std::sync::LazyLock;

use regex::Regex;

// Terminal names end up in the remote process environment (`TERM`), so only
// a conservative character set is let through.
static TERM_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9!^(){}\-_~]*[A-Za-z0-9_]$").expect("static pattern compiles")
});

/// Accept case-insensitive `true` / `false`.
#[must_use]
pub fn bool_or_default(raw: Option<&str>, default: bool) -> bool {
    match raw {
        Some(s) if s.eq_ignore_ascii_case("true") => true,
        Some(s) if s.eq_ignore_ascii_case("false") => false,
        _ => default,
    }
}

/// Accept a decimal integer within `min..=max`.
#[must_use]
pub fn int_in_range_or_default(raw: Option<&str>, min: i64, max: i64, default: i64) -> i64 {
    raw.and_then(|s| s.parse::<i64>().ok())
        .filter(|v| (min..=max).contains(v))
        .unwrap_or(default)
}

/// Accept only members of `allowed`.
#[must_use]
pub fn enum_or_default(raw: Option<&str>, allowed: &[&str], default: &str) -> String {
    raw.filter(|s| allowed.contains(s))
        .unwrap_or(default)
        .to_string()
}

/// Accept a terminal type name such as `xterm-256color`.
#[must_use]
pub fn term_name_or_default(raw: Option<&str>, default: &str) -> String {
    raw.filter(|s| TERM_NAME.is_match(s))
        .unwrap_or(default)
        .to_string()
}

/// Accept a non-empty ASCII alphanumeric string.
#[must_use]
pub fn alnum_or_default(raw: Option<&str>, default: &str) -> String {
    raw.filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric()))
        .unwrap_or(default)
        .to_string()
}

/// Pass through any non-empty string.
#[must_use]
pub fn text_or_default(raw: Option<&str>, default: &str) -> String {
    raw.filter(|s| !s.is_empty()).unwrap_or(default).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const D: i64 = 42;

    #[test]
    fn test_bool_is_case_insensitive() {
        assert!(bool_or_default(Some("true"), false));
        assert!(bool_or_default(Some("TRUE"), false));
        assert!(!bool_or_default(Some("False"), true));
    }

    #[test]
    fn test_bool_rejects_other_encodings() {
        for raw in ["1", "0", "yes", "", " true"] {
            assert!(bool_or_default(Some(raw), true), "{raw:?} should fall back");
            assert!(!bool_or_default(Some(raw), false), "{raw:?} should fall back");
        }
        assert!(bool_or_default(None, true));
    }

    #[test]
    fn test_int_range_boundaries() {
        assert_eq!(int_in_range_or_default(Some("200000"), 1, 200_000, D), 200_000);
        assert_eq!(int_in_range_or_default(Some("1"), 1, 200_000, D), 1);
        assert_eq!(int_in_range_or_default(Some("200001"), 1, 200_000, D), D);
        assert_eq!(int_in_range_or_default(Some("0"), 1, 200_000, D), D);
    }

    #[test]
    fn test_int_rejects_non_integers() {
        for raw in ["", "abc", "1.5", "1e3", " 10", "99999999999999999999"] {
            assert_eq!(int_in_range_or_default(Some(raw), 1, 200_000, D), D, "{raw:?}");
        }
        assert_eq!(int_in_range_or_default(None, 1, 200_000, D), D);
    }

    #[test]
    fn test_enum_membership() {
        let allowed = ["sound", "none"];
        assert_eq!(enum_or_default(Some("none"), &allowed, "sound"), "none");
        assert_eq!(enum_or_default(Some("NONE"), &allowed, "sound"), "sound");
        assert_eq!(enum_or_default(Some("visual"), &allowed, "sound"), "sound");
        assert_eq!(enum_or_default(None, &allowed, "sound"), "sound");
    }

    #[test]
    fn test_term_name_accepts_common_names() {
        for name in ["xterm-256color", "xterm", "vt100", "screen~x", "a"] {
            assert_eq!(term_name_or_default(Some(name), "D"), name);
        }
    }

    #[test]
    fn test_term_name_rejects_injection() {
        for name in ["; rm -rf", "xterm\n", "xterm$(id)", "x y", "xterm-", "", "\u{1b}[0m"] {
            assert_eq!(term_name_or_default(Some(name), "D"), "D", "{name:?}");
        }
    }

    #[test]
    fn test_term_name_trailing_char_is_ascii_word() {
        assert_eq!(term_name_or_default(Some("xtermé"), "D"), "D");
        assert_eq!(term_name_or_default(Some("xterm_"), "D"), "xterm_");
    }

    #[test]
    fn test_alnum() {
        assert_eq!(alnum_or_default(Some("abc123XYZ"), "none"), "abc123XYZ");
        assert_eq!(alnum_or_default(Some("abc-123"), "none"), "none");
        assert_eq!(alnum_or_default(Some(""), "none"), "none");
        assert_eq!(alnum_or_default(None, "none"), "none");
    }

    #[test]
    fn test_text_passes_through_non_empty() {
        assert_eq!(text_or_default(Some("<b>hi</b>"), "d"), "<b>hi</b>");
        assert_eq!(text_or_default(Some(""), "d"), "d");
    }
}
