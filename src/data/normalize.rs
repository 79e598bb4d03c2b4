//! Text and Value Normalization Module
//! Removes case and punctuation variance from free-text and monetary cells.

/// Characters that survive normalization: ASCII letters, digits and whitespace.
fn is_kept(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace()
}

/// Remove every character that is not an ASCII letter, digit or whitespace.
fn strip_punctuation(s: &str) -> String {
    s.chars().filter(|&c| is_kept(c)).collect()
}

/// Lowercase `s` and delete everything except ASCII letters, digits and whitespace.
///
/// Deleted spans are not replaced, so `"rock-n-roll"` becomes `"rocknroll"`.
pub fn normalize_text(s: &str) -> String {
    strip_punctuation(&s.to_lowercase())
}

/// Parse a raw value cell such as `"$1,000"` into an integer amount.
///
/// Returns `None` when nothing numeric is left after stripping formatting,
/// e.g. for `"None"`, an empty cell or a value too large for `u64`.
pub fn parse_value(raw: &str) -> Option<u64> {
    strip_punctuation(raw).trim().parse().ok()
}

/// Clean value of a raw cell; unparsable cells count as 0.
pub fn normalize_value(raw: &str) -> u64 {
    parse_value(raw).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_text_lowercases_and_strips() {
        assert_eq!(normalize_text("Hello, World!"), "hello world");
        assert_eq!(normalize_text("Rock-n-Roll"), "rocknroll");
        assert_eq!(normalize_text("It's 1984"), "its 1984");
        assert_eq!(normalize_text("<a href=\"x\">Café</a>"), "a hrefxcafa");
    }

    #[test]
    fn normalize_text_empty() {
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn normalize_text_keeps_whitespace_runs() {
        assert_eq!(normalize_text("a  -  b\tc"), "a    b\tc");
    }

    #[test]
    fn normalize_value_examples() {
        assert_eq!(normalize_value("$1,000"), 1000);
        assert_eq!(normalize_value("$200"), 200);
        assert_eq!(normalize_value("no value"), 0);
        assert_eq!(normalize_value("None"), 0);
        assert_eq!(normalize_value(""), 0);
    }

    #[test]
    fn parse_value_reports_failure() {
        assert_eq!(parse_value("$2,000"), Some(2000));
        assert_eq!(parse_value(" $400 "), Some(400));
        assert_eq!(parse_value("None"), None);
        assert_eq!(parse_value("$1 000"), None);
        assert_eq!(parse_value("99999999999999999999999"), None);
    }

    #[test]
    fn negative_sign_is_stripped() {
        assert_eq!(normalize_value("-$500"), 500);
    }

    proptest! {
        #[test]
        fn normalized_text_has_only_allowed_chars(s in any::<String>()) {
            let out = normalize_text(&s);
            prop_assert!(out
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace()));
        }

        #[test]
        fn normalize_text_is_idempotent(s in any::<String>()) {
            let once = normalize_text(&s);
            prop_assert_eq!(normalize_text(&once), once);
        }

        #[test]
        fn formatted_amounts_round_trip(n in 0u64..10_000_000) {
            let formatted = format!("${}", n);
            prop_assert_eq!(normalize_value(&formatted), n);
        }
    }
}
