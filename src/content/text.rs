//! Page text normalization
//!
//! Cleans raw PDF text into a single line of retrieval-friendly text.

/// Punctuation kept verbatim in normalized text
const ALLOWED_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '(', ')', '-', '\'', '"'];

/// Normalize raw page text.
///
/// Curly quotes become their ASCII equivalents, characters outside word
/// characters and [`ALLOWED_PUNCTUATION`] are treated as whitespace, and
/// every whitespace run collapses to a single space. The result is trimmed.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for c in raw.chars().map(straighten_quote) {
        if is_kept(c) {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }

    out
}

/// Map typographic quotes to ASCII
fn straighten_quote(c: char) -> char {
    match c {
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
        other => other,
    }
}

/// Word characters and allowed punctuation survive normalization
fn is_kept(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || ALLOWED_PUNCTUATION.contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(
            normalize_text("  Line 1 \n\n\t Line 2\r\n  Line 3  "),
            "Line 1 Line 2 Line 3"
        );
    }

    #[test]
    fn test_strips_disallowed_characters() {
        assert_eq!(
            normalize_text("Price: $40 • 50% off © 2024 [draft]"),
            "Price: 40 50 off 2024 draft"
        );
    }

    #[test]
    fn test_keeps_allowed_punctuation() {
        let text = "Wait, what? Yes! (see: item-3); it's \"fine\".";
        assert_eq!(normalize_text(text), text);
    }

    #[test]
    fn test_straightens_smart_quotes() {
        assert_eq!(
            normalize_text("\u{201C}Quoted\u{201D} and \u{2018}single\u{2019}"),
            "\"Quoted\" and 'single'"
        );
    }

    #[test]
    fn test_keeps_unicode_word_characters() {
        assert_eq!(normalize_text("Größe naïve_case 東京"), "Größe naïve_case 東京");
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert_eq!(normalize_text(" \n\t \u{2022} "), "");
        assert_eq!(normalize_text(""), "");
    }
}
