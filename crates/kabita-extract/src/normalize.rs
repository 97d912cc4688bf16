use unicode_normalization::UnicodeNormalization;

/// Punctuation the archive runs together with adjacent glyphs.
///
/// `।` is the dari, the Bengali full stop.
pub const SPACED_PUNCTUATION: [char; 5] = ['।', '?', '!', ',', '—'];

/// Normalize one extracted text fragment.
///
/// Composes to NFC (the archive serves some vowel signs decomposed), puts a
/// single space on each side of [`SPACED_PUNCTUATION`], then collapses space
/// runs and trims. Applying it twice gives the same result as applying it once.
pub fn normalize_text(input: &str) -> String {
    let nfc: String = input.nfc().collect();

    let mut spaced = String::with_capacity(nfc.len() + 8);
    for c in nfc.chars() {
        if SPACED_PUNCTUATION.contains(&c) {
            spaced.push(' ');
            spaced.push(c);
            spaced.push(' ');
        } else {
            spaced.push(c);
        }
    }

    collapse_spaces(&spaced).trim().to_string()
}

/// Collapse runs of ASCII spaces into one. Other whitespace is left alone.
pub fn collapse_spaces(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut prev_space = false;

    for c in input.chars() {
        if c == ' ' {
            if prev_space {
                continue;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
        result.push(c);
    }

    result
}

/// Collapse every whitespace run, newlines included, into a single space and trim.
///
/// Markup nesting leaves newlines and indentation inside a line's text nodes.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_nfc() {
        // o-kar written as e-kar + aa-kar composes to U+09CB
        let decomposed = "ক\u{09C7}\u{09BE}";
        assert_eq!(normalize_text(decomposed), "ক\u{09CB}");

        let latin = "e\u{0301}";
        assert_eq!(normalize_text(latin), "é");
    }

    #[test]
    fn test_punctuation_spacing() {
        assert_eq!(normalize_text("আমি।তুমি"), "আমি । তুমি");
        assert_eq!(normalize_text("কে?কোথা!"), "কে ? কোথা !");
        assert_eq!(normalize_text("এক,দুই—তিন"), "এক , দুই — তিন");
    }

    #[test]
    fn test_collapse_and_trim() {
        assert_eq!(normalize_text("  বল   বীর  "), "বল বীর");
        assert_eq!(normalize_text("বীর ,  "), "বীর ,");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        let inputs = [
            "বল বীর—বল উন্নত মম শির!",
            "  ,leading comma",
            "trailing।",
            "a\u{0301}?!,—।b",
            "tab\tinside  and   spaces",
            "",
        ];
        for input in inputs {
            let once = normalize_text(input);
            let twice = normalize_text(&once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_collapse_spaces_keeps_tabs() {
        assert_eq!(collapse_spaces("a  \t  b"), "a \t b");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("\n   বল\n      বীর  \n"), "বল বীর");
    }
}
