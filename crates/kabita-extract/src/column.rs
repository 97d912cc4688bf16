// Column-indented ("traditional") poems.
//
// Each line is a `<p>` whose class is `kabita` plus an optional digit run.
// The digits encode indentation depth; `space` marks an intentional blank line.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

use crate::normalize::{collapse_whitespace, normalize_text};
use crate::text::collect_text_excluding;
use crate::PoemText;

/// Class prefix shared by every poem line.
pub const BASE_CLASS: &str = "kabita";

/// Class of the empty paragraph the archive uses between stanzas.
pub const BLANK_CLASS: &str = "space";

/// Inline elements whose whole subtree is dropped from a line.
///
/// The archive renders footnotes and glosses as `<span>` tooltips inside the
/// line paragraph.
pub const ANNOTATION_TAGS: &[&str] = &["span", "sup", "script", "style"];

/// Indentation for a bare `kabita` line.
const BASE_INDENT: usize = 4;

static LINE_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^kabita([0-9]*)$").expect("valid regex"));

/// Return the digit suffix of a poem-line class, or `None` if the class is
/// not a poem line. `"kabita"` gives `Some("")`.
pub fn line_digits(class: &str) -> Option<&str> {
    LINE_CLASS
        .captures(class)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Leading spaces for a line with the given class.
///
/// - `kabita` → 4
/// - `kabita` + D → `4 * max(D) + 2 * (len(D) - 1)`
/// - anything else → none
///
/// The digit value and the run length both deepen the indent: `kabita11`
/// sits deeper than `kabita1` but shallower than `kabita2`.
pub fn indentation(class: &str) -> String {
    let Some(digits) = line_digits(class) else {
        return String::new();
    };

    if digits.is_empty() {
        return " ".repeat(BASE_INDENT);
    }

    let max_digit = digits.chars().filter_map(|c| c.to_digit(10)).max().unwrap_or(0) as usize;
    let base_spacing = 4 * max_digit;
    let length_bonus = 2 * (digits.len() - 1);
    " ".repeat(base_spacing + length_bonus)
}

/// Extract the poem from a column-indented page.
///
/// Lines are read from `#data p`, or from every `<p>` if the page has no
/// `#data` container. Paragraphs that are neither poem lines nor blank markers
/// are skipped, as are lines with no text left after normalization.
pub fn extract(document: &Html) -> PoemText {
    let scoped_sel = Selector::parse("#data p").expect("valid selector");
    let p_sel = Selector::parse("p").expect("valid selector");

    let mut candidates: Vec<_> = document.select(&scoped_sel).collect();
    if candidates.is_empty() {
        candidates = document.select(&p_sel).collect();
    }

    let mut poem = PoemText::default();

    for (index, p) in candidates.into_iter().enumerate() {
        let class = p.value().attr("class").unwrap_or("");

        if class == BLANK_CLASS {
            poem.push(String::new());
            continue;
        }

        if line_digits(class).is_none() {
            tracing::debug!(index, class, "Skipping non-poem paragraph");
            continue;
        }

        let raw = collect_text_excluding(p, ANNOTATION_TAGS);
        let text = normalize_text(&collapse_whitespace(&raw));
        if text.is_empty() {
            tracing::debug!(index, class, "Skipping empty poem line");
            continue;
        }

        poem.push(format!("{}{text}", indentation(class)));
    }

    poem
}
