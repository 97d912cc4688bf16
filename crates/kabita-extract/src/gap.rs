// Two-column ("gap") poems.
//
// Each line is a `div.gapkabita` holding a left and a right cell. The left cell
// is right-justified into a fixed-width column so the right cells line up.

use scraper::{Html, Selector};

use crate::normalize::normalize_text;
use crate::text::own_text;
use crate::PoemText;

pub const CONTAINER_SELECTOR: &str = "div.gapkabita";
const LEFT_SELECTOR: &str = ".gapkabita_left";
const RIGHT_SELECTOR: &str = ".gapkabita_right";

/// Width, in chars, the left cell is right-justified to.
pub const LEFT_COLUMN_WIDTH: usize = 20;

/// Extract the poem from a two-column page.
///
/// A pair missing either cell is read with that cell empty; a pair with both
/// cells empty produces no line.
pub fn extract(document: &Html) -> PoemText {
    let pair_sel = Selector::parse(CONTAINER_SELECTOR).expect("valid selector");
    let left_sel = Selector::parse(LEFT_SELECTOR).expect("valid selector");
    let right_sel = Selector::parse(RIGHT_SELECTOR).expect("valid selector");

    let mut poem = PoemText::default();

    for (index, pair) in document.select(&pair_sel).enumerate() {
        let left = pair.select(&left_sel).next().map(own_text).unwrap_or_default();
        let right = pair.select(&right_sel).next().map(own_text).unwrap_or_default();

        match assemble_line(&left, &right) {
            Some(line) => poem.push(line),
            None => {
                tracing::debug!(index, "Skipping empty gap pair");
            }
        }
    }

    poem
}

/// Join a left and right cell into one aligned line.
///
/// Returns `None` when both cells are empty after cleaning.
pub fn assemble_line(left: &str, right: &str) -> Option<String> {
    let left = normalize_text(&clean_cell(left));
    let right = normalize_text(&clean_cell(right));

    if left.is_empty() && right.is_empty() {
        return None;
    }

    let line = format!("{left:>width$} {right}", width = LEFT_COLUMN_WIDTH);
    Some(line.trim_end().to_string())
}

fn clean_cell(text: &str) -> String {
    text.trim().replace('\u{a0}', "")
}
