// Layout detection.
//
// The archive encodes poems one of two ways. Two-column pages can also carry
// stray `kabita` paragraphs, so the gap container is checked first.

use kabita_model::PageStructure;
use scraper::{Html, Selector};

use crate::column;
use crate::gap;

/// Decide which layout encoding the page uses.
pub fn detect(document: &Html) -> PageStructure {
    let gap_sel = Selector::parse(gap::CONTAINER_SELECTOR).expect("valid selector");
    if document.select(&gap_sel).next().is_some() {
        return PageStructure::TwoColumn;
    }

    let p_sel = Selector::parse("p[class]").expect("valid selector");
    let has_kabita = document.select(&p_sel).any(|p| {
        p.value()
            .attr("class")
            .is_some_and(|class| column::line_digits(class).is_some())
    });
    if has_kabita {
        return PageStructure::ColumnIndented;
    }

    PageStructure::Unrecognized
}
