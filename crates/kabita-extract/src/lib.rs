pub use kabita_model::PageStructure;
use scraper::Html;

pub mod column;
pub mod gap;
pub mod markers;
pub mod normalize;
pub mod structure;
pub mod text;

/// Returned in place of a poem when the page matches neither layout.
pub const NO_STRUCTURE: &str = "No recognized poem structure found";

/// Extracted poem lines in source order. Empty strings are stanza breaks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoemText {
    lines: Vec<String>,
}

impl PoemText {
    pub fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True when no line has any visible text.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    /// Join the lines with `\n`.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

impl From<Vec<String>> for PoemText {
    fn from(lines: Vec<String>) -> Self {
        Self { lines }
    }
}

/// Outcome of extracting one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Poem {
        structure: PageStructure,
        text: PoemText,
    },
    /// Neither layout was found. Callers treat this as an empty poem.
    Unrecognized,
}

impl Extraction {
    pub fn structure(&self) -> PageStructure {
        match self {
            Extraction::Poem { structure, .. } => *structure,
            Extraction::Unrecognized => PageStructure::Unrecognized,
        }
    }

    /// The plain poem text, or [`NO_STRUCTURE`] for an unrecognized page.
    pub fn content(&self) -> String {
        match self {
            Extraction::Poem { text, .. } => text.to_text(),
            Extraction::Unrecognized => NO_STRUCTURE.to_string(),
        }
    }

    /// The annotated poem, or `None` when there is nothing to keep.
    pub fn annotated(&self) -> Option<String> {
        match self {
            Extraction::Poem { text, .. } if !text.is_blank() => {
                Some(markers::annotate(&text.to_text()))
            }
            _ => None,
        }
    }
}

/// Parse a fetched page.
pub fn parse_page(html: &str) -> Html {
    Html::parse_document(html)
}

/// Detect the page layout and extract its poem.
pub fn extract(document: &Html) -> Extraction {
    let structure = structure::detect(document);

    let text = match structure {
        PageStructure::ColumnIndented => column::extract(document),
        PageStructure::TwoColumn => gap::extract(document),
        PageStructure::Unrecognized => {
            tracing::debug!("No recognized poem structure");
            return Extraction::Unrecognized;
        }
    };

    tracing::debug!(structure = %structure, lines = text.len(), "Extracted poem text");
    Extraction::Poem { structure, text }
}

/// Extract the plain poem text, or [`NO_STRUCTURE`].
pub fn extract_poem_content(document: &Html) -> String {
    extract(document).content()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KABITA_PAGE: &str = r#"
    <html><head><title>নজরুল রচনাবলী</title></head><body>
    <form name="pageno"><a href="page1.php?pageno=1&titleid=4">1</a></form>
    <div id="data">
        <p class="title">বিদ্রোহী</p>
        <p class="kabita">বল বীর—</p>
        <p class="kabita1">বল উন্নত মম শির!</p>
        <p class="space"></p>
        <p class="space"></p>
        <p class="space"></p>
        <p class="kabita11">শির নেহারি’ আমারি নত-শির ওই শিখর হিমাদ্রির!</p>
    </div>
    </body></html>
    "#;

    #[test]
    fn test_extract_column_page() {
        let extraction = extract(&parse_page(KABITA_PAGE));
        assert_eq!(extraction.structure(), PageStructure::ColumnIndented);
        assert_eq!(
            extraction.content(),
            "    বল বীর —\n    বল উন্নত মম শির !\n\n\n\n      শির নেহারি’ আমারি নত-শির ওই শিখর হিমাদ্রির !"
        );
    }

    #[test]
    fn test_annotated_column_page() {
        let annotated = extract(&parse_page(KABITA_PAGE)).annotated().unwrap();
        assert_eq!(
            annotated,
            "<start_poem>\n    বল বীর —<line>\n    বল উন্নত মম শির !<line>\n<stanza>\n      শির নেহারি’ আমারি নত-শির ওই শিখর হিমাদ্রির !<line>\n<stanza>\n<end_poem>"
        );
    }

    #[test]
    fn test_extract_gap_page() {
        let html = r#"
        <div id="data">
            <p class="kabita">stray</p>
            <div class="gapkabita">
                <span class="gapkabita_left">কারার ঐ</span>
                <span class="gapkabita_right">লৌহ-কপাট</span>
            </div>
        </div>
        "#;
        let extraction = extract(&parse_page(html));
        assert_eq!(extraction.structure(), PageStructure::TwoColumn);
        let expected = format!("{}কারার ঐ লৌহ-কপাট", " ".repeat(gap::LEFT_COLUMN_WIDTH - 7));
        assert_eq!(extraction.content(), expected);
    }

    #[test]
    fn test_unrecognized_page() {
        let document = parse_page("<html><body><p>সূচিপত্র</p></body></html>");
        let extraction = extract(&document);
        assert_eq!(extraction, Extraction::Unrecognized);
        assert_eq!(extraction.annotated(), None);
        assert_eq!(extract_poem_content(&document), NO_STRUCTURE);
    }

    #[test]
    fn test_blank_poem_not_annotated() {
        let document = parse_page(r#"<div id="data"><p class="kabita"> </p><p class="space"></p></div>"#);
        let extraction = extract(&document);
        assert_eq!(extraction.structure(), PageStructure::ColumnIndented);
        assert_eq!(extraction.annotated(), None);
    }

    #[test]
    fn test_poem_text_helpers() {
        let text = PoemText::from(vec!["a".to_string(), String::new(), "b".to_string()]);
        assert_eq!(text.len(), 3);
        assert!(!text.is_blank());
        assert_eq!(text.to_text(), "a\n\nb");
        assert!(PoemText::default().is_blank());
    }
}
