use serde::{Deserialize, Serialize};
use std::fmt;

/// Which layout encoding a poem page uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageStructure {
    /// Lines are `<p class="kabitaNN">`, the digit suffix encoding indentation.
    ColumnIndented,
    /// Lines are `div.gapkabita` blocks with a left and a right column.
    TwoColumn,
    /// Neither encoding was found on the page.
    Unrecognized,
}

impl fmt::Display for PageStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageStructure::ColumnIndented => "column-indented",
            PageStructure::TwoColumn => "two-column",
            PageStructure::Unrecognized => "unrecognized",
        };
        f.write_str(name)
    }
}

/// One scraped poem page, as written to the structured sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoemRecord {
    /// Collection identifier (the site's `titleid` query parameter).
    pub titleid: u32,
    pub pageno: u32,
    pub url: String,
    /// The annotated poem text.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<PageStructure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
}

impl PoemRecord {
    pub fn new(titleid: u32, pageno: u32, url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            titleid,
            pageno,
            url: url.into(),
            content: content.into(),
            structure: None,
            fetched_at: None,
        }
    }

    /// Attach the detected layout and stamp the record with the current time.
    pub fn with_provenance(mut self, structure: PageStructure) -> Self {
        self.structure = Some(structure);
        self.fetched_at = Some(chrono::Utc::now().to_rfc3339());
        self
    }
}
