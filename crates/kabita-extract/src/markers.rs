// Poem boundary markers.
//
// Wraps plain poem text in start/end markers, tags every line, and puts a
// stanza marker between stanzas and once more before the end.

use regex::Regex;
use std::sync::LazyLock;

pub const START_POEM: &str = "<start_poem>";
pub const LINE: &str = "<line>";
pub const STANZA: &str = "<stanza>";
pub const END_POEM: &str = "<end_poem>";

/// `[ ... ]` asides, non-greedy, allowed to span lines.
static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*?\]").expect("valid regex"));

static STANZA_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Annotate a poem with line and stanza markers.
///
/// Blank input comes back unchanged. Bracketed asides are deleted first; a
/// poem that is nothing but asides yields the bare frame.
pub fn annotate(poem: &str) -> String {
    if poem.trim().is_empty() {
        return poem.to_string();
    }

    let stripped = BRACKETED.replace_all(poem, "");
    let stripped = stripped.trim_end();
    if stripped.is_empty() {
        return empty_frame();
    }

    let collapsed = STANZA_GAP.replace_all(stripped, "\n\n");

    let stanzas: Vec<String> = collapsed
        .split("\n\n")
        .filter(|group| !group.trim().is_empty())
        .map(mark_lines)
        .collect();

    if stanzas.is_empty() {
        return empty_frame();
    }

    let separator = format!("\n{STANZA}\n");
    format!(
        "{START_POEM}\n{}\n{STANZA}\n{END_POEM}",
        stanzas.join(separator.as_str())
    )
}

fn mark_lines(stanza: &str) -> String {
    stanza
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("{line}{LINE}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn empty_frame() -> String {
    format!("{START_POEM}\n{STANZA}\n{END_POEM}")
}
