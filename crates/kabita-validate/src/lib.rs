use anyhow::{Context, Result};
use kabita_extract::markers::{END_POEM, LINE, STANZA, START_POEM};
use kabita_extract::NO_STRUCTURE;
use kabita_model::PoemRecord;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("duplicate page: titleid {titleid}, pageno {pageno}")]
    DuplicatePage { titleid: u32, pageno: u32 },

    #[error("titleid {0}, pageno {1}: content is not wrapped in <start_poem> ... <end_poem>")]
    MissingFrame(u32, u32),

    #[error("titleid {0}, pageno {1}: line without a <line> marker: {2:?}")]
    UnmarkedLine(u32, u32, String),

    #[error("titleid {0}, pageno {1}: bracketed aside survived annotation")]
    LeftoverBracket(u32, u32),

    #[error("titleid {0}, pageno {1}: page had no recognized poem structure")]
    NoStructure(u32, u32),
}

/// Validate a JSON file of poem records.
pub fn validate(file_path: &str) -> Result<()> {
    let contents = std::fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read {file_path}"))?;
    let records: Vec<PoemRecord> = serde_json::from_str(&contents)
        .with_context(|| format!("{file_path} is not a poem record array"))?;

    let errors = validate_records(&records);
    if !errors.is_empty() {
        for e in &errors {
            tracing::error!("{e}");
        }
        anyhow::bail!("{} validation errors in {file_path}", errors.len());
    }

    tracing::info!(records = records.len(), "Poem records are valid");
    Ok(())
}

/// Check every record and the collection as a whole.
pub fn validate_records(records: &[PoemRecord]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for record in records {
        if record.url.is_empty() {
            errors.push(ValidationError::MissingField(format!(
                "url (titleid {}, pageno {})",
                record.titleid, record.pageno
            )));
        }
        if !seen.insert((record.titleid, record.pageno)) {
            errors.push(ValidationError::DuplicatePage {
                titleid: record.titleid,
                pageno: record.pageno,
            });
        }
        errors.extend(validate_content(record.titleid, record.pageno, &record.content));
    }

    for e in &errors {
        tracing::warn!("{e}");
    }

    errors
}

/// Check that one annotated poem is well formed.
pub fn validate_content(titleid: u32, pageno: u32, content: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if content == NO_STRUCTURE {
        errors.push(ValidationError::NoStructure(titleid, pageno));
        return errors;
    }

    let head = format!("{START_POEM}\n");
    let tail = format!("\n{STANZA}\n{END_POEM}");
    let body = content
        .strip_prefix(head.as_str())
        .and_then(|rest| rest.strip_suffix(tail.as_str()));

    // The bare frame has its stanza marker directly after the start marker.
    let body = match body {
        Some(body) => body,
        None if content == format!("{START_POEM}\n{STANZA}\n{END_POEM}") => "",
        None => {
            errors.push(ValidationError::MissingFrame(titleid, pageno));
            return errors;
        }
    };

    if body.contains('[') || body.contains(']') {
        errors.push(ValidationError::LeftoverBracket(titleid, pageno));
    }

    for line in body.lines() {
        if line == STANZA {
            continue;
        }
        if !line.ends_with(LINE) || line.trim() == LINE {
            errors.push(ValidationError::UnmarkedLine(titleid, pageno, line.to_string()));
        }
    }

    errors
}
