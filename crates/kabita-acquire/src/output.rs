use anyhow::{Context, Result};
use kabita_model::PoemRecord;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Write every poem to a plain text file, one after another, newline-separated.
pub fn write_text(records: &[PoemRecord], path: &Path) -> Result<()> {
    ensure_parent(path)?;

    let mut text = String::new();
    for record in records {
        text.push_str(&record.content);
        text.push('\n');
    }

    fs::write(path, &text).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), poems = records.len(), "Wrote poem text");
    Ok(())
}

/// Append one poem to a plain text file, creating it if needed.
pub fn append_text(record: &PoemRecord, path: &Path) -> Result<()> {
    ensure_parent(path)?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    writeln!(file, "{}", record.content)?;

    tracing::debug!(path = %path.display(), titleid = record.titleid, pageno = record.pageno, "Appended poem text");
    Ok(())
}

/// Write every record to a JSON array file.
pub fn write_json(records: &[PoemRecord], path: &Path) -> Result<()> {
    ensure_parent(path)?;

    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, &json).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), poems = records.len(), "Wrote poem JSON");
    Ok(())
}

/// Append one record to a JSON array file.
///
/// An unreadable or corrupt file is logged and replaced by an array holding
/// only the new record, so one bad file doesn't stop a long scrape.
pub fn append_json(record: &PoemRecord, path: &Path) -> Result<()> {
    let mut records = if path.exists() {
        match read_records(path) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Corrupt poem JSON, reinitializing");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    records.push(record.clone());

    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(&records)?;
    fs::write(path, &json).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), poems = records.len(), "Appended poem JSON");
    Ok(())
}

/// Read a JSON array of records. An empty file reads as no records.
pub fn read_records(path: &Path) -> Result<Vec<PoemRecord>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
    }
    Ok(())
}
