//! Human-readable rendering of a document difference.

use colored::Colorize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::sync::types::DiffEntry;

/// Render a value as compact JSON for display.
///
/// # Errors
///
/// Returns `Error::Render` if the value cannot be serialized.
pub fn render_value(value: &Value) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Render(e.to_string()))
}

/// Render a single entry as one line: `+` added, `-` deleted, `~` changed.
///
/// # Errors
///
/// Returns `Error::Render` if a value cannot be serialized.
pub fn render_entry(entry: &DiffEntry) -> Result<String> {
    let line = match entry {
        DiffEntry::Added { key, value } => {
            format!("+ {key}: {}", render_value(value)?).green().to_string()
        }
        DiffEntry::Deleted { key, value } => {
            format!("- {key}: {}", render_value(value)?).red().to_string()
        }
        DiffEntry::Changed { key, old, new } => format!(
            "~ {key}: {} -> {}",
            render_value(old)?,
            render_value(new)?
        )
        .yellow()
        .to_string(),
    };
    Ok(line)
}

/// Render the whole difference under a title line.
///
/// # Errors
///
/// Returns `Error::Render` if any value cannot be serialized; nothing is
/// partially rendered in that case.
pub fn render_diff(title: &str, entries: &[DiffEntry]) -> Result<String> {
    let mut out = format!("{}\n", title.bold());
    for entry in entries {
        out.push_str("  ");
        out.push_str(&render_entry(entry)?);
        out.push('\n');
    }

    let (added, deleted, changed) = count(entries);
    out.push_str(&format!(
        "\n  {added} added, {deleted} deleted, {changed} changed\n"
    ));
    Ok(out)
}

fn count(entries: &[DiffEntry]) -> (usize, usize, usize) {
    entries
        .iter()
        .fold((0, 0, 0), |(a, d, c), entry| match entry {
            DiffEntry::Added { .. } => (a + 1, d, c),
            DiffEntry::Deleted { .. } => (a, d + 1, c),
            DiffEntry::Changed { .. } => (a, d, c + 1),
        })
}
