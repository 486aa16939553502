//! Code collection from files and stdin.
//!
//! Collected code is exported as is; `--lines` narrows it to a one-based
//! line range using the same range rules as history selection.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::range::RangeSpec;

/// Text gathered for export together with the filename it should carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedCode {
    pub text: String,
    pub filename: Option<String>,
}

/// Reads a file, optionally restricted to a one-based line range.
///
/// The suggested filename is the file's base name.
pub fn collect_file(path: &Path, lines: Option<RangeSpec>) -> Result<CollectedCode> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());

    Ok(CollectedCode {
        text: restrict(text, lines),
        filename,
    })
}

/// Reads everything from `reader` (usually stdin); no filename is suggested.
pub fn collect_reader(mut reader: impl Read, lines: Option<RangeSpec>) -> Result<CollectedCode> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .context("Failed to read input")?;

    Ok(CollectedCode {
        text: restrict(text, lines),
        filename: None,
    })
}

fn restrict(text: String, lines: Option<RangeSpec>) -> String {
    match lines {
        Some(spec) => restrict_to_lines(&text, spec),
        None => text,
    }
}

/// Keeps the lines selected by a one-based range, line endings included.
pub fn restrict_to_lines(text: &str, lines: RangeSpec) -> String {
    let all: Vec<&str> = text.split_inclusive('\n').collect();
    let range = lines.to_zero_based().resolve(all.len());
    range.indices().map(|index| all[index]).collect()
}
