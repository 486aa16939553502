//! History command handlers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{ContentArrangement, Table};
use histpaste_core::config::Config;
use histpaste_core::history::{HistoryRing, Inspect, SessionHistory, SessionLog};
use histpaste_core::range::RangeSpec;
use serde_json::Value;

fn session_path(session: Option<&Path>, config: &Config) -> PathBuf {
    session.map_or_else(|| config.session_log_path(), Path::to_path_buf)
}

pub fn show(range: RangeSpec, session: Option<&Path>, config: &Config) -> Result<()> {
    let log = SessionLog::new(session_path(session, config));
    let history = log
        .load(config.history_size)
        .context("load session history")?;

    match render_table(&history, range) {
        Some(table) => println!("{table}"),
        None => println!("No history in range {range}."),
    }
    Ok(())
}

/// Table of index, input and result for the entries `range` selects.
fn render_table(history: &SessionHistory, range: RangeSpec) -> Option<Table> {
    let resolved = range.resolve(history.inputs.len());

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "input", "output"]);

    let mut rows = 0;
    for index in resolved.indices() {
        let Some(input) = history.inputs.entry_at(index) else {
            continue;
        };
        let output = history
            .outputs
            .entry_at(index)
            .map(Inspect::inspect)
            .unwrap_or_default();
        table.add_row(vec![index.to_string(), input.trim_end().to_string(), output]);
        rows += 1;
    }

    (rows > 0).then_some(table)
}

pub fn record(
    input: &str,
    output: Option<&str>,
    session: Option<&Path>,
    config: &Config,
) -> Result<()> {
    let log = SessionLog::new(session_path(session, config));
    log.append(input, output.map(parse_output))
        .context("record evaluation")?;
    println!("✓ Recorded evaluation in {}", log.path().display());
    Ok(())
}

/// Results are JSON when they parse as JSON, plain strings otherwise.
fn parse_output(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
