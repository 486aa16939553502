//! Session log persistence.
//!
//! A recorded session is a JSONL file, one event per line:
//!
//! ```jsonl
//! { "type": "meta", "schema_version": 1, "ts": "2026-01-01T00:00:00Z" }
//! { "type": "eval", "input": "x = 1 + 2\n", "output": "3", "ts": "..." }
//! { "type": "eval", "input": "puts x;\n", "output": null, "ts": "..." }
//! ```
//!
//! Every `eval` adds one slot to both rings so that input `n` and output `n`
//! always describe the same evaluation.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::Ring;

/// Current schema version for new session logs.
pub const SCHEMA_VERSION: u32 = 1;

/// A session log event (tag-based).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// First line of a log file.
    Meta { schema_version: u32, ts: String },

    /// One evaluated expression and its result, if any was recorded.
    Eval {
        input: String,
        #[serde(default)]
        output: Option<Value>,
        ts: String,
    },
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Input and output rings rebuilt from a session log.
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    pub inputs: Ring<String>,
    pub outputs: Ring<Value>,
}

impl SessionHistory {
    /// Empty history keeping at most `capacity` evaluations (zero = unbounded).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inputs: Ring::with_capacity(capacity),
            outputs: Ring::with_capacity(capacity),
        }
    }

    /// Records one evaluation in both rings.
    pub fn record(&mut self, input: String, output: Option<Value>) {
        self.inputs.push(input);
        match output {
            Some(value) => self.outputs.push(value),
            None => self.outputs.push_absent(),
        }
    }
}

/// A session log file on disk.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the log into rings of the given capacity.
    ///
    /// A missing file is an empty session.
    pub fn load(&self, capacity: usize) -> Result<SessionHistory> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "session log missing, starting empty");
            return Ok(SessionHistory::with_capacity(capacity));
        }

        let file = fs::File::open(&self.path)
            .with_context(|| format!("Failed to open session log {}", self.path.display()))?;
        Self::parse(BufReader::new(file), capacity)
            .with_context(|| format!("Failed to load session log {}", self.path.display()))
    }

    /// Parses JSONL events from a reader.
    pub fn parse(reader: impl BufRead, capacity: usize) -> Result<SessionHistory> {
        let mut history = SessionHistory::with_capacity(capacity);

        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line.with_context(|| format!("read line {line_no}"))?;
            if line.trim().is_empty() {
                continue;
            }

            let event: SessionEvent = serde_json::from_str(&line)
                .with_context(|| format!("invalid event on line {line_no}"))?;
            match event {
                SessionEvent::Meta { schema_version, .. } => {
                    if schema_version > SCHEMA_VERSION {
                        bail!(
                            "unsupported schema version {schema_version} on line {line_no} \
                             (newest supported: {SCHEMA_VERSION})"
                        );
                    }
                }
                SessionEvent::Eval { input, output, .. } => history.record(input, output),
            }
        }

        Ok(history)
    }

    /// Appends one evaluation, writing the meta line first for a new file.
    pub fn append(&self, input: &str, output: Option<Value>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let is_new = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;

        let mut lines = String::new();
        if is_new {
            let meta = SessionEvent::Meta {
                schema_version: SCHEMA_VERSION,
                ts: now_rfc3339(),
            };
            lines.push_str(&serde_json::to_string(&meta)?);
            lines.push('\n');
        }
        let eval = SessionEvent::Eval {
            input: input.to_string(),
            output,
            ts: now_rfc3339(),
        };
        lines.push_str(&serde_json::to_string(&eval)?);
        lines.push('\n');

        file.write_all(lines.as_bytes())
            .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        Ok(())
    }
}
