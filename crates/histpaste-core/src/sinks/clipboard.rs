//! Clipboard access.
//!
//! Two transports:
//! 1. System clipboard via the `arboard` crate
//! 2. OSC 52 - terminal clipboard escape sequence (works over SSH)
//!
//! `auto` prefers the system clipboard and falls back to OSC 52 only when
//! stdout is a terminal that can interpret the sequence.

use std::io::{IsTerminal, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ClipboardSink;

/// Which clipboard transport to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardTransport {
    /// System clipboard, OSC 52 when stdout is a terminal (default)
    #[default]
    Auto,
    /// System clipboard only
    System,
    /// OSC 52 escape sequence only
    Osc52,
}

/// Clipboard backed by the configured transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard {
    transport: ClipboardTransport,
}

impl SystemClipboard {
    pub fn new(transport: ClipboardTransport) -> Self {
        Self { transport }
    }

    /// Copies text using the system clipboard.
    fn copy_system(text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;

        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::System(e.to_string()))?;

        Ok(())
    }

    /// Copies text using the OSC 52 escape sequence.
    ///
    /// This writes directly to stdout, which the terminal intercepts
    /// and copies to the system clipboard.
    fn copy_osc52(text: &str) -> Result<(), ClipboardError> {
        use base64::Engine;

        let encoded = base64::engine::general_purpose::STANDARD.encode(text);

        // OSC 52 format: ESC ] 52 ; c ; <base64-data> ESC \
        // - 'c' specifies the clipboard selection (system clipboard)
        let mut stdout = std::io::stdout();
        write!(stdout, "\x1b]52;c;{encoded}\x1b\\")
            .map_err(|e| ClipboardError::Osc52(e.to_string()))?;
        stdout
            .flush()
            .map_err(|e| ClipboardError::Osc52(e.to_string()))?;

        Ok(())
    }
}

impl ClipboardSink for SystemClipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        match self.transport {
            ClipboardTransport::System => Self::copy_system(text),
            ClipboardTransport::Osc52 => Self::copy_osc52(text),
            ClipboardTransport::Auto => match Self::copy_system(text) {
                Err(ClipboardError::Unavailable(reason)) if std::io::stdout().is_terminal() => {
                    debug!(%reason, "system clipboard unavailable, using OSC 52");
                    Self::copy_osc52(text)
                }
                other => other,
            },
        }
    }
}

/// Clipboard operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// No clipboard could be opened (headless session, no display server).
    Unavailable(String),
    /// The system clipboard opened but refused the text.
    System(String),
    /// OSC 52 write failed.
    Osc52(String),
}

impl ClipboardError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ClipboardError::Unavailable(_))
    }
}

impl std::fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClipboardError::Unavailable(msg) => write!(f, "Clipboard unavailable: {msg}"),
            ClipboardError::System(msg) => write!(f, "System clipboard failed: {msg}"),
            ClipboardError::Osc52(msg) => write!(f, "OSC 52 clipboard failed: {msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}
