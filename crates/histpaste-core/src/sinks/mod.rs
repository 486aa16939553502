//! Export sinks: where composed content ends up.
//!
//! - [`ClipboardSink`]: local clipboard ([`SystemClipboard`])
//! - [`PasteService`]: remote paste service ([`GistClient`])

pub mod clipboard;
pub mod gist;

use std::fmt;
use std::future::Future;

pub use clipboard::{ClipboardError, ClipboardTransport, SystemClipboard};
pub use gist::{GistClient, GistConfig, UploadError};

/// Who can see an uploaded paste.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    Public,
    /// Unlisted: reachable by URL only.
    #[default]
    Secret,
}

impl Visibility {
    pub fn from_public_flag(public: bool) -> Self {
        if public {
            Visibility::Public
        } else {
            Visibility::Secret
        }
    }

    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Secret => write!(f, "secret"),
        }
    }
}

/// What a paste service hands back after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub url: String,
}

/// Local clipboard.
pub trait ClipboardSink {
    /// Copies text, failing with [`ClipboardError::Unavailable`] when there
    /// is no clipboard to copy to.
    fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Remote paste service.
pub trait PasteService {
    fn upload(
        &self,
        text: &str,
        filename: &str,
        visibility: Visibility,
    ) -> impl Future<Output = Result<UploadReceipt, UploadError>> + Send;
}
