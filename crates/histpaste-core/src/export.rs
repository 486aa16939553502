//! Export dispatch.
//!
//! Sends composed content to exactly one sink. After an upload the returned
//! URL is copied to the clipboard as a courtesy; only a missing clipboard is
//! tolerated there, every other failure aborts the export.

use std::fmt;

use tracing::{info, warn};

use crate::compose::ComposedContent;
use crate::sinks::{
    ClipboardError, ClipboardSink, PasteService, UploadError, UploadReceipt, Visibility,
};

/// Where composed content goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    Clipboard,
    Upload { visibility: Visibility },
}

/// A finished export, rendered as the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Copied,
    Uploaded { url: String, url_copied: bool },
}

impl fmt::Display for ExportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportOutcome::Copied => write!(f, "Copied content to clipboard!"),
            ExportOutcome::Uploaded { url, url_copied } => {
                write!(f, "Gist created at URL {url}")?;
                if *url_copied {
                    write!(f, ", which is now in the clipboard.")?;
                }
                Ok(())
            }
        }
    }
}

/// Export errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    Clipboard(ClipboardError),
    Upload(UploadError),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Clipboard(err) => write!(f, "{err}"),
            ExportError::Upload(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Clipboard(err) => Some(err),
            ExportError::Upload(err) => Some(err),
        }
    }
}

/// Copies composed content to the clipboard.
///
/// Needs no paste service, so clipboard-only exports never configure one.
pub fn copy_to_clipboard<C>(
    clipboard: &C,
    content: &ComposedContent,
) -> Result<ExportOutcome, ExportError>
where
    C: ClipboardSink + ?Sized,
{
    clipboard.copy(&content.text).map_err(ExportError::Clipboard)?;
    info!(bytes = content.text.len(), "copied content to clipboard");
    Ok(ExportOutcome::Copied)
}

/// Routes composed content to the clipboard or the paste service.
pub struct Dispatcher<'a, C, P> {
    clipboard: &'a C,
    paste: &'a P,
    default_filename: &'a str,
}

impl<'a, C, P> Dispatcher<'a, C, P>
where
    C: ClipboardSink,
    P: PasteService,
{
    pub fn new(clipboard: &'a C, paste: &'a P, default_filename: &'a str) -> Self {
        Self {
            clipboard,
            paste,
            default_filename,
        }
    }

    pub async fn dispatch(
        &self,
        content: &ComposedContent,
        target: ExportTarget,
    ) -> Result<ExportOutcome, ExportError> {
        match target {
            ExportTarget::Clipboard => copy_to_clipboard(self.clipboard, content),
            ExportTarget::Upload { visibility } => {
                let filename = content
                    .filename
                    .as_deref()
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or(self.default_filename);

                let UploadReceipt { url } = self
                    .paste
                    .upload(&content.text, filename, visibility)
                    .await
                    .map_err(ExportError::Upload)?;
                info!(%url, filename, "uploaded content");

                let url_copied = match self.clipboard.copy(&url) {
                    Ok(()) => true,
                    Err(err) if err.is_unavailable() => {
                        warn!(%err, "URL not copied");
                        false
                    }
                    Err(err) => return Err(ExportError::Clipboard(err)),
                };

                Ok(ExportOutcome::Uploaded { url, url_copied })
            }
        }
    }
}
