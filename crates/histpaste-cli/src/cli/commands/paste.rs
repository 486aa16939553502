//! Paste and clip command handler.
//!
//! Picks a content mode from the flags, composes the content and hands it to
//! the export dispatcher:
//! - any `--in` shares input history annotated with results
//! - otherwise any `--out` shares output history
//! - otherwise the FILE argument (or piped stdin) is shared as is

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use histpaste_core::collect::{self, CollectedCode};
use histpaste_core::compose::{ComposedContent, Composer, Selection};
use histpaste_core::config::Config;
use histpaste_core::export::{self, Dispatcher, ExportTarget};
use histpaste_core::history::{SessionHistory, SessionLog};
use histpaste_core::range::RangeSpec;
use histpaste_core::sinks::{GistClient, GistConfig, SystemClipboard, Visibility};
use tracing::{debug, warn};

/// Options for one paste or clip run.
#[derive(Debug, Clone, Default)]
pub struct PasteOptions {
    pub file: Option<PathBuf>,
    pub lines: Option<RangeSpec>,
    pub inputs: Vec<RangeSpec>,
    pub outputs: Vec<RangeSpec>,
    pub public: bool,
    pub clip: bool,
    pub filename: Option<String>,
    pub session: Option<PathBuf>,
}

impl PasteOptions {
    fn target(&self, config: &Config) -> ExportTarget {
        if self.clip {
            ExportTarget::Clipboard
        } else {
            ExportTarget::Upload {
                visibility: Visibility::from_public_flag(self.public || config.public),
            }
        }
    }
}

pub async fn run(options: &PasteOptions, config: &Config) -> Result<()> {
    let content = compose(options, config)?;
    let target = options.target(config);
    debug!(?target, bytes = content.text.len(), "exporting");

    let clipboard = SystemClipboard::new(config.clipboard.transport);
    let outcome = match target {
        // GitHub settings and saved tokens only matter for uploads.
        ExportTarget::Clipboard => export::copy_to_clipboard(&clipboard, &content)?,
        ExportTarget::Upload { .. } => {
            let gist = GistClient::new(GistConfig::from_config(config)?);
            Dispatcher::new(&clipboard, &gist, &config.default_filename)
                .dispatch(&content, target)
                .await?
        }
    };

    println!("{outcome}");
    Ok(())
}

fn compose(options: &PasteOptions, config: &Config) -> Result<ComposedContent> {
    let composer = Composer::new(config.terminator);

    let mut content = if !options.inputs.is_empty() {
        if options.lines.is_some() {
            warn!("--lines is ignored when sharing input history");
        }
        let history = load_history(options, config)?;
        composer.input_history(
            &Selection::new(options.inputs.clone()),
            &history.inputs,
            &history.outputs,
        )?
    } else if !options.outputs.is_empty() {
        let history = load_history(options, config)?;
        let mut text =
            composer.render_output_history(&Selection::new(options.outputs.clone()), &history.outputs);
        if let Some(lines) = options.lines {
            text = collect::restrict_to_lines(&text, lines);
        }
        composer.collected(text, None)?
    } else {
        let CollectedCode { text, filename } = collect_code(options)?;
        composer.collected(text, filename)?
    };

    if let Some(name) = &options.filename {
        content.filename = Some(name.clone());
    }

    Ok(content)
}

fn load_history(options: &PasteOptions, config: &Config) -> Result<SessionHistory> {
    let path = options
        .session
        .clone()
        .unwrap_or_else(|| config.session_log_path());
    SessionLog::new(path)
        .load(config.history_size)
        .context("load session history")
}

fn collect_code(options: &PasteOptions) -> Result<CollectedCode> {
    match options.file.as_deref() {
        Some(path) if path != Path::new("-") => collect::collect_file(path, options.lines),
        _ => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                // Nothing piped in; the composer reports the missing code.
                return Ok(CollectedCode {
                    text: String::new(),
                    filename: None,
                });
            }
            collect::collect_reader(stdin.lock(), options.lines)
        }
    }
}
