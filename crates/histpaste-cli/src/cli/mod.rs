//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use histpaste_core::config;
use histpaste_core::logging;
use histpaste_core::range::RangeSpec;

mod commands;

/// Value used by `-i`/`-o` when no range is given.
const RECENT_WINDOW_ARG: &str = "-5..-1";

#[derive(Parser)]
#[command(name = "histpaste")]
#[command(version)]
#[command(about = "Share REPL history and code as GitHub Gists or via the clipboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to the log file
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Arguments shared by `paste` and `clip`.
#[derive(clap::Args, Debug, Clone, Default)]
struct PasteArgs {
    /// File to share (`-` reads stdin); not combined with history flags
    #[arg(value_name = "FILE", conflicts_with_all = ["inputs", "outputs"])]
    file: Option<PathBuf>,

    /// Only share these lines of the file or output history (one-based)
    #[arg(short, long, value_name = "RANGE", allow_hyphen_values = true)]
    lines: Option<RangeSpec>,

    /// Share input history, annotated with results (repeatable; negative
    /// ranges need `=`, as in `-i=-3..-1`)
    #[arg(
        short = 'i',
        long = "in",
        value_name = "RANGE",
        num_args = 0..=1,
        default_missing_value = RECENT_WINDOW_ARG,
        action = ArgAction::Append
    )]
    inputs: Vec<RangeSpec>,

    /// Share output history (repeatable)
    #[arg(
        short = 'o',
        long = "out",
        value_name = "RANGE",
        num_args = 0..=1,
        default_missing_value = RECENT_WINDOW_ARG,
        action = ArgAction::Append
    )]
    outputs: Vec<RangeSpec>,

    /// Create a public gist
    #[arg(short, long)]
    public: bool,

    /// Copy the content to the clipboard instead of uploading it
    #[arg(long)]
    clip: bool,

    /// Filename for the gist
    #[arg(short, long, value_name = "NAME")]
    filename: Option<String>,

    /// Session log to read history from
    #[arg(long, value_name = "PATH")]
    session: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Upload code or REPL history as a gist
    #[command(visible_alias = "gist")]
    Paste(PasteArgs),

    /// Copy code or REPL history to the clipboard
    Clip(PasteArgs),

    /// Inspect or extend the session log
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },

    /// Store a GitHub token for uploads
    Login {
        /// Personal access token (prompted for when omitted)
        #[arg(long, value_name = "TOKEN")]
        token: Option<String>,
    },

    /// Remove the stored GitHub token
    Logout,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum HistoryCommands {
    /// Show recorded evaluations
    Show {
        /// Range of evaluations to show (default: the last five)
        #[arg(value_name = "RANGE", allow_hyphen_values = true)]
        range: Option<RangeSpec>,

        /// Session log to read
        #[arg(long, value_name = "PATH")]
        session: Option<PathBuf>,
    },
    /// Append an evaluation to the session log
    Record {
        /// Evaluated input
        #[arg(long)]
        input: String,

        /// Result, as JSON (plain text is stored as a string)
        #[arg(long, allow_hyphen_values = true)]
        output: Option<String>,

        /// Session log to append to
        #[arg(long, value_name = "PATH")]
        session: Option<PathBuf>,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from Rust defaults (for xtask)
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = match logging::init(cli.verbose) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: file logging disabled: {e:#}");
            None
        }
    };

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // `config` commands must work even when the config file is broken.
    let load_config = || config::Config::load().context("load config");

    match cli.command {
        Commands::Paste(args) => commands::paste::run(&args.into(), &load_config()?).await,
        Commands::Clip(args) => {
            let mut options: commands::paste::PasteOptions = args.into();
            options.clip = true;
            commands::paste::run(&options, &load_config()?).await
        }

        Commands::History { command } => match command {
            HistoryCommands::Show { range, session } => commands::history::show(
                range.unwrap_or_default(),
                session.as_deref(),
                &load_config()?,
            ),
            HistoryCommands::Record {
                input,
                output,
                session,
            } => commands::history::record(
                &input,
                output.as_deref(),
                session.as_deref(),
                &load_config()?,
            ),
        },

        Commands::Login { token } => commands::auth::login(token, &load_config()?).await,
        Commands::Logout => commands::auth::logout(),

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        },
    }
}

impl From<PasteArgs> for commands::paste::PasteOptions {
    fn from(args: PasteArgs) -> Self {
        commands::paste::PasteOptions {
            file: args.file,
            lines: args.lines,
            inputs: args.inputs,
            outputs: args.outputs,
            public: args.public,
            clip: args.clip,
            filename: args.filename,
            session: args.session,
        }
    }
}
