//! Command-line interface parsing and startup.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

use crate::ui::chat_loop::run_chat;

#[derive(Parser, Debug, Default)]
#[command(name = "sherpa")]
#[command(about = "A terminal chat interface for a streaming career-guidance assistant")]
#[command(
    long_about = "Sherpa is a full-screen terminal chat interface for a career-guidance AI \
assistant. It connects to any OpenAI-compatible chat completion endpoint, streams \
replies with a word-paced typing animation, and keeps the conversation across runs.\n\n\
Environment Variables:\n\
  SHERPA_API_KEY    Your API key (OPENAI_API_KEY works as a fallback)\n\
  SHERPA_BASE_URL   Custom API base URL (optional; OPENAI_BASE_URL also honored)\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message (Alt+Enter inserts a newline)\n\
  Ctrl+B            Toggle the quick-prompt sidebar\n\
  Ctrl+N            Start a new conversation\n\
  Ctrl+T            Toggle the light/dark theme\n\
  Up/Down/Mouse     Scroll through chat history\n\
  Esc               Dismiss an error / close the sidebar\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {
    /// Model to use for chat
    #[arg(short = 'm', long, value_name = "MODEL")]
    pub model: Option<String>,

    /// API base URL (an OpenAI-compatible /v1 endpoint)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Theme to use for this run ("dark" or "light")
    #[arg(long, value_name = "THEME")]
    pub theme: Option<String>,

    /// Write diagnostic logs to this file
    #[arg(short = 'l', long, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

pub async fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.log.as_deref())?;
    run_chat(args).await
}

/// Route tracing output to a file so diagnostics never land on the
/// alternate screen: the `--log` target if given, otherwise a file in the
/// data directory whenever `RUST_LOG` asks for logging.
fn init_logging(log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let target = match log_file {
        Some(path) => Some(path.to_path_buf()),
        None if std::env::var_os("RUST_LOG").is_some() => {
            ProjectDirs::from("org", "permacommons", "sherpa")
                .map(|dirs| dirs.data_dir().join("sherpa.log"))
        }
        None => None,
    };

    let Some(path) = target else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sherpa=debug")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
