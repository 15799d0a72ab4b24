//! CLI argument parsing for inkengine

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ie")]
#[command(author, version, about = "Nightly orchestrator preparing a book repository for an AI writing session")]
#[command(after_help = "Example: ie https://github.com/someone/my-novel")]
pub struct Cli {
    /// Repository URL of the book to process
    #[arg(required = true)]
    pub repo_url: String,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Directory holding the book working copies (overrides the config file)
    #[arg(long)]
    pub books_root: Option<PathBuf>,

    /// Output format for the session report
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Output format for the session report
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
