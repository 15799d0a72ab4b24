//! Book project layout, per-book configuration and payload assembly

mod config;
mod payload;

use std::path::{Path, PathBuf};

use tracing::debug;

pub use config::{BookConfig, ChapterStructure, ConfigError};
pub use payload::{
    ContextSection, InkInstruction, Payload, PayloadError, ReviewNotes, WordBudget, build_payload, count_words,
    extract_ink_instructions, manuscript_word_count,
};

/// Directory holding world-level material and the per-book config
pub const GLOBAL_MATERIAL_DIR: &str = "Global Material";

/// Per-book overrides, relative to the book directory
pub const CONFIG_FILE: &str = "Global Material/Config.yml";

/// Directory of chapter notes, walked recursively
pub const CHAPTERS_DIR: &str = "Chapters material";

/// Review draft carried from the previous session
pub const REVIEW_FILE: &str = "Review/current.md";

/// Directory of versioned manuscripts
pub const CURRENT_VERSION_DIR: &str = "Current version";

/// File-name pattern of versioned manuscripts
pub const MANUSCRIPT_PATTERN: &str = "Full_Book_*.md";

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Cannot derive a book name from repository URL '{0}'")]
    InvalidUrl(String),
}

/// One book repository and the local directory it is checked out to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookProject {
    pub name: String,
    pub url: String,
    pub dir: PathBuf,
}

impl BookProject {
    /// Resolve the project for `url` under `books_root`
    pub fn from_url(url: &str, books_root: &Path) -> Result<Self, ProjectError> {
        let name = book_name_from_url(url)?;
        let dir = books_root.join(&name);
        debug!(%url, %name, ?dir, "BookProject::from_url: resolved");
        Ok(Self {
            name,
            url: url.to_string(),
            dir,
        })
    }
}

/// Last path segment of a repository URL, without a trailing `.git`
///
/// `https://github.com/someone/my-novel` and `git@github.com:someone/my-novel.git`
/// both give `my-novel`.
pub fn book_name_from_url(url: &str) -> Result<String, ProjectError> {
    let tail = url
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or_default();
    let name = tail.strip_suffix(".git").unwrap_or(tail);

    if name.is_empty() || name == "." || name == ".." {
        return Err(ProjectError::InvalidUrl(url.to_string()));
    }
    Ok(name.to_string())
}
