//! Detect and commit the human edits made to a book during the day

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};
use eyre::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::runner::{CommandRunner, Git, GitError};
use super::{MAIN_BRANCH, REMOTE};

const HUMAN_EDITS_MESSAGE: &str = "chore: human updates";

/// What [`commit_human_edits`] ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// No file was modified today, git was not touched
    NoEdits,
    /// Files were touched today but their content matches HEAD
    NothingStaged,
    /// One commit was created and pushed to main
    Committed,
}

/// List files under `book_dir` whose modification date (local time) is `today`
///
/// This is an mtime heuristic, not a content diff: anything touched today
/// counts, including files rewritten by an earlier run. The `.git` directory
/// is never descended into. Paths are relative to `book_dir` and sorted.
pub fn detect_human_edits(book_dir: &Path, today: NaiveDate) -> Result<Vec<PathBuf>> {
    debug!(?book_dir, %today, "detect_human_edits: called");
    let mut modified = Vec::new();

    let walker = WalkDir::new(book_dir)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git");

    for entry in walker {
        let entry = entry.context("Failed to walk book directory")?;
        if !entry.file_type().is_file() {
            continue;
        }
        let mtime = entry
            .metadata()
            .context("Failed to stat file")
            .and_then(|m| m.modified().context("Failed to read mtime"))
            .with_context(|| format!("Failed to inspect {}", entry.path().display()))?;

        if DateTime::<Local>::from(mtime).date_naive() == today {
            let relative = entry.path().strip_prefix(book_dir).unwrap_or(entry.path());
            modified.push(relative.to_path_buf());
        }
    }

    modified.sort();

    if modified.is_empty() {
        info!("No human edits detected today");
    } else {
        info!("Human edits detected today ({} file(s)):", modified.len());
        for path in &modified {
            info!("  {}", path.display());
        }
    }
    Ok(modified)
}

/// Stage everything, commit it as one commit and push it to main
///
/// Skips git entirely when `files` is empty. When the touched files turn out
/// to be unchanged nothing gets staged and no empty commit is attempted.
pub fn commit_human_edits<R: CommandRunner>(git: &Git<'_, R>, files: &[PathBuf]) -> Result<ReconcileOutcome, GitError> {
    debug!(count = files.len(), "commit_human_edits: called");
    if files.is_empty() {
        return Ok(ReconcileOutcome::NoEdits);
    }

    git.run(&["add", "."])?;

    // exit 0: index matches HEAD, exit 1: staged changes
    let staged = git.probe(&["diff", "--cached", "--quiet"])?;
    match staged.code {
        Some(0) => {
            info!("Nothing staged after git add - skipping commit");
            return Ok(ReconcileOutcome::NothingStaged);
        }
        Some(1) => {}
        _ => {
            return Err(GitError::CommandFailed {
                code: staged.exit_code(),
                command: staged.command,
                stderr: staged.stderr,
            });
        }
    }

    git.run(&["commit", "-m", HUMAN_EDITS_MESSAGE])?;
    git.run(&["push", REMOTE, MAIN_BRANCH])?;
    info!("Human edits committed and pushed to {}", MAIN_BRANCH);
    Ok(ReconcileOutcome::Committed)
}
