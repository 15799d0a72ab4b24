//! Clone or refresh the local working copy of a book

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use super::runner::{CommandRunner, Git, GitError};
use super::{MAIN_BRANCH, REMOTE};

/// What [`ensure_repo`] had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// No working copy existed, the remote was cloned
    Cloned,
    /// Working copy existed, refs and tags were fetched
    Fetched,
}

/// Make sure `book_dir` holds a working copy of `url` with fresh remote refs
///
/// An existing copy is refreshed with `git fetch --all --tags`, switched back
/// to the main line (the previous run leaves it on the draft branch) and
/// fast-forwarded to `origin/main`. Uncommitted edits survive the
/// fast-forward; git refuses it when they would be overwritten, and that
/// failure is fatal like a diverged main line.
pub fn ensure_repo<R: CommandRunner>(runner: &R, url: &str, book_dir: &Path) -> Result<SyncOutcome, GitError> {
    debug!(%url, ?book_dir, "ensure_repo: called");

    if book_dir.exists() {
        info!("Repo already cloned at {} - fetching", book_dir.display());
        let git = Git::new(runner, book_dir);
        git.run(&["fetch", "--all", "--tags"])?;
        git.run(&["checkout", MAIN_BRANCH])?;
        let upstream = format!("{}/{}", REMOTE, MAIN_BRANCH);
        git.run(&["merge", "--ff-only", &upstream])?;
        debug!("ensure_repo: main fast-forwarded to {}", upstream);
        return Ok(SyncOutcome::Fetched);
    }

    info!("Cloning {} -> {}", url, book_dir.display());
    let parent = book_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|source| GitError::Io {
        path: parent.to_path_buf(),
        source,
    })?;

    // clone runs from the parent, so only the directory name is passed
    let dest = book_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| book_dir.to_string_lossy().into_owned());
    Git::new(runner, parent).run(&["clone", url, &dest])?;
    Ok(SyncOutcome::Cloned)
}
