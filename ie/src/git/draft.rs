//! Long-lived draft branch: create it once, rebase it onto main every run

use serde::Serialize;
use tracing::{debug, info};

use super::runner::{CommandRunner, Git, GitError};
use super::{DRAFT_BRANCH, MAIN_BRANCH, REMOTE};

/// Where the draft branch exists before the manager acts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftState {
    Absent,
    LocalOnly,
    RemoteOnly,
    Synced,
}

impl DraftState {
    pub fn from_existence(local: bool, remote: bool) -> Self {
        match (local, remote) {
            (false, false) => Self::Absent,
            (true, false) => Self::LocalOnly,
            (false, true) => Self::RemoteOnly,
            (true, true) => Self::Synced,
        }
    }

    pub fn exists(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

/// Probe local and remote branch listings for the draft branch
pub fn draft_state<R: CommandRunner>(git: &Git<'_, R>) -> Result<DraftState, GitError> {
    let local = git.probe(&["branch", "--list", DRAFT_BRANCH])?;
    let remote = git.probe(&["ls-remote", "--heads", REMOTE, DRAFT_BRANCH])?;

    let local = local.success() && !local.stdout.trim().is_empty();
    let remote = remote.success() && !remote.stdout.trim().is_empty();
    debug!(local, remote, "draft_state: probed");
    Ok(DraftState::from_existence(local, remote))
}

/// Leave the working copy on the draft branch, containing everything on main
///
/// A missing branch is created from main and published. An existing one (local,
/// remote or both) is checked out and rebased onto main. A rebase conflict is
/// not handled: it fails the run and leaves the tree mid-rebase.
pub fn ensure_draft_branch<R: CommandRunner>(git: &Git<'_, R>) -> Result<DraftState, GitError> {
    let state = draft_state(git)?;
    debug!(?state, "ensure_draft_branch: called");

    if state.exists() {
        git.run(&["checkout", DRAFT_BRANCH])?;
        git.run(&["rebase", MAIN_BRANCH])?;
    } else {
        info!("Creating {} branch from {}", DRAFT_BRANCH, MAIN_BRANCH);
        git.run(&["checkout", "-b", DRAFT_BRANCH, MAIN_BRANCH])?;
        git.run(&["push", "-u", REMOTE, DRAFT_BRANCH])?;
    }

    info!("On {} branch, rebased onto {}", DRAFT_BRANCH, MAIN_BRANCH);
    Ok(state)
}
