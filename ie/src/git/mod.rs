//! Git state reconciliation for a book working copy

mod draft;
mod reconcile;
mod runner;
mod snapshot;
mod sync;

pub use draft::{DraftState, draft_state, ensure_draft_branch};
pub use reconcile::{ReconcileOutcome, commit_human_edits, detect_human_edits};
pub use runner::{CommandOutput, CommandRunner, Git, GitError, SystemRunner};
pub use snapshot::{snapshot, snapshot_tag_name};
pub use sync::{SyncOutcome, ensure_repo};

/// Remote every book is pushed to
pub const REMOTE: &str = "origin";

/// The stable main line
pub const MAIN_BRANCH: &str = "main";

/// Long-lived branch the generation step writes to
pub const DRAFT_BRANCH: &str = "draft";
