//! Dated recovery tags taken before the nightly run touches a book

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::REMOTE;
use super::runner::{CommandRunner, Git, GitError};

const TAG_PREFIX: &str = "pre-nightly-";

/// Tag name for a calendar day, e.g. `pre-nightly-2026-10-19`
pub fn snapshot_tag_name(day: NaiveDate) -> String {
    format!("{}{}", TAG_PREFIX, day.format("%Y-%m-%d"))
}

/// Tag the current HEAD for `day` and push the tag
///
/// Idempotent per day: if the tag already exists the step is skipped without
/// pushing. Returns the tag name either way.
pub fn snapshot<R: CommandRunner>(git: &Git<'_, R>, day: NaiveDate) -> Result<String, GitError> {
    let tag = snapshot_tag_name(day);
    debug!(%tag, "snapshot: called");

    // decided on the ref itself, git's messages are localised
    let tag_ref = format!("refs/tags/{}", tag);
    if git.probe(&["rev-parse", "--quiet", "--verify", &tag_ref])?.success() {
        warn!("Tag {} already exists - skipping", tag);
        return Ok(tag);
    }

    git.run(&["tag", &tag])?;
    git.run(&["push", REMOTE, &tag])?;
    info!("Snapshot tag created: {}", tag);
    Ok(tag)
}
