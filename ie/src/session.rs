//! The nightly session: a linear pipeline of fallible steps
//!
//! sync (fast-forward main) → config → human edits → snapshot → draft branch → payload
//!
//! The first failing step aborts the run. Nothing is rolled back: a snapshot
//! tag pushed before a later failure stays pushed.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use eyre::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::book::{BookConfig, BookProject, Payload, build_payload};
use crate::git::{
    CommandRunner, DraftState, Git, ReconcileOutcome, SyncOutcome, commit_human_edits, detect_human_edits,
    ensure_draft_branch, ensure_repo, snapshot,
};

const RULE: &str = "============================================================";

/// Outcome of a completed session, handed to the generation step
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub book: String,
    pub book_dir: PathBuf,
    pub sync: SyncOutcome,
    /// Files detected as edited today, relative to the book directory
    pub human_edits: Vec<PathBuf>,
    pub reconcile: ReconcileOutcome,
    pub snapshot_tag: String,
    /// Draft branch state found before it was brought up to date
    pub draft_state: DraftState,
    pub payload: Payload,
}

/// Runs the nightly sequence for books stored under one root directory
pub struct Session<R: CommandRunner> {
    runner: R,
    books_root: PathBuf,
}

impl<R: CommandRunner> Session<R> {
    pub fn new(runner: R, books_root: impl Into<PathBuf>) -> Self {
        let books_root = books_root.into();
        debug!(?books_root, "Session::new: called");
        Self { runner, books_root }
    }

    /// Run the session for `repo_url` on today's local date
    pub fn run(&self, repo_url: &str) -> Result<SessionReport> {
        self.run_on(repo_url, Local::now().date_naive())
    }

    /// Run the session for `repo_url` as if the calendar day were `today`
    pub fn run_on(&self, repo_url: &str, today: NaiveDate) -> Result<SessionReport> {
        let project = BookProject::from_url(repo_url, &self.books_root)?;

        info!("{}", RULE);
        info!("Ink engine - nightly session starting");
        info!("Book: {}", project.name);
        info!("Dir:  {}", project.dir.display());
        info!("{}", RULE);

        let sync = ensure_repo(&self.runner, &project.url, &project.dir).context("Repository sync failed")?;

        let config = BookConfig::load(&project.dir).context("Failed to load book config")?;

        let git = Git::new(&self.runner, &project.dir);

        let human_edits = detect_human_edits(&project.dir, today).context("Failed to scan for human edits")?;
        let reconcile = commit_human_edits(&git, &human_edits).context("Failed to commit human edits")?;

        let snapshot_tag = snapshot(&git, today).context("Failed to create snapshot tag")?;

        let draft_state = ensure_draft_branch(&git).context("Failed to prepare draft branch")?;

        let payload = build_payload(&project.dir, &config).context("Failed to build payload")?;

        info!("{}", RULE);
        info!("Session prepared. Payload ready for generation.");
        info!(
            "  Sections: {} | Manuscript words: {} ({} to target) | Nightly target: {}",
            payload.context_sections.len(),
            payload.word_count,
            payload.word_budget.remaining,
            config.nightly_output_target
        );
        info!("{}", RULE);

        Ok(SessionReport {
            book: project.name,
            book_dir: project.dir,
            sync,
            human_edits,
            reconcile,
            snapshot_tag,
            draft_state,
            payload,
        })
    }
}
