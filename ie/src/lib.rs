//! InkEngine - nightly orchestrator for book repositories
//!
//! Prepares a writing project stored in git for the automated generation
//! step: the repository is cloned or refreshed, the day's human edits are
//! committed, a dated recovery tag is pushed, the long-lived `draft` branch
//! is brought up to date with `main`, and the textual context is assembled
//! into a [`Payload`].
//!
//! # Book layout
//!
//! ```text
//! <books_root>/<book>/
//! ├── Global Material/
//! │   ├── Config.yml          # per-book overrides
//! │   └── *.md                # flat, sorted by name
//! ├── Chapters material/      # *.md, recursive, sorted by path
//! ├── Review/current.md       # optional review draft, may carry <!-- INK: ... --> requests
//! └── Current version/
//!     └── Full_Book_*.md      # versioned manuscripts, last one counts
//! ```
//!
//! # Modules
//!
//! - [`git`] - command runner and the git state-reconciliation steps
//! - [`book`] - book project layout, per-book configuration, payload builder
//! - [`session`] - the nightly sequence tying everything together
//! - [`config`] - engine-level configuration
//! - [`cli`] - command-line interface

pub mod book;
pub mod cli;
pub mod config;
pub mod git;
pub mod session;

pub use book::{
    BookConfig, BookProject, ChapterStructure, ConfigError, ContextSection, InkInstruction, Payload, PayloadError,
    ProjectError, ReviewNotes, WordBudget,
};
pub use config::EngineConfig;
pub use git::{
    CommandOutput, CommandRunner, DraftState, Git, GitError, ReconcileOutcome, SyncOutcome, SystemRunner,
};
pub use session::{Session, SessionReport};
