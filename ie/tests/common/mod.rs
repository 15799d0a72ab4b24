//! Shared fixtures: bare "remote" repositories and a recording command runner
#![allow(dead_code)]

use std::cell::RefCell;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, SystemTime};

use inkengine::git::{CommandOutput, CommandRunner, GitError};
use tempfile::TempDir;
use walkdir::WalkDir;

pub const BOOK: &str = "my-novel";

/// Identity and isolation applied to every git process the tests start
fn git_env() -> [(&'static str, &'static str); 6] {
    [
        ("GIT_AUTHOR_NAME", "Test Author"),
        ("GIT_AUTHOR_EMAIL", "author@test.invalid"),
        ("GIT_COMMITTER_NAME", "Test Author"),
        ("GIT_COMMITTER_EMAIL", "author@test.invalid"),
        ("GIT_CONFIG_NOSYSTEM", "1"),
        ("GIT_CONFIG_GLOBAL", "/dev/null"),
    ]
}

/// Runs real processes and remembers every command line it was given
#[derive(Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<String>>,
    extra_env: Vec<(String, String)>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner whose processes also see `vars`, e.g. a non-English locale
    pub fn with_env(vars: &[(&str, &str)]) -> Self {
        Self {
            calls: RefCell::default(),
            extra_env: vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Recorded calls starting with `prefix`, e.g. "git commit"
    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls.borrow().iter().filter(|c| c.starts_with(prefix)).cloned().collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn execute(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput, GitError> {
        let command = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.borrow_mut().push(command.clone());

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .envs(git_env())
            .envs(self.extra_env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .output()
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;

        Ok(CommandOutput {
            command,
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Run git in `dir`, panicking on failure, returning trimmed stdout
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .envs(git_env())
        .output()
        .expect("Failed to spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Exit status of git in `dir`
pub fn git_ok(dir: &Path, args: &[&str]) -> bool {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .envs(git_env())
        .status()
        .expect("Failed to spawn git")
        .success()
}

pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Push every non-git file's mtime back by `days`
pub fn backdate_tree(root: &Path, days: u64) {
    let when = SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60);
    let walker = WalkDir::new(root).into_iter().filter_entry(|e| e.file_name() != ".git");
    for entry in walker {
        let entry = entry.unwrap();
        if entry.file_type().is_file() {
            File::options()
                .write(true)
                .open(entry.path())
                .unwrap()
                .set_modified(when)
                .unwrap();
        }
    }
}

/// A bare remote with a `main` branch, an author clone of it and an empty books root
pub struct Fixture {
    pub tmp: TempDir,
    /// Bare repository standing in for the hosted remote
    pub remote: PathBuf,
    /// Author's own clone, used to push changes "from elsewhere"
    pub author: PathBuf,
    pub books_root: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        let remote = tmp.path().join("remotes").join(format!("{}.git", BOOK));
        let author = tmp.path().join("author");
        let books_root = tmp.path().join("books");

        fs::create_dir_all(&remote).unwrap();
        git(&remote, &["init", "--bare", "--quiet"]);
        git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        fs::create_dir_all(&author).unwrap();
        git(&author, &["init", "--quiet"]);
        git(&author, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        write_file(&author, "README.md", "# My Novel\n");
        git(&author, &["add", "."]);
        git(&author, &["commit", "--quiet", "-m", "init"]);
        git(&author, &["remote", "add", "origin", remote.to_str().unwrap()]);
        git(&author, &["push", "--quiet", "origin", "main"]);

        Self {
            tmp,
            remote,
            author,
            books_root,
        }
    }

    pub fn url(&self) -> String {
        self.remote.to_string_lossy().into_owned()
    }

    /// Where the engine keeps its working copy of the book
    pub fn book_dir(&self) -> PathBuf {
        self.books_root.join(BOOK)
    }

    /// Commit files on the author clone's main and push them
    pub fn push_files(&self, files: &[(&str, &str)], message: &str) {
        git(&self.author, &["checkout", "--quiet", "main"]);
        for (rel, content) in files {
            write_file(&self.author, rel, content);
        }
        git(&self.author, &["add", "."]);
        git(&self.author, &["commit", "--quiet", "-m", message]);
        git(&self.author, &["push", "--quiet", "origin", "main"]);
    }

    /// Publish a `draft` branch on the remote pointing at the author's main
    pub fn push_remote_draft(&self) {
        git(&self.author, &["push", "--quiet", "origin", "main:draft"]);
    }

    pub fn remote_has_ref(&self, reference: &str) -> bool {
        !git(&self.remote, &["ls-remote", ".", reference]).is_empty()
    }

    pub fn remote_tags(&self, pattern: &str) -> Vec<String> {
        git(&self.remote, &["tag", "--list", pattern])
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// Branch currently checked out in `dir`
pub fn current_branch(dir: &Path) -> String {
    git(dir, &["rev-parse", "--abbrev-ref", "HEAD"])
}

/// Whether every commit of `ancestor` is contained in `descendant`
pub fn contains_all_of(dir: &Path, descendant: &str, ancestor: &str) -> bool {
    git_ok(dir, &["merge-base", "--is-ancestor", ancestor, descendant])
}
