//! Assemble the context handed to the generation step

use std::path::{Path, PathBuf};

use glob::Pattern;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::config::BookConfig;
use super::{CHAPTERS_DIR, CURRENT_VERSION_DIR, GLOBAL_MATERIAL_DIR, MANUSCRIPT_PATTERN, REVIEW_FILE};

/// Error types for payload assembly
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Invalid instruction pattern: {0}")]
    InstructionPattern(#[from] regex::Error),
}

/// Author instruction comment. The space after `INK:` keeps engine markers
/// such as `<!-- INK:NEW: -->` out.
const INK_INSTRUCTION: &str = r"<!-- INK: (.*?) -->";

/// Characters of preceding text kept as an instruction's anchor
const ANCHOR_CHARS: usize = 200;

/// One text file of reference material
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextSection {
    /// Path relative to the book directory, `/`-separated
    pub path: String,
    pub content: String,
}

/// An author request left inline in the review draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InkInstruction {
    /// Text just before the comment, locating the request in the draft
    pub anchor: String,
    pub instruction: String,
}

/// Review draft with author instruction comments taken out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewNotes {
    pub content: String,
    pub instructions: Vec<InkInstruction>,
}

/// Manuscript progress against the book's target length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WordBudget {
    pub total: usize,
    pub target: usize,
    pub remaining: usize,
}

impl WordBudget {
    pub fn new(total: usize, target: u32) -> Self {
        let target = target as usize;
        Self {
            total,
            target,
            remaining: target.saturating_sub(total),
        }
    }
}

/// Everything the generation step receives for one session
#[derive(Debug, Clone, Serialize)]
pub struct Payload {
    /// Global material, then chapter material, then the review draft
    pub context_sections: Vec<ContextSection>,

    /// Words in the latest manuscript version, 0 when there is none
    pub word_count: usize,

    /// `word_count` measured against `config.target_length`
    pub word_budget: WordBudget,

    /// Instructions parsed from the review draft, when there is one
    pub review: Option<ReviewNotes>,

    pub config: BookConfig,
}

/// Number of whitespace-separated words
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Read the book's context files and manuscript word count
pub fn build_payload(book_dir: &Path, config: &BookConfig) -> Result<Payload, PayloadError> {
    debug!(?book_dir, "build_payload: called");
    let mut context_sections = Vec::new();

    for path in global_material(book_dir)? {
        context_sections.push(load_section(book_dir, &path)?);
    }

    for path in chapter_material(book_dir)? {
        context_sections.push(load_section(book_dir, &path)?);
    }

    let review_path = book_dir.join(REVIEW_FILE);
    let review = if review_path.is_file() {
        let section = load_section(book_dir, &review_path)?;
        let notes = extract_ink_instructions(&section.content)?;
        if !notes.instructions.is_empty() {
            info!("Review carries {} author instruction(s)", notes.instructions.len());
        }
        context_sections.push(section);
        Some(notes)
    } else {
        warn!("{} not found - starting fresh", REVIEW_FILE);
        None
    };

    let word_count = manuscript_word_count(book_dir)?;
    let word_budget = WordBudget::new(word_count, config.target_length);

    info!(
        "Payload built: {} context section(s), {} manuscript words",
        context_sections.len(),
        word_count
    );

    Ok(Payload {
        context_sections,
        word_count,
        word_budget,
        review,
        config: config.clone(),
    })
}

/// Split `<!-- INK: ... -->` comments out of a review draft
///
/// Each instruction is paired with up to 200 characters of the text before
/// it. The returned content has the comments removed and everything else,
/// engine markers included, left as is.
pub fn extract_ink_instructions(text: &str) -> Result<ReviewNotes, PayloadError> {
    let re = Regex::new(INK_INSTRUCTION)?;

    let instructions = re
        .captures_iter(text)
        .filter_map(|caps| {
            let comment = caps.get(0)?;
            let instruction = caps.get(1)?.as_str().trim().to_string();
            Some(InkInstruction {
                anchor: anchor_before(text, comment.start()),
                instruction,
            })
        })
        .collect();

    Ok(ReviewNotes {
        content: re.replace_all(text, "").into_owned(),
        instructions,
    })
}

fn anchor_before(text: &str, end: usize) -> String {
    let preceding = &text[..end];
    let start = preceding
        .char_indices()
        .rev()
        .nth(ANCHOR_CHARS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    preceding[start..].trim().to_string()
}

/// Words in the lexicographically last `Full_Book_*.md`
///
/// Relies on manuscript names sorting in version order, e.g. zero-padded
/// `Full_Book_v003.md`.
pub fn manuscript_word_count(book_dir: &Path) -> Result<usize, PayloadError> {
    let dir = book_dir.join(CURRENT_VERSION_DIR);
    let Some(latest) = markdown_files(&dir, MANUSCRIPT_PATTERN)?.pop() else {
        debug!(?dir, "manuscript_word_count: no manuscript versions");
        return Ok(0);
    };

    let text = read_text(&latest)?;
    let words = count_words(&text);
    info!("Manuscript word count: {} (from {})", words, file_name(&latest));
    Ok(words)
}

fn global_material(book_dir: &Path) -> Result<Vec<PathBuf>, PayloadError> {
    markdown_files(&book_dir.join(GLOBAL_MATERIAL_DIR), "*.md")
}

/// Regular files directly inside `dir` whose name matches `pattern`, sorted by name
fn markdown_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, PayloadError> {
    if !dir.is_dir() {
        debug!(?dir, "markdown_files: directory absent");
        return Ok(Vec::new());
    }
    let pattern = Pattern::new(pattern).map_err(|source| PayloadError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let entries = std::fs::read_dir(dir).map_err(|source| PayloadError::FileRead {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PayloadError::FileRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && pattern.matches(&entry.file_name().to_string_lossy()) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Every `.md` file below the chapters directory, ordered by relative path
fn chapter_material(book_dir: &Path) -> Result<Vec<PathBuf>, PayloadError> {
    let dir = book_dir.join(CHAPTERS_DIR);
    if !dir.is_dir() {
        debug!(?dir, "chapter_material: directory absent");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&dir) {
        let entry = entry.map_err(|source| PayloadError::Walk {
            path: dir.clone(),
            source,
        })?;
        let is_markdown = entry.path().extension().is_some_and(|ext| ext == "md");
        if entry.file_type().is_file() && is_markdown {
            files.push(entry.into_path());
        }
    }

    // Path ordering is component-wise, so "a/b.md" sorts before "a-c.md"
    files.sort();
    Ok(files)
}

fn load_section(book_dir: &Path, path: &Path) -> Result<ContextSection, PayloadError> {
    let content = read_text(path)?;
    let relative = relative_path(book_dir, path);
    info!("Loaded: {} ({} words)", relative, count_words(&content));
    Ok(ContextSection {
        path: relative,
        content,
    })
}

fn read_text(path: &Path) -> Result<String, PayloadError> {
    std::fs::read_to_string(path).map_err(|source| PayloadError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

fn relative_path(book_dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(book_dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
