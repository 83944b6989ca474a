//! Core data types that flow through the pipeline.
//!
//! ```text
//! Document ──▶ String ──▶ TextChunk* ──▶ QaPair* ──▶ ConversationTurn*
//! ```
//!
//! Everything except [`Document`] is transient: created for one document and
//! dropped once its output file is written.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Source document format, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Word,
}

impl DocumentKind {
    /// Classify a path by its extension (case-insensitive).
    ///
    /// Only `.pdf` and `.docx` are recognised; legacy `.doc` is not.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Word),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Pdf => f.write_str("pdf"),
            DocumentKind::Word => f.write_str("docx"),
        }
    }
}

/// An input file. Identity is the path; the file is never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub path: PathBuf,
    pub kind: DocumentKind,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, kind: DocumentKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Build a document from a path, or `None` if the extension is unsupported.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let kind = DocumentKind::from_path(&path)?;
        Some(Self { path, kind })
    }

    /// File name for log lines and reports.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// `<output_dir>/<stem>.txt`
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        output_dir.join(format!("{stem}.txt"))
    }
}

/// A contiguous slice of a document's text.
///
/// `text` starts with `overlap` characters repeated from the end of the
/// previous chunk; dropping them and concatenating every chunk in `index`
/// order yields the original text exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position in the document's chunk sequence (0-based).
    pub index: usize,
    pub text: String,
    /// Char offset of `text` within the full document text.
    pub start: usize,
    /// Number of leading chars shared with the previous chunk.
    pub overlap: usize,
}

impl TextChunk {
    /// Length in chars, the unit chunk sizes are measured in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// The part of this chunk not already covered by its predecessor.
    pub fn fresh_text(&self) -> &str {
        match self.text.char_indices().nth(self.overlap) {
            Some((byte, _)) => &self.text[byte..],
            None => "",
        }
    }
}

/// One generated question with its answer. Both fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

impl QaPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One line of the training file: `{"role":"user","content":"..."}`.
///
/// Field order here is the field order on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
