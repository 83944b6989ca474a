//! Run and per-document reports.
//!
//! The pipeline never fails a run because one document produced nothing, so
//! these reports are where callers find out what happened: which route each
//! document took, how many pairs it yielded, where the file went, and the
//! reasons behind any zero.

use crate::types::DocumentKind;
use serde::Serialize;
use std::path::PathBuf;

/// How a document was routed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProcessingMode {
    /// Text extracted locally and sent inline, one request per chunk.
    Direct { chunks: usize },
    /// Whole file uploaded and referenced from a single request.
    Upload,
    /// No remote call was made (no extractable text).
    Skipped,
}

/// Outcome for one input document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub source: PathBuf,
    pub kind: DocumentKind,
    pub size_bytes: u64,
    #[serde(flatten)]
    pub mode: ProcessingMode,
    /// QA pairs written (each becomes two lines).
    pub pairs: usize,
    /// Records file, or `None` if nothing was written.
    pub output: Option<PathBuf>,
    /// Human-readable reasons for every failed stage, in order.
    pub failures: Vec<String>,
    pub duration_ms: u64,
}

impl DocumentReport {
    pub fn is_written(&self) -> bool {
        self.output.is_some()
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub documents: Vec<DocumentReport>,
    pub total_pairs: usize,
    pub files_written: usize,
    pub duration_ms: u64,
}

impl RunReport {
    /// Documents that ended without an output file.
    pub fn unproductive(&self) -> impl Iterator<Item = &DocumentReport> {
        self.documents.iter().filter(|d| !d.is_written())
    }
}
