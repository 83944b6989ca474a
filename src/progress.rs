//! Progress-callback trait for per-document generation events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::GenerationConfigBuilder::progress_callback`] to receive
//! events as the orchestrator works through the input directory. The CLI uses
//! this to drive its progress bar; library callers can forward events wherever
//! they like.
//!
//! # Example
//!
//! ```rust
//! use doc2sft::{GenerationConfig, GenerationProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct PairCounter {
//!     pairs: AtomicUsize,
//! }
//!
//! impl GenerationProgressCallback for PairCounter {
//!     fn on_chunk_complete(&self, _doc: usize, _chunk: usize, _total: usize, pairs: usize) {
//!         self.pairs.fetch_add(pairs, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(PairCounter { pairs: AtomicUsize::new(0) });
//!
//! let config = GenerationConfig::builder()
//!     .progress_callback(counter as Arc<dyn GenerationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::{DocumentReport, RunReport};
use std::path::Path;
use std::sync::Arc;

/// Called by the orchestrator as it processes each document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive strictly in order since processing is
/// sequential, but implementations must still be `Send + Sync` to live in
/// the shared configuration.
pub trait GenerationProgressCallback: Send + Sync {
    /// Called once after discovery, before any document is opened.
    fn on_run_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called before a document is extracted or uploaded.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position in discovery order
    /// * `total` — number of documents discovered
    /// * `path`  — the source file
    fn on_document_start(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called after each direct-mode request returns (successfully or not).
    ///
    /// # Arguments
    /// * `document_index` — 1-indexed document position
    /// * `chunk_index`    — 1-indexed chunk position
    /// * `total_chunks`   — chunks in this document
    /// * `pairs`          — pairs obtained from this chunk (0 on failure)
    fn on_chunk_complete(
        &self,
        document_index: usize,
        chunk_index: usize,
        total_chunks: usize,
        pairs: usize,
    ) {
        let _ = (document_index, chunk_index, total_chunks, pairs);
    }

    /// Called once a document is finished, whether or not a file was written.
    fn on_document_complete(&self, index: usize, total: usize, report: &DocumentReport) {
        let _ = (index, total, report);
    }

    /// Called once after every document has been attempted.
    fn on_run_complete(&self, report: &RunReport) {
        let _ = report;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GenerationConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;
