//! # doc2sft
//!
//! Turn a directory of PDF and Word documents into question/answer
//! fine-tuning data using an OpenAI-compatible chat model.
//!
//! Each document yields one `<stem>.txt` file of JSON lines, a user turn
//! (the question) followed by an assistant turn (the answer) for every pair:
//!
//! ```text
//! {"role":"user","content":"什么是监督微调？"}
//! {"role":"assistant","content":"监督微调是……"}
//! ```
//!
//! ## Pipeline Overview
//!
//! ```text
//! input dir
//!  │
//!  ├─ 1. Discover  *.pdf then *.docx, sorted by name
//!  ├─ 2. Route     ≤ 20 MiB: direct mode, larger: file upload
//!  ├─ 3. Extract   local text extraction (lopdf / docx-rs, spawn_blocking)
//!  ├─ 4. Chunk     40 000-char windows with 200 chars of overlap
//!  ├─ 5. Generate  one completion per chunk (or per uploaded file)
//!  ├─ 6. Normalise tolerate the JSON shapes models actually return
//!  └─ 7. Write     JSON lines, atomically replaced
//! ```
//!
//! Documents are processed strictly one at a time with a fixed pause after
//! every remote call. Nothing is retried; a document that produces no pairs
//! is logged and skipped.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2sft::{generate, GenerationConfig, OpenAiCompatibleClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GenerationConfig::builder()
//!         .input_dir("pdf")
//!         .output_dir("output")
//!         .api_key(std::env::var("DEEPSEEK_API_KEY")?)
//!         .build()?;
//!     let client = OpenAiCompatibleClient::from_config(&config)?;
//!     let report = generate(&config, Arc::new(client)).await?;
//!     eprintln!("{} pairs in {} files", report.total_pairs, report.files_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2sft` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! doc2sft = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod api;
pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod types;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use api::{CompletionApi, CompletionRequest, OpenAiCompatibleClient};
pub use config::{GenerationConfig, GenerationConfigBuilder};
pub use error::{ApiError, DatagenError, ExtractError, GenerationError};
pub use generate::{discover_documents, generate, plan, PlannedDocument, Route};
pub use output::{DocumentReport, ProcessingMode, RunReport};
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback};
pub use types::{ConversationTurn, Document, DocumentKind, QaPair, Role, TextChunk};
