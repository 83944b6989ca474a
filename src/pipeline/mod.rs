//! Pipeline stages for document-to-dataset generation.
//!
//! Each submodule implements exactly one transformation step, so each can
//! be tested on its own and the orchestrator in [`crate::generate`] only
//! has to sequence them.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌─ ≤ threshold ─▶ extract ──▶ chunk ──▶ qa (per chunk) ─┐
//! document ──┤                                                       ├─▶ format ──▶ write
//!            └─ > threshold ──────────▶ qa (upload whole file) ──────┘
//! ```
//!
//! 1. [`extract`]   — PDF / Word text; parsing runs in `spawn_blocking`
//! 2. [`chunk`]     — overlapping, boundary-aware slices of the text
//! 3. [`qa`]        — one completion per chunk, or upload + completion + delete;
//!    the only stage with network I/O
//! 4. [`normalize`] — find the QA list in whatever JSON shape came back
//! 5. [`format`]    — pairs → alternating user/assistant turns
//! 6. [`write`]     — JSON lines, replaced atomically

pub mod chunk;
pub mod extract;
pub mod format;
pub mod normalize;
pub mod qa;
pub mod write;
