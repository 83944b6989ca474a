//! Error types for the doc2sft library.
//!
//! Two tiers mirror the two ways a run can go wrong:
//!
//! * [`DatagenError`] — **Fatal**: the run cannot start or cannot write its
//!   output (no API key, unreadable input directory, output not writable).
//!   Returned as `Err` from [`crate::generate::generate`].
//!
//! * [`ExtractError`], [`ApiError`], [`GenerationError`] — **Non-fatal**:
//!   one document or one remote call failed. The orchestrator logs them,
//!   records them in [`crate::output::DocumentReport::failures`], counts zero
//!   pairs for that step and moves on.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the doc2sft library.
#[derive(Debug, Error)]
pub enum DatagenError {
    /// No API key was supplied via flag or environment.
    #[error("No API key configured.\nSet DEEPSEEK_API_KEY or pass --api-key <KEY>.")]
    MissingApiKey,

    /// The input directory is missing or cannot be listed.
    #[error("Cannot read input directory '{path}': {source}")]
    InputDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an output records file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Text extraction failed for one document.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF '{path}' could not be parsed: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    #[error("Word document '{path}' could not be parsed: {detail}")]
    CorruptDocx { path: PathBuf, detail: String },

    /// The parser panicked or its blocking task was cancelled.
    #[error("Extraction of '{path}' aborted: {detail}")]
    Internal { path: PathBuf, detail: String },
}

/// A request to the remote completion service failed.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Transport-level failure: DNS, TLS, connection reset, timeout.
    #[error("request to {endpoint} failed: {detail}")]
    Request { endpoint: String, detail: String },

    /// HTTP 429. Reported separately so logs make throttling obvious.
    #[error("rate limited by {endpoint}")]
    RateLimited { endpoint: String },

    /// Any other non-2xx status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// 2xx but the envelope did not have the expected shape.
    #[error("unexpected response from {endpoint}: {detail}")]
    InvalidResponse { endpoint: String, detail: String },

    /// The document to upload could not be read.
    #[error("cannot read upload '{path}': {detail}")]
    FileRead { path: PathBuf, detail: String },
}

/// One QA-generation call produced nothing usable.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The model's message body was not JSON.
    #[error("response is not valid JSON ({detail}); content: {preview}…")]
    InvalidJson { detail: String, preview: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_names_the_variable() {
        let msg = DatagenError::MissingApiKey.to_string();
        assert!(msg.contains("DEEPSEEK_API_KEY"), "got: {msg}");
    }

    #[test]
    fn status_display_includes_code_and_body() {
        let e = ApiError::Status {
            endpoint: "chat/completions".into(),
            status: 401,
            body: "invalid key".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("invalid key"));
    }

    #[test]
    fn generation_error_is_transparent_over_api_error() {
        let e: GenerationError = ApiError::RateLimited {
            endpoint: "files".into(),
        }
        .into();
        assert_eq!(e.to_string(), "rate limited by files");
    }

    #[test]
    fn invalid_json_display_carries_preview() {
        let e = GenerationError::InvalidJson {
            detail: "expected value at line 1 column 1".into(),
            preview: "Sure! Here are".into(),
        };
        assert!(e.to_string().contains("Sure! Here are"));
    }
}
