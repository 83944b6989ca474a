//! Configuration for a dataset-generation run.
//!
//! Every knob lives in [`GenerationConfig`], built once at startup via
//! [`GenerationConfigBuilder`] and passed by reference to each stage. Nothing
//! in the pipeline reads the environment or any global on its own; the CLI
//! resolves flags and environment variables into this struct and that is the
//! only place they are consulted.

use crate::error::DatagenError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Default OpenAI-compatible API base.
pub const DEFAULT_API_BASE: &str = "https://api.deepseek.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

const MIB: u64 = 1024 * 1024;

/// Configuration for turning a document directory into QA training files.
///
/// # Example
/// ```rust
/// use doc2sft::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .input_dir("docs")
///     .output_dir("dataset")
///     .api_key("sk-test")
///     .chunk_size(20_000)
///     .request_delay_ms(0)
///     .build()
///     .unwrap();
/// assert_eq!(config.chunk_overlap, 200);
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// Directory scanned (non-recursively) for `*.pdf` and `*.docx`. Default: `pdf`.
    pub input_dir: PathBuf,

    /// Directory receiving one `<stem>.txt` per document. Created if absent. Default: `output`.
    pub output_dir: PathBuf,

    /// Bearer token for the completion API. Required to run.
    pub api_key: Option<String>,

    /// OpenAI-compatible API base URL, without trailing slash.
    pub api_base: String,

    /// Chat model identifier. Default: `deepseek-chat`.
    pub model: String,

    /// Documents strictly larger than this are uploaded whole instead of
    /// being chunked. Default: 20 MiB.
    pub size_threshold_bytes: u64,

    /// Maximum chunk length in chars. Default: 40 000.
    pub chunk_size: usize,

    /// Chars repeated between consecutive chunks. Default: 200.
    pub chunk_overlap: usize,

    /// Fixed pause after every remote call, in milliseconds. Default: 2 000.
    ///
    /// This is a flat delay to stay under the provider's request rate, not a
    /// backoff: it does not grow after failures.
    pub request_delay_ms: u64,

    /// Sampling temperature. Default: 0.7.
    pub temperature: f32,

    /// Output token ceiling per completion. Default: 8 192.
    pub max_tokens: usize,

    /// Pairs requested per chunk in direct mode. Default: 5.
    pub direct_pairs_target: usize,

    /// Pairs requested per document in file-upload mode. Default: 10.
    pub upload_pairs_target: usize,

    /// Language the model is told to write questions and answers in. Default: Chinese.
    pub answer_language: String,

    /// Per-request timeout in seconds. Default: 300.
    pub api_timeout_secs: u64,

    /// Optional progress observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("pdf"),
            output_dir: PathBuf::from("output"),
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            size_threshold_bytes: 20 * MIB,
            chunk_size: 40_000,
            chunk_overlap: 200,
            request_delay_ms: 2_000,
            temperature: 0.7,
            max_tokens: 8_192,
            direct_pairs_target: 5,
            upload_pairs_target: 10,
            answer_language: "Chinese".to_string(),
            api_timeout_secs: 300,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("input_dir", &self.input_dir)
            .field("output_dir", &self.output_dir)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("size_threshold_bytes", &self.size_threshold_bytes)
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .field("request_delay_ms", &self.request_delay_ms)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("direct_pairs_target", &self.direct_pairs_target)
            .field("upload_pairs_target", &self.upload_pairs_target)
            .field("answer_language", &self.answer_language)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn GenerationProgressCallback>"),
            )
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }

    /// The API key, or [`DatagenError::MissingApiKey`] if none (or an empty one) is set.
    pub fn require_api_key(&self) -> Result<&str, DatagenError> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(DatagenError::MissingApiKey),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn size_threshold_bytes(mut self, bytes: u64) -> Self {
        self.config.size_threshold_bytes = bytes;
        self
    }

    pub fn size_threshold_mb(mut self, mb: u64) -> Self {
        self.config.size_threshold_bytes = mb.saturating_mul(MIB);
        self
    }

    pub fn chunk_size(mut self, chars: usize) -> Self {
        self.config.chunk_size = chars;
        self
    }

    pub fn chunk_overlap(mut self, chars: usize) -> Self {
        self.config.chunk_overlap = chars;
        self
    }

    pub fn request_delay_ms(mut self, ms: u64) -> Self {
        self.config.request_delay_ms = ms;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn direct_pairs_target(mut self, n: usize) -> Self {
        self.config.direct_pairs_target = n.max(1);
        self
    }

    pub fn upload_pairs_target(mut self, n: usize) -> Self {
        self.config.upload_pairs_target = n.max(1);
        self
    }

    pub fn answer_language(mut self, language: impl Into<String>) -> Self {
        self.config.answer_language = language.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// The API key is deliberately not checked here so that key-less
    /// operations (listing documents) can share the same config.
    pub fn build(self) -> Result<GenerationConfig, DatagenError> {
        let c = &self.config;
        if c.chunk_size == 0 {
            return Err(DatagenError::InvalidConfig(
                "chunk size must be ≥ 1".into(),
            ));
        }
        if c.chunk_overlap >= c.chunk_size {
            return Err(DatagenError::InvalidConfig(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                c.chunk_overlap, c.chunk_size
            )));
        }
        if c.size_threshold_bytes == 0 {
            return Err(DatagenError::InvalidConfig(
                "size threshold must be ≥ 1 byte".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(DatagenError::InvalidConfig("max tokens must be ≥ 1".into()));
        }
        if c.api_base.is_empty() {
            return Err(DatagenError::InvalidConfig("API base URL is empty".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = GenerationConfig::default();
        assert_eq!(c.size_threshold_bytes, 20 * 1024 * 1024);
        assert_eq!(c.chunk_size, 40_000);
        assert_eq!(c.chunk_overlap, 200);
        assert_eq!(c.request_delay_ms, 2_000);
        assert_eq!(c.temperature, 0.7);
        assert_eq!(c.max_tokens, 8_192);
        assert_eq!(c.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk() {
        let err = GenerationConfig::builder()
            .chunk_size(100)
            .chunk_overlap(100)
            .build()
            .unwrap_err();
        assert!(matches!(err, DatagenError::InvalidConfig(_)));
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        let c = GenerationConfig::builder()
            .api_base("http://localhost:8080/v1/")
            .build()
            .unwrap();
        assert_eq!(c.api_base, "http://localhost:8080/v1");
    }

    #[test]
    fn blank_api_key_is_missing() {
        let c = GenerationConfig::builder().api_key("  ").build().unwrap();
        assert!(matches!(
            c.require_api_key(),
            Err(DatagenError::MissingApiKey)
        ));
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = GenerationConfig::builder()
            .api_key("sk-very-secret")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-very-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn debug_lists_timeout() {
        let c = GenerationConfig::builder()
            .api_timeout_secs(42)
            .build()
            .unwrap();
        assert!(format!("{c:?}").contains("api_timeout_secs: 42"));
    }

    #[test]
    fn size_threshold_mb_converts_to_bytes() {
        let c = GenerationConfig::builder()
            .size_threshold_mb(1)
            .build()
            .unwrap();
        assert_eq!(c.size_threshold_bytes, 1024 * 1024);
    }
}
