//! QA generation: one completion request per chunk, or one per uploaded file.
//!
//! All prompt text comes from [`crate::prompts`] and all shape-guessing from
//! [`super::normalize`]; this module only assembles requests and sequences
//! the remote calls. Errors are returned, never swallowed here, so the
//! orchestrator can log them and record the reason before moving on.

use super::normalize;
use crate::api::{ChatMessage, CompletionApi, CompletionRequest};
use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::prompts;
use crate::types::{QaPair, TextChunk};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Generates QA pairs through a [`CompletionApi`].
pub struct QaGenerator {
    api: Arc<dyn CompletionApi>,
    temperature: f32,
    max_tokens: usize,
    direct_prompt: String,
    upload_prompt: String,
}

impl QaGenerator {
    pub fn new(api: Arc<dyn CompletionApi>, config: &GenerationConfig) -> Self {
        Self {
            api,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            direct_prompt: prompts::direct_system_prompt(
                config.direct_pairs_target,
                &config.answer_language,
            ),
            upload_prompt: prompts::upload_system_prompt(
                config.upload_pairs_target,
                &config.answer_language,
            ),
        }
    }

    /// Direct mode: send the chunk text inline.
    pub async fn generate_from_chunk(
        &self,
        chunk: &TextChunk,
    ) -> Result<Vec<QaPair>, GenerationError> {
        let request = self.request(
            &self.direct_prompt,
            prompts::direct_user_message(&chunk.text),
            Vec::new(),
        );
        let body = self.api.complete(&request).await?;
        let pairs = normalize::parse_response(&body)?;
        debug!("Chunk {}: {} QA pairs", chunk.index + 1, pairs.len());
        Ok(pairs)
    }

    /// File-upload mode: upload the document, ask about it, then delete it.
    ///
    /// Once the upload has succeeded the delete call is made whatever happens
    /// next; a failed delete is logged and does not affect the result.
    pub async fn generate_from_file(&self, path: &Path) -> Result<Vec<QaPair>, GenerationError> {
        let file_id = self.api.upload_file(path).await?;
        debug!("Uploaded {} as {}", path.display(), file_id);

        let result = self.complete_for_file(&file_id).await;

        if let Err(e) = self.api.delete_file(&file_id).await {
            warn!("Failed to delete uploaded file {}: {}", file_id, e);
        }
        result
    }

    async fn complete_for_file(&self, file_id: &str) -> Result<Vec<QaPair>, GenerationError> {
        let request = self.request(
            &self.upload_prompt,
            prompts::UPLOAD_USER_MESSAGE.to_string(),
            vec![file_id.to_string()],
        );
        let body = self.api.complete(&request).await?;
        normalize::parse_response(&body)
    }

    fn request(&self, system: &str, user: String, file_ids: Vec<String>) -> CompletionRequest {
        CompletionRequest {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            json_response: true,
            file_ids,
        }
    }
}
