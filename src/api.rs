//! Remote completion service.
//!
//! [`CompletionApi`] is the seam between the pipeline and the network: the
//! generator only ever talks to an `Arc<dyn CompletionApi>`, so tests swap in
//! a recording mock and the binary plugs in [`OpenAiCompatibleClient`].
//!
//! The client speaks the OpenAI-style REST dialect that DeepSeek and most
//! hosted models accept:
//!
//! | Call | Endpoint |
//! |------|----------|
//! | completion | `POST {base}/chat/completions` |
//! | upload     | `POST {base}/files` (multipart `file`, `purpose`) |
//! | delete     | `DELETE {base}/files/{id}` |

use crate::config::GenerationConfig;
use crate::error::{ApiError, DatagenError};
use crate::types::DocumentKind;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Upload purpose sent with every file.
pub const UPLOAD_PURPOSE: &str = "assistants";

/// One chat message on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A provider-neutral completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: usize,
    /// Ask the service to constrain the body to a JSON object.
    pub json_response: bool,
    /// Previously uploaded files the model should read.
    pub file_ids: Vec<String>,
}

/// Operations the QA generator needs from the remote service.
#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Run one chat completion and return the assistant message text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ApiError>;

    /// Upload a document and return its file id.
    async fn upload_file(&self, path: &Path) -> Result<String, ApiError>;

    /// Delete a previously uploaded file.
    async fn delete_file(&self, file_id: &str) -> Result<(), ApiError>;
}

/// [`CompletionApi`] over an OpenAI-compatible HTTP API.
pub struct OpenAiCompatibleClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiCompatibleClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DatagenError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DatagenError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// Build a client from the run configuration.
    ///
    /// Fails with [`DatagenError::MissingApiKey`] when no key is configured.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, DatagenError> {
        let key = config.require_api_key()?;
        Self::new(
            key,
            &config.api_base,
            &config.model,
            Duration::from_secs(config.api_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn chat_body<'a>(&'a self, request: &'a CompletionRequest) -> ChatCompletionBody<'a> {
        ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request
                .json_response
                .then_some(ResponseFormat { kind: "json_object" }),
            file_ids: (!request.file_ids.is_empty()).then_some(request.file_ids.as_slice()),
        }
    }
}

#[async_trait]
impl CompletionApi for OpenAiCompatibleClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ApiError> {
        let endpoint = "chat/completions";
        debug!(
            model = %self.model,
            messages = request.messages.len(),
            files = request.file_ids.len(),
            "Sending chat completion"
        );

        let response = self
            .client
            .post(self.url(endpoint))
            .bearer_auth(&self.api_key)
            .json(&self.chat_body(request))
            .send()
            .await
            .map_err(|e| request_error(endpoint, e))?;

        let body = read_success_body(endpoint, response).await?;
        parse_chat_response(endpoint, &body)
    }

    async fn upload_file(&self, path: &Path) -> Result<String, ApiError> {
        let endpoint = "files";
        let bytes = tokio::fs::read(path).await.map_err(|e| ApiError::FileRead {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        debug!(file = %file_name, bytes = bytes.len(), "Uploading document");

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_for(path))
            .map_err(|e| ApiError::Request {
                endpoint: endpoint.to_string(),
                detail: format!("mime: {e}"),
            })?;
        let form = reqwest::multipart::Form::new()
            .text("purpose", UPLOAD_PURPOSE)
            .part("file", part);

        let response = self
            .client
            .post(self.url(endpoint))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_error(endpoint, e))?;

        let body = read_success_body(endpoint, response).await?;
        parse_file_id(endpoint, &body)
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), ApiError> {
        let endpoint = format!("files/{file_id}");
        let response = self
            .client
            .delete(self.url(&endpoint))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| request_error(&endpoint, e))?;

        read_success_body(&endpoint, response).await?;
        debug!(file_id, "Deleted uploaded file");
        Ok(())
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_ids: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileObject {
    id: String,
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn request_error(endpoint: &str, e: reqwest::Error) -> ApiError {
    let detail = if e.is_timeout() {
        format!("timed out: {e}")
    } else {
        e.to_string()
    };
    ApiError::Request {
        endpoint: endpoint.to_string(),
        detail,
    }
}

/// Return the body text of a 2xx response, or the matching [`ApiError`].
async fn read_success_body(endpoint: &str, response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ApiError::RateLimited {
            endpoint: endpoint.to_string(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| request_error(endpoint, e))?;

    if !status.is_success() {
        return Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

fn parse_chat_response(endpoint: &str, body: &str) -> Result<String, ApiError> {
    let parsed: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse {
            endpoint: endpoint.to_string(),
            detail: e.to_string(),
        })?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ApiError::InvalidResponse {
            endpoint: endpoint.to_string(),
            detail: "no message content in choices".to_string(),
        })
}

fn parse_file_id(endpoint: &str, body: &str) -> Result<String, ApiError> {
    serde_json::from_str::<FileObject>(body)
        .map(|f| f.id)
        .map_err(|e| ApiError::InvalidResponse {
            endpoint: endpoint.to_string(),
            detail: format!("missing file id: {e}"),
        })
}

fn mime_for(path: &Path) -> &'static str {
    match DocumentKind::from_path(path) {
        Some(DocumentKind::Pdf) => "application/pdf",
        Some(DocumentKind::Word) => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        None => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiCompatibleClient {
        OpenAiCompatibleClient::new(
            "sk-test",
            "http://localhost:1/v1/",
            "deepseek-chat",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn request(file_ids: Vec<String>) -> CompletionRequest {
        CompletionRequest {
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            temperature: 0.7,
            max_tokens: 8192,
            json_response: true,
            file_ids,
        }
    }

    #[test]
    fn url_joins_without_double_slash() {
        assert_eq!(
            client().url("chat/completions"),
            "http://localhost:1/v1/chat/completions"
        );
    }

    #[test]
    fn chat_body_carries_json_format_and_sampling() {
        let c = client();
        let req = request(vec![]);
        let v = serde_json::to_value(c.chat_body(&req)).unwrap();
        assert_eq!(v["model"], "deepseek-chat");
        assert_eq!(v["response_format"]["type"], "json_object");
        assert_eq!(v["max_tokens"], 8192);
        assert_eq!(v["messages"][0]["role"], "system");
        assert_eq!(v["messages"][1]["content"], "hi");
        assert!(v.get("file_ids").is_none());
        assert!((v["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn chat_body_lists_file_ids_when_present() {
        let c = client();
        let req = request(vec!["file-abc".into()]);
        let v = serde_json::to_value(c.chat_body(&req)).unwrap();
        assert_eq!(v["file_ids"][0], "file-abc");
    }

    #[test]
    fn parse_chat_response_takes_first_choice() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"[1]"}}]}"#;
        assert_eq!(parse_chat_response("chat/completions", body).unwrap(), "[1]");
    }

    #[test]
    fn parse_chat_response_rejects_empty_choices() {
        let err = parse_chat_response("chat/completions", r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse { .. }));
    }

    #[test]
    fn parse_chat_response_rejects_null_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert!(parse_chat_response("chat/completions", body).is_err());
    }

    #[test]
    fn parse_file_id_reads_id() {
        let body = r#"{"id":"file-123","object":"file","purpose":"assistants"}"#;
        assert_eq!(parse_file_id("files", body).unwrap(), "file-123");
        assert!(parse_file_id("files", "{}").is_err());
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for(Path::new("a.PDF")), "application/pdf");
        assert!(mime_for(Path::new("a.docx")).contains("wordprocessingml"));
    }

    #[test]
    fn from_config_requires_key() {
        let config = GenerationConfig::default();
        assert!(matches!(
            OpenAiCompatibleClient::from_config(&config),
            Err(DatagenError::MissingApiKey)
        ));
    }
}
