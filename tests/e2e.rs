//! End-to-end tests against a live OpenAI-compatible service.
//!
//! These make real API calls and cost tokens. They are gated behind the
//! `E2E_ENABLED` environment variable (and need `DEEPSEEK_API_KEY`) so they do
//! not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 DEEPSEEK_API_KEY=sk-... cargo test --test e2e -- --nocapture
//!
//! Point at another provider with `DEEPSEEK_API_BASE` and `DOC2SFT_MODEL`.

use doc2sft::api::{ChatMessage, CompletionApi, CompletionRequest};
use doc2sft::{generate, GenerationConfig, OpenAiCompatibleClient, ProcessingMode};
use docx_rs::{Docx, Paragraph, Run};
use std::path::Path;
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless E2E_ENABLED and an API key are both set.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        match std::env::var("DEEPSEEK_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => {
                println!("SKIP — DEEPSEEK_API_KEY is not set");
                return;
            }
        }
    }};
}

fn live_config(key: &str, input: &Path, output: &Path) -> GenerationConfig {
    let mut builder = GenerationConfig::builder()
        .api_key(key)
        .input_dir(input)
        .output_dir(output)
        .request_delay_ms(500)
        .api_timeout_secs(180);
    if let Ok(base) = std::env::var("DEEPSEEK_API_BASE") {
        builder = builder.api_base(base);
    }
    if let Ok(model) = std::env::var("DOC2SFT_MODEL") {
        builder = builder.model(model);
    }
    builder.build().unwrap()
}

fn write_docx(path: &Path, paragraphs: &[&str]) {
    let mut docx = Docx::new();
    for text in paragraphs {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
    }
    docx.build().pack(std::fs::File::create(path).unwrap()).unwrap();
}

const PASSAGE: &[&str] = &[
    "The Rhine is one of the major rivers of Europe. It rises in the Swiss Alps \
     and flows roughly 1,230 kilometres to the North Sea in the Netherlands.",
    "For centuries the river has been a busy shipping route. Barges carry coal, \
     grain and containers between Basel, Strasbourg, Cologne and Rotterdam.",
    "Since the 1980s water quality has improved markedly, and salmon have been \
     reintroduced to several tributaries.",
];

// ── Raw client ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_completion_returns_json_object() {
    let key = e2e_skip_unless_ready!();
    let dir = tempfile::tempdir().unwrap();
    let config = live_config(&key, dir.path(), dir.path());
    let client = OpenAiCompatibleClient::from_config(&config).unwrap();

    let request = CompletionRequest {
        messages: vec![
            ChatMessage::system("Reply with a JSON object {\"ok\": true} and nothing else."),
            ChatMessage::user("Respond now in JSON."),
        ],
        temperature: 0.0,
        max_tokens: 64,
        json_response: true,
        file_ids: Vec::new(),
    };
    let body = client.complete(&request).await.unwrap();
    println!("body: {body}");
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(value.is_object());
}

#[tokio::test]
async fn test_bad_key_is_reported_as_status_error() {
    let _ = e2e_skip_unless_ready!();
    let dir = tempfile::tempdir().unwrap();
    let config = live_config("sk-invalid-key", dir.path(), dir.path());
    let client = OpenAiCompatibleClient::from_config(&config).unwrap();

    let request = CompletionRequest {
        messages: vec![ChatMessage::user("hello")],
        temperature: 0.0,
        max_tokens: 8,
        json_response: false,
        file_ids: Vec::new(),
    };
    let err = client.complete(&request).await.unwrap_err();
    println!("error: {err}");
    assert!(matches!(
        err,
        doc2sft::ApiError::Status { status: 401, .. } | doc2sft::ApiError::Status { status: 403, .. }
    ));
}

// ── Full pipeline ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_generate_from_word_document() {
    let key = e2e_skip_unless_ready!();
    let root = tempfile::tempdir().unwrap();
    let input = root.path().join("in");
    let output = root.path().join("out");
    std::fs::create_dir(&input).unwrap();
    write_docx(&input.join("rhine.docx"), PASSAGE);

    let config = live_config(&key, &input, &output);
    let client = OpenAiCompatibleClient::from_config(&config).unwrap();
    let report = generate(&config, Arc::new(client)).await.unwrap();

    println!("{}", serde_json::to_string_pretty(&report).unwrap());
    let doc = &report.documents[0];
    assert_eq!(doc.mode, ProcessingMode::Direct { chunks: 1 });
    assert!(doc.pairs > 0, "no pairs: {:?}", doc.failures);

    let content = std::fs::read_to_string(output.join("rhine.txt")).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2 * doc.pairs);
    for (i, line) in lines.iter().enumerate() {
        let role = if i % 2 == 0 { "user" } else { "assistant" };
        assert_eq!(line["role"], role);
        assert!(!line["content"].as_str().unwrap().is_empty());
    }
}
