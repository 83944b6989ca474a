//! Run orchestration: directory in, one JSON-lines file per document out.
//!
//! Documents are processed one at a time and every remote call is awaited
//! before the next is issued. A document that yields nothing is logged and
//! recorded in the [`RunReport`]; only problems with the directories
//! themselves fail the run.

use crate::api::CompletionApi;
use crate::config::GenerationConfig;
use crate::error::DatagenError;
use crate::output::{DocumentReport, ProcessingMode, RunReport};
use crate::pipeline::{chunk, extract, format, qa::QaGenerator, write};
use crate::types::{Document, DocumentKind, QaPair};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How a document will be sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Extract text locally, chunk it, one request per chunk.
    Direct,
    /// Upload the whole file and ask about it once.
    Upload,
}

/// Files strictly larger than `threshold` bytes are uploaded.
pub fn route(size_bytes: u64, threshold: u64) -> Route {
    if size_bytes > threshold {
        Route::Upload
    } else {
        Route::Direct
    }
}

/// A discovered document with its size and intended route.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedDocument {
    #[serde(flatten)]
    pub document: Document,
    pub size_bytes: u64,
    pub route: Route,
}

/// List the supported documents in `dir`: PDFs first, then Word files, each
/// group sorted by file name. Subdirectories are not searched.
pub async fn discover_documents(dir: &Path) -> Result<Vec<Document>, DatagenError> {
    let unreadable = |source| DatagenError::InputDirUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(unreadable)?;
    let mut documents = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        let path = entry.path();
        let Some(document) = Document::from_path(&path) else {
            continue;
        };
        // Follows symlinks; a dangling link is simply not a document.
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => documents.push(document),
            Ok(_) => {}
            Err(e) => debug!("Skipping {}: {}", path.display(), e),
        }
    }

    documents.sort_by(|a, b| {
        let group = |d: &Document| d.kind == DocumentKind::Word;
        group(a)
            .cmp(&group(b))
            .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
    });
    Ok(documents)
}

/// Discover documents and decide their routes without contacting the API.
pub async fn plan(config: &GenerationConfig) -> Result<Vec<PlannedDocument>, DatagenError> {
    let documents = discover_documents(&config.input_dir).await?;
    let mut planned = Vec::with_capacity(documents.len());
    for document in documents {
        match tokio::fs::metadata(&document.path).await {
            Ok(meta) => planned.push(PlannedDocument {
                route: route(meta.len(), config.size_threshold_bytes),
                size_bytes: meta.len(),
                document,
            }),
            Err(e) => warn!("Cannot stat {}: {}", document.path.display(), e),
        }
    }
    Ok(planned)
}

/// Process every document in `config.input_dir`.
///
/// # Errors
/// Only fatal conditions are returned:
/// - the output directory cannot be created
/// - the input directory cannot be read
///
/// Everything else (extraction failures, API errors, unparseable responses,
/// a single output file that cannot be written) is logged, recorded in the
/// document's report, and the run moves on.
pub async fn generate(
    config: &GenerationConfig,
    api: Arc<dyn CompletionApi>,
) -> Result<RunReport, DatagenError> {
    let run_start = Instant::now();

    // ── Step 1: Prepare output directory ─────────────────────────────────
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .map_err(|source| DatagenError::OutputDirCreateFailed {
            path: config.output_dir.clone(),
            source,
        })?;

    // ── Step 2: Discover documents ───────────────────────────────────────
    let documents = discover_documents(&config.input_dir).await?;
    let total = documents.len();
    info!(
        "Found {} document(s) in {}",
        total,
        config.input_dir.display()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    // ── Step 3: Process sequentially ─────────────────────────────────────
    let generator = QaGenerator::new(api, config);
    let mut report = RunReport::default();
    for (i, document) in documents.iter().enumerate() {
        let position = i + 1;
        info!("[{}/{}] Processing {}", position, total, document.file_name());
        if let Some(ref cb) = config.progress_callback {
            cb.on_document_start(position, total, &document.path);
        }

        let doc_report = process_document(document, position, config, &generator).await;

        if let Some(ref cb) = config.progress_callback {
            cb.on_document_complete(position, total, &doc_report);
        }
        report.documents.push(doc_report);
    }

    // ── Step 4: Summarise ────────────────────────────────────────────────
    report.total_pairs = report.documents.iter().map(|d| d.pairs).sum();
    report.files_written = report.documents.iter().filter(|d| d.is_written()).count();
    report.duration_ms = run_start.elapsed().as_millis() as u64;
    info!(
        "Done: {} QA pair(s) written to {} file(s) in {}",
        report.total_pairs,
        report.files_written,
        config.output_dir.display()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(&report);
    }
    Ok(report)
}

async fn process_document(
    document: &Document,
    position: usize,
    config: &GenerationConfig,
    generator: &QaGenerator,
) -> DocumentReport {
    let start = Instant::now();
    let mut report = DocumentReport {
        source: document.path.clone(),
        kind: document.kind,
        size_bytes: 0,
        mode: ProcessingMode::Skipped,
        pairs: 0,
        output: None,
        failures: Vec::new(),
        duration_ms: 0,
    };

    let pairs = match tokio::fs::metadata(&document.path).await {
        Ok(meta) => {
            report.size_bytes = meta.len();
            match route(meta.len(), config.size_threshold_bytes) {
                Route::Upload => run_upload(document, config, generator, &mut report).await,
                Route::Direct => {
                    run_direct(document, position, config, generator, &mut report).await
                }
            }
        }
        Err(e) => {
            warn!("Cannot stat {}: {}", document.path.display(), e);
            report.failures.push(format!("stat: {e}"));
            Vec::new()
        }
    };

    if pairs.is_empty() {
        warn!(
            "No QA pairs generated for {}; no output written",
            document.file_name()
        );
    } else {
        let output_path = document.output_path(&config.output_dir);
        let turns = format::to_turns(&pairs);
        match write::write_records(&turns, &output_path).await {
            Ok(()) => {
                info!(
                    "Wrote {} QA pair(s) from {} to {}",
                    pairs.len(),
                    document.file_name(),
                    output_path.display()
                );
                report.pairs = pairs.len();
                report.output = Some(output_path);
            }
            Err(e) => {
                warn!("{}", e);
                report.failures.push(e.to_string());
            }
        }
    }

    report.duration_ms = start.elapsed().as_millis() as u64;
    report
}

async fn run_upload(
    document: &Document,
    config: &GenerationConfig,
    generator: &QaGenerator,
    report: &mut DocumentReport,
) -> Vec<QaPair> {
    info!(
        "{} is {} bytes; uploading whole file",
        document.file_name(),
        report.size_bytes
    );
    report.mode = ProcessingMode::Upload;

    let result = generator.generate_from_file(&document.path).await;
    pause(config).await;

    match result {
        Ok(pairs) => pairs,
        Err(e) => {
            warn!("File-upload generation failed for {}: {}", document.file_name(), e);
            report.failures.push(format!("upload: {e}"));
            Vec::new()
        }
    }
}

async fn run_direct(
    document: &Document,
    position: usize,
    config: &GenerationConfig,
    generator: &QaGenerator,
    report: &mut DocumentReport,
) -> Vec<QaPair> {
    let text = match extract::extract_text(document).await {
        Ok(text) => text,
        Err(e) => {
            warn!("{}", e);
            report.failures.push(e.to_string());
            String::new()
        }
    };
    if text.trim().is_empty() {
        warn!("No text extracted from {}; skipping", document.file_name());
        return Vec::new();
    }

    let chunks = chunk::split_text(&text, config.chunk_size, config.chunk_overlap);
    let total_chunks = chunks.len();
    debug!(
        "{}: {} chars in {} chunk(s)",
        document.file_name(),
        text.chars().count(),
        total_chunks
    );
    report.mode = ProcessingMode::Direct {
        chunks: total_chunks,
    };

    let mut pairs = Vec::new();
    for chunk in &chunks {
        let got = match generator.generate_from_chunk(chunk).await {
            Ok(chunk_pairs) => {
                let n = chunk_pairs.len();
                pairs.extend(chunk_pairs);
                n
            }
            Err(e) => {
                warn!(
                    "Chunk {}/{} of {} failed: {}",
                    chunk.index + 1,
                    total_chunks,
                    document.file_name(),
                    e
                );
                report
                    .failures
                    .push(format!("chunk {}: {e}", chunk.index + 1));
                0
            }
        };
        if let Some(ref cb) = config.progress_callback {
            cb.on_chunk_complete(position, chunk.index + 1, total_chunks, got);
        }
        pause(config).await;
    }
    pairs
}

/// Fixed post-call delay.
async fn pause(config: &GenerationConfig) {
    if config.request_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(config.request_delay_ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_is_strictly_greater_than_threshold() {
        assert_eq!(route(99, 100), Route::Direct);
        assert_eq!(route(100, 100), Route::Direct);
        assert_eq!(route(101, 100), Route::Upload);
        assert_eq!(route(0, 1), Route::Direct);
    }

    #[tokio::test]
    async fn discovery_orders_pdfs_before_word_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.docx", "z.pdf", "a.DOCX", "c.PDF", "notes.txt", "old.doc"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let names: Vec<String> = discover_documents(dir.path())
            .await
            .unwrap()
            .iter()
            .map(Document::file_name)
            .collect();
        assert_eq!(names, vec!["c.PDF", "z.pdf", "a.DOCX", "b.docx"]);
    }

    #[tokio::test]
    async fn missing_input_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_documents(&dir.path().join("absent"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatagenError::InputDirUnreadable { .. }));
    }

    #[tokio::test]
    async fn plan_routes_by_size() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("small.pdf"), vec![0u8; 10]).unwrap();
        std::fs::write(dir.path().join("large.docx"), vec![0u8; 2_000]).unwrap();

        let config = GenerationConfig::builder()
            .input_dir(dir.path())
            .size_threshold_bytes(1_000)
            .build()
            .unwrap();
        let planned = plan(&config).await.unwrap();

        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].document.file_name(), "small.pdf");
        assert_eq!(planned[0].route, Route::Direct);
        assert_eq!(planned[1].route, Route::Upload);
        assert_eq!(planned[1].size_bytes, 2_000);
    }
}
