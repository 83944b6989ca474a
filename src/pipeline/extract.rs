//! Text extraction: PDF and Word documents → one plain-text string.
//!
//! Both parsers are pure Rust (`lopdf`, `docx-rs`) and CPU-bound, so the work
//! runs inside `spawn_blocking`. That also turns a parser panic on a hostile
//! file into an ordinary [`ExtractError`] instead of taking the run down.
//!
//! Layout is kept only as far as the chunker can use it: pages are separated
//! by a blank line, Word paragraphs by a newline.

use crate::error::ExtractError;
use crate::types::{Document, DocumentKind};
use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use std::path::Path;
use tracing::{debug, warn};

/// Extract the full text of a document.
///
/// An `Err` means the file could not be read or parsed at all; the caller
/// treats it as "nothing to process". A PDF page whose text cannot be decoded
/// is logged and contributes an empty page instead.
pub async fn extract_text(document: &Document) -> Result<String, ExtractError> {
    let path = document.path.clone();
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|source| ExtractError::Io {
            path: path.clone(),
            source,
        })?;

    let kind = document.kind;
    let task_path = path.clone();
    let text = tokio::task::spawn_blocking(move || match kind {
        DocumentKind::Pdf => pdf_text(&task_path, &bytes),
        DocumentKind::Word => docx_text(&task_path, &bytes),
    })
    .await
    .map_err(|e| ExtractError::Internal {
        path: path.clone(),
        detail: e.to_string(),
    })??;

    debug!(
        "Extracted {} chars from {}",
        text.chars().count(),
        path.display()
    );
    Ok(text)
}

/// Text of every page in order, each followed by `"\n\n"`.
pub fn pdf_text(path: &Path, bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| ExtractError::CorruptPdf {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let pages = doc.get_pages();
    let mut text = String::new();
    for page_number in pages.keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => warn!(
                "{}: page {} has no extractable text: {}",
                path.display(),
                page_number,
                e
            ),
        }
        text.push_str("\n\n");
    }
    Ok(text)
}

/// Text of every body paragraph in order, each followed by `"\n"`.
///
/// Empty paragraphs are kept as blank lines; tables and other non-paragraph
/// blocks are skipped.
pub fn docx_text(path: &Path, bytes: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractError::CorruptDocx {
        path: path.to_path_buf(),
        detail: format!("{e:?}"),
    })?;

    let mut text = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(para) = child {
            push_paragraph_text(&para.children, &mut text);
            text.push('\n');
        }
    }
    Ok(text)
}

/// Runs are concatenated without separators; hyperlinks are walked for their runs.
fn push_paragraph_text(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for rc in &run.children {
                    match rc {
                        RunChild::Text(t) => out.push_str(&t.text),
                        RunChild::Tab(_) => out.push('\t'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_paragraph_text(&link.children, out),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};
    use std::io::Cursor;

    fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = Docx::new();
        for p in paragraphs {
            let para = if p.is_empty() {
                Paragraph::new()
            } else {
                Paragraph::new().add_run(Run::new().add_text(*p))
            };
            docx = docx.add_paragraph(para);
        }
        let mut buf = Vec::new();
        docx.build().pack(&mut Cursor::new(&mut buf)).unwrap();
        buf
    }

    #[test]
    fn docx_paragraphs_one_per_line() {
        let bytes = docx_bytes(&["First paragraph.", "Second paragraph."]);
        let text = docx_text(Path::new("a.docx"), &bytes).unwrap();
        assert_eq!(text, "First paragraph.\nSecond paragraph.\n");
    }

    #[test]
    fn docx_empty_paragraph_is_blank_line() {
        let bytes = docx_bytes(&["Title", "", "Body"]);
        let text = docx_text(Path::new("a.docx"), &bytes).unwrap();
        assert_eq!(text, "Title\n\nBody\n");
    }

    #[test]
    fn docx_runs_are_concatenated() {
        let para = Paragraph::new()
            .add_run(Run::new().add_text("Hello, "))
            .add_run(Run::new().add_text("world"));
        let mut buf = Vec::new();
        Docx::new()
            .add_paragraph(para)
            .build()
            .pack(&mut Cursor::new(&mut buf))
            .unwrap();
        let text = docx_text(Path::new("a.docx"), &buf).unwrap();
        assert_eq!(text, "Hello, world\n");
    }

    #[test]
    fn garbage_docx_is_corrupt() {
        let err = docx_text(Path::new("bad.docx"), b"not a zip archive").unwrap_err();
        assert!(matches!(err, ExtractError::CorruptDocx { .. }));
    }

    #[test]
    fn garbage_pdf_is_corrupt() {
        let err = pdf_text(Path::new("bad.pdf"), b"%PDF-1.4 truncated").unwrap_err();
        assert!(matches!(err, ExtractError::CorruptPdf { .. }));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let doc = Document::new("/definitely/not/here.pdf", DocumentKind::Pdf);
        let err = extract_text(&doc).await.unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }

    #[tokio::test]
    async fn extract_text_reads_docx_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.docx");
        std::fs::write(&path, docx_bytes(&["Rust is a systems language."])).unwrap();

        let doc = Document::from_path(&path).unwrap();
        let text = extract_text(&doc).await.unwrap();
        assert_eq!(text, "Rust is a systems language.\n");
    }
}
