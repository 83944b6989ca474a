//! Chunking: split document text into overlapping, size-bounded slices.
//!
//! Every chunk is a verbatim slice of the input. Chunk `i > 0` starts with
//! the last `overlap` chars of the text preceding it, so a sentence cut at a
//! boundary is still seen whole by at least one request, and dropping each
//! chunk's `overlap` prefix reassembles the input exactly.
//!
//! ## Where to cut
//!
//! Within the room left for new text, the cut goes after the last
//!
//! 1. paragraph break (`"\n\n"`),
//! 2. sentence end (`.`, `!`, `?` followed by whitespace, or `。！？`),
//! 3. whitespace char,
//!
//! whichever level first yields a position in the back half of the window.
//! Failing all three the window is cut at its hard limit, so no chunk ever
//! exceeds `chunk_size` chars.

use crate::types::TextChunk;

/// Split `text` into chunks of at most `chunk_size` chars sharing `overlap`
/// chars with their predecessor.
///
/// Pure: identical input and parameters always give identical output.
/// `overlap` is clamped below `chunk_size`; empty text gives no chunks.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<TextChunk> {
    let chunk_size = chunk_size.max(1);
    let overlap = overlap.min(chunk_size - 1);

    // Byte offset of every char, plus the end of the string.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let total = bounds.len() - 1;

    let mut chunks = Vec::new();
    let mut fresh_start = 0;
    while fresh_start < total {
        let lead = if chunks.is_empty() {
            0
        } else {
            overlap.min(fresh_start)
        };
        let start = fresh_start - lead;
        let limit = (fresh_start + chunk_size - lead).min(total);
        let end = if limit == total {
            total
        } else {
            find_cut(text, &bounds, fresh_start, limit)
        };

        chunks.push(TextChunk {
            index: chunks.len(),
            text: text[bounds[start]..bounds[end]].to_string(),
            start,
            overlap: lead,
        });
        fresh_start = end;
    }
    chunks
}

/// Pick the char index in `(from, limit]` to end the current chunk at.
fn find_cut(text: &str, bounds: &[usize], from: usize, limit: usize) -> usize {
    let base = bounds[from];
    let window = &text[base..bounds[limit]];
    let floor = bounds[from + (limit - from) / 2] - base;
    let acceptable = |cut: &usize| *cut > 0 && *cut >= floor;

    let cut = paragraph_cut(window)
        .filter(acceptable)
        .or_else(|| sentence_cut(window).filter(acceptable))
        .or_else(|| whitespace_cut(window).filter(acceptable));

    match cut {
        Some(byte) => bounds
            .binary_search(&(base + byte))
            .unwrap_or_else(|i| i),
        None => limit,
    }
}

fn paragraph_cut(window: &str) -> Option<usize> {
    window.rfind("\n\n").map(|i| i + 2)
}

fn sentence_cut(window: &str) -> Option<usize> {
    let mut last = None;
    let mut chars = window.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let end = i + c.len_utf8();
        match c {
            '。' | '！' | '？' => last = Some(end),
            '.' | '!' | '?' => {
                if let Some(&(_, next)) = chars.peek() {
                    if next.is_whitespace() {
                        last = Some(end + next.len_utf8());
                    }
                }
            }
            _ => {}
        }
    }
    last
}

fn whitespace_cut(window: &str) -> Option<usize> {
    window
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
}
