//! Separator-priority text chunker with overlap.
//!
//! Splits document text into chunks of at most `chunk_size` characters,
//! trying the coarsest separator first (paragraph breaks) and falling back
//! to finer ones (newlines, commas, spaces) only where a piece would
//! otherwise exceed the budget. The trailing `chunk_overlap` characters of
//! each chunk are repeated at the start of the next so retrieval keeps
//! context across chunk boundaries.
//!
//! Pure: no side effects, deterministic over its input.

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};

/// Split separators in priority order, coarsest structural break first.
/// A line break is a stronger boundary than a comma inside a sentence, so
/// newlines rank above commas; finer separators are tried only where a
/// piece still exceeds the budget.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ",", " "];

/// Split `text` into overlapping chunks of at most `chunk_size` characters.
///
/// Empty (or whitespace-only) input produces an empty Vec. Text with no
/// usable separator is hard-split at character boundaries. All sizes are
/// measured in `char`s, never bytes.
///
/// # Errors
///
/// Returns [`Error::ChunkConfig`] if `chunk_size` is zero or
/// `chunk_overlap >= chunk_size`.
pub fn chunk_text(text: &str, opts: &ChunkingConfig) -> Result<Vec<String>> {
    if opts.chunk_size == 0 {
        return Err(Error::ChunkConfig("chunk_size must be > 0".to_string()));
    }
    if opts.chunk_overlap >= opts.chunk_size {
        return Err(Error::ChunkConfig(format!(
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            opts.chunk_overlap, opts.chunk_size
        )));
    }

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    // Reserve room for the overlap prefix so finished chunks stay within
    // chunk_size.
    let budget = opts.chunk_size - opts.chunk_overlap;

    let pieces = split_recursive(text, &SEPARATORS, budget);

    // Greedily pack pieces into segments of at most `budget` chars. Pieces
    // keep their trailing separators, so concatenation preserves the source
    // text in order.
    let mut segments: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut buf_chars = 0usize;
    for piece in &pieces {
        let piece_chars = piece.chars().count();
        if buf_chars > 0 && buf_chars + piece_chars > budget {
            if !buf.trim().is_empty() {
                segments.push(std::mem::take(&mut buf));
            } else {
                buf.clear();
            }
            buf_chars = 0;
        }
        buf.push_str(piece);
        buf_chars += piece_chars;
    }
    if !buf.trim().is_empty() {
        segments.push(buf);
    }

    // Prefix each chunk after the first with the previous chunk's tail.
    let mut chunks: Vec<String> = Vec::with_capacity(segments.len());
    for segment in segments {
        let chunk = match chunks.last() {
            Some(prev) if opts.chunk_overlap > 0 => {
                let mut c = char_suffix(prev, opts.chunk_overlap).to_string();
                c.push_str(&segment);
                c
            }
            _ => segment,
        };
        chunks.push(chunk);
    }

    Ok(chunks)
}

/// Split `text` into pieces of at most `max` chars, trying separators in
/// priority order and keeping each separator attached to the piece before it.
fn split_recursive(text: &str, seps: &[&str], max: usize) -> Vec<String> {
    if text.chars().count() <= max {
        return vec![text.to_string()];
    }

    let Some((sep, rest)) = seps.split_first() else {
        return hard_split(text, max);
    };

    let parts: Vec<&str> = text.split_inclusive(*sep).collect();
    if parts.len() == 1 {
        // Separator not present; try the next finer one.
        return split_recursive(text, rest, max);
    }

    let mut pieces = Vec::new();
    for part in parts {
        if part.chars().count() <= max {
            pieces.push(part.to_string());
        } else {
            pieces.extend(split_recursive(part, rest, max));
        }
    }
    pieces
}

/// Split at character boundaries into pieces of exactly `max` chars (the
/// last may be shorter). Used only when no separator fits within budget.
fn hard_split(text: &str, max: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::with_capacity(max);
    let mut count = 0usize;
    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == max {
            pieces.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// The last `n` chars of `s` (all of `s` if shorter), on a char boundary.
fn char_suffix(s: &str, n: usize) -> &str {
    let len = s.chars().count();
    if len <= n {
        return s;
    }
    let start = s
        .char_indices()
        .nth(len - n)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[start..]
}
