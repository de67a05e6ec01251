//! Recursive character text splitter.
//!
//! Splits on the coarsest separator present in the text (paragraphs, lines,
//! words, then characters), merges the pieces back into chunks of at most
//! `chunk_size` characters, and carries up to `chunk_overlap` characters from
//! the end of one chunk into the start of the next.

use crate::error::{Result, VidQaError};
use std::collections::VecDeque;
use tracing::debug;

/// Default separators, coarsest first.
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splits text into overlapping chunks measured in characters.
#[derive(Debug, Clone)]
pub struct RecursiveTextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveTextSplitter {
    /// Create a splitter; the overlap must be smaller than the chunk size.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(VidQaError::Config("chunk size must be positive".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(VidQaError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split text into trimmed, non-empty chunks in document order.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut chunks = Vec::new();

        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut finer: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                finer = &separators[i + 1..];
                break;
            }
        }

        let mut good: Vec<&str> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                good.push(piece);
                continue;
            }

            if !good.is_empty() {
                chunks.extend(self.merge_splits(&good));
                good.clear();
            }
            if finer.is_empty() {
                chunks.push(piece.trim().to_string());
            } else {
                chunks.extend(self.split_recursive(piece, finer));
            }
        }

        if !good.is_empty() {
            chunks.extend(self.merge_splits(&good));
        }

        chunks.retain(|c| !c.is_empty());
        chunks
    }

    /// Greedily merge adjacent pieces into chunks, keeping an overlapping tail.
    fn merge_splits(&self, pieces: &[&str]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut current: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !current.is_empty() {
                if total > self.chunk_size {
                    debug!(
                        "Created a chunk of {} characters, longer than the limit of {}",
                        total, self.chunk_size
                    );
                }
                if let Some(doc) = join_pieces(&current) {
                    docs.push(doc);
                }

                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match current.pop_front() {
                        Some((_, popped)) => total -= popped,
                        None => break,
                    }
                }
            }

            current.push_back((piece, len));
            total += len;
        }

        if let Some(doc) = join_pieces(&current) {
            docs.push(doc);
        }

        docs
    }
}

/// Split `text` before every occurrence of `separator`, keeping it on the following piece.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut last = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > last {
            pieces.push(&text[last..idx]);
        }
        last = idx;
    }
    if last < text.len() {
        pieces.push(&text[last..]);
    }
    pieces
}

fn join_pieces(pieces: &VecDeque<(&str, usize)>) -> Option<String> {
    let joined: String = pieces.iter().map(|(p, _)| *p).collect();
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
