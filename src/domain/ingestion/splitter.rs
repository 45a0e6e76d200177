//! Recursive character text splitter.
//!
//! Splits on the coarsest separator present, merges the pieces back into
//! windows of at most `chunk_size` characters with `chunk_overlap`
//! characters carried between neighbours, and recurses into any piece that
//! is still too long using the next finer separator.

use std::collections::VecDeque;

use crate::domain::foundation::ValidationError;

pub const DEFAULT_CHUNK_SIZE: usize = 800;
pub const DEFAULT_CHUNK_OVERLAP: usize = 150;
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

impl TextSplitter {
    pub fn new(
        chunk_size: usize,
        chunk_overlap: usize,
        separators: &[&str],
    ) -> Result<Self, ValidationError> {
        if chunk_size == 0 {
            return Err(ValidationError::invalid_format(
                "chunk_size",
                "must be greater than zero",
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(ValidationError::invalid_format(
                "chunk_overlap",
                "must be smaller than chunk_size",
            ));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: separators
                .iter()
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect(),
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Splits `text` into trimmed, non-empty chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        self.split_recursive(text, &self.separators, &mut chunks);
        chunks
    }

    fn split_recursive(&self, text: &str, separators: &[String], out: &mut Vec<String>) {
        let Some(index) = separators.iter().position(|s| text.contains(s.as_str())) else {
            self.hard_split(text, out);
            return;
        };
        let separator = separators[index].as_str();
        let finer = &separators[index + 1..];

        let mut fitting: Vec<String> = Vec::new();
        for piece in text.split_inclusive(separator) {
            if char_len(piece) <= self.chunk_size {
                fitting.push(piece.to_string());
            } else {
                if !fitting.is_empty() {
                    self.merge(std::mem::take(&mut fitting), out);
                }
                self.split_recursive(piece, finer, out);
            }
        }
        if !fitting.is_empty() {
            self.merge(fitting, out);
        }
    }

    fn merge(&self, pieces: Vec<String>, out: &mut Vec<String>) {
        let mut window: VecDeque<(String, usize)> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = char_len(&piece);
            if total + len > self.chunk_size && !window.is_empty() {
                emit(&window, out);
                while total > self.chunk_overlap || (total > 0 && total + len > self.chunk_size) {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }
            total += len;
            window.push_back((piece, len));
        }

        if !window.is_empty() {
            emit(&window, out);
        }
    }

    /// Last resort for text without any separator: fixed-width windows.
    fn hard_split(&self, text: &str, out: &mut Vec<String>) {
        let chars: Vec<char> = text.chars().collect();
        for window in chars.chunks(self.chunk_size) {
            let chunk: String = window.iter().collect();
            let trimmed = chunk.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        }
    }
}

fn emit(window: &VecDeque<(String, usize)>, out: &mut Vec<String>) {
    let joined: String = window.iter().map(|(piece, _)| piece.as_str()).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}
