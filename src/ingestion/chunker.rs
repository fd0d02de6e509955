//! Text chunking with fixed-size overlapping windows
//!
//! Sizes and offsets are measured in characters (Unicode scalar values).
//! Windows prefer paragraph, then sentence, then word boundaries before
//! falling back to a hard cut, and consecutive windows share exactly
//! `chunk_overlap` characters.

use std::collections::BTreeMap;

use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::chunk::{Chunk, META_CHUNK_INDEX, META_PAGE};

/// Separator inserted between concatenated pages
const PAGE_SEPARATOR: char = '\n';

/// Text chunker with configurable size and overlap
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Characters shared between consecutive chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker.
    ///
    /// `chunk_overlap >= chunk_size` is a configuration error and is
    /// rejected here rather than at split time.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap: chunk_overlap,
        })
    }

    /// Create a chunker from configuration
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Split page-ordered document text into overlapping chunks.
    ///
    /// Pages are concatenated with a page separator before windowing, and
    /// each chunk records the 1-based page its window starts on. An empty
    /// document yields an empty sequence; a document shorter than the
    /// chunk size yields a single chunk covering the whole text.
    pub fn split(&self, pages: &[String]) -> Vec<Chunk> {
        let mut text = String::new();
        let mut page_starts: Vec<usize> = Vec::with_capacity(pages.len());
        let mut char_pos = 0usize;

        for (i, page) in pages.iter().enumerate() {
            if i > 0 {
                text.push(PAGE_SEPARATOR);
                char_pos += 1;
            }
            page_starts.push(char_pos);
            text.push_str(page);
            char_pos += page.chars().count();
        }

        if text.trim().is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let mut chunks = Vec::new();
        let mut start = 0usize;
        let mut chunk_index = 0usize;

        loop {
            let window_end = (start + self.chunk_size).min(total);
            let cut = if window_end == total {
                total
            } else {
                self.find_cut(&chars, start, window_end)
            };

            let chunk_text: String = chars[start..cut].iter().collect();
            chunks.push(Chunk::new(
                chunk_text,
                self.chunk_metadata(&page_starts, start, chunk_index),
            ));
            chunk_index += 1;

            if cut == total {
                break;
            }
            start = cut - self.overlap;
        }

        chunks
    }

    /// Pick the cut position for a window that does not reach the end of
    /// the document. Prefers paragraph, then sentence, then word
    /// boundaries; falls back to a hard cut at the window end.
    fn find_cut(&self, chars: &[char], start: usize, window_end: usize) -> usize {
        // Never cut so early that the next window makes no progress, and
        // keep boundary-adjusted chunks at least half the target size.
        let min_cut = start + (self.overlap + 1).max(self.chunk_size / 2);
        if min_cut >= window_end {
            return window_end;
        }

        let window: String = chars[start..window_end].iter().collect();
        let min_rel = min_cut - start;

        if let Some(cut) = Self::paragraph_cut(&window, min_rel) {
            return start + cut;
        }
        if let Some(cut) = Self::sentence_cut(&window, min_rel) {
            return start + cut;
        }
        if let Some(cut) = Self::word_cut(&window, min_rel) {
            return start + cut;
        }

        window_end
    }

    /// Cut after the last blank line in the window, if late enough
    fn paragraph_cut(window: &str, min_rel: usize) -> Option<usize> {
        let pos = window.rfind("\n\n")?;
        let cut = window[..pos].chars().count() + 2;
        (cut >= min_rel && cut < window.chars().count()).then_some(cut)
    }

    /// Cut after the last sentence boundary in the window, if late enough
    fn sentence_cut(window: &str, min_rel: usize) -> Option<usize> {
        let window_chars = window.chars().count();
        let mut best = None;
        let mut char_offset = 0usize;

        for sentence in window.split_sentence_bounds() {
            char_offset += sentence.chars().count();
            if char_offset >= min_rel && char_offset < window_chars {
                best = Some(char_offset);
            }
        }

        best
    }

    /// Cut after the last whitespace in the window, if late enough
    fn word_cut(window: &str, min_rel: usize) -> Option<usize> {
        let mut best = None;
        for (i, c) in window.chars().enumerate() {
            if c.is_whitespace() && i + 1 >= min_rel {
                best = Some(i + 1);
            }
        }
        best
    }

    /// Source metadata for a chunk starting at `start`
    fn chunk_metadata(
        &self,
        page_starts: &[usize],
        start: usize,
        chunk_index: usize,
    ) -> BTreeMap<String, String> {
        let page = page_starts.partition_point(|&offset| offset <= start).max(1);

        let mut metadata = BTreeMap::new();
        metadata.insert(META_PAGE.to_string(), page.to_string());
        metadata.insert(META_CHUNK_INDEX.to_string(), chunk_index.to_string());
        metadata
    }
}
