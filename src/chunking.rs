//! Sliding-window text chunking.
//!
//! Splits document text into fixed-size overlapping segments. Windows are
//! measured in characters, not bytes, so multi-byte text never gets cut
//! mid-codepoint. Each window starts `stride` characters after the
//! previous one; with `stride < size` consecutive segments share a
//! `size - stride` character overlap, which keeps sentences that straddle
//! a boundary retrievable from at least one segment.

use crate::document::Segment;
use crate::error::{DocIntelError, Result};

/// Default window size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default stride in characters (800 stride on a 1000 window gives a 200
/// character overlap).
pub const DEFAULT_CHUNK_STRIDE: usize = 800;

/// Splits text into overlapping fixed-size segments.
///
/// # Example
///
/// ```rust,ignore
/// let chunker = Chunker::new(1000, 800)?;
/// let segments = chunker.chunk(&document_text)?;
/// ```
#[derive(Debug, Clone)]
pub struct Chunker {
    size: usize,
    stride: usize,
}

impl Chunker {
    /// Create a chunker with the given window `size` and `stride`, both in
    /// characters.
    ///
    /// # Errors
    ///
    /// Returns [`DocIntelError::Config`] if `stride` is zero (the window
    /// would never advance) or greater than `size` (text between windows
    /// would be skipped entirely).
    pub fn new(size: usize, stride: usize) -> Result<Self> {
        if stride == 0 {
            return Err(DocIntelError::Config(
                "chunk stride must be greater than zero".to_string(),
            ));
        }
        if stride > size {
            return Err(DocIntelError::Config(format!(
                "chunk stride ({stride}) must not exceed chunk size ({size})"
            )));
        }
        Ok(Self { size, stride })
    }

    /// The window size in characters.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The stride in characters.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Split `text` into overlapping segments.
    ///
    /// Windows are placed at character offsets `0, stride, 2 * stride, ...`
    /// and each spans up to `size` characters. The final window is the
    /// first one whose end reaches the end of the text, so every character
    /// is covered and no window is redundant. Text no longer than `size`
    /// produces exactly one segment.
    ///
    /// # Errors
    ///
    /// Returns [`DocIntelError::EmptyInput`] if `text` is empty or
    /// whitespace-only.
    pub fn chunk(&self, text: &str) -> Result<Vec<Segment>> {
        if text.trim().is_empty() {
            return Err(DocIntelError::EmptyInput);
        }

        // Byte offset of each character, plus the end of the text, so
        // windows measured in characters can slice the source directly.
        let char_to_byte: Vec<usize> = text
            .char_indices()
            .map(|(byte_offset, _)| byte_offset)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = char_to_byte.len() - 1;

        let mut segments = Vec::new();
        let mut offset = 0;
        loop {
            let end = (offset + self.size).min(char_count);
            segments.push(Segment {
                index: segments.len(),
                text: text[char_to_byte[offset]..char_to_byte[end]].to_string(),
                source_offset: offset,
            });
            if end == char_count {
                break;
            }
            offset += self.stride;
        }

        Ok(segments)
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            size: DEFAULT_CHUNK_SIZE,
            stride: DEFAULT_CHUNK_STRIDE,
        }
    }
}
