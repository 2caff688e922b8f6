//! Core data types shared across chunking, indexing, and retrieval.

use serde::{Deserialize, Serialize};

/// Opaque identifier for an ingested document.
///
/// Minted by the document store as a UUID v4 in canonical textual form, so
/// it round-trips through JSON and URLs without escaping. Callers should
/// treat it as an opaque token.
pub type DocumentId = String;

/// A contiguous window of a document's text, produced by the chunker.
///
/// Segments are ordered by `index`, which matches their position in the
/// source document. Consecutive segments overlap when the chunker's stride
/// is smaller than its window size.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    /// Zero-based position of this segment within its document.
    pub index: usize,
    /// The window's text content.
    pub text: String,
    /// Start of the window in the source text, counted in characters.
    pub source_offset: usize,
}

/// A retrieved [`Segment`] paired with its similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredSegment {
    /// The matching segment.
    pub segment: Segment,
    /// Cosine similarity in `[-1.0, 1.0]`; higher is more relevant.
    pub score: f32,
}
