//! Per-document vector index with cosine top-k retrieval.
//!
//! Each ingested document gets its own [`DocumentIndex`], built once from
//! the document's segments and their embeddings and immutable afterwards.
//! Queries never cross documents; isolation between documents falls out of
//! the structure rather than being filtered at query time.

use crate::document::{ScoredSegment, Segment};
use crate::error::{DocIntelError, Result};

/// An immutable collection of `(segment, embedding)` pairs for one document.
#[derive(Debug)]
pub struct DocumentIndex {
    entries: Vec<IndexEntry>,
    dimensions: usize,
}

#[derive(Debug)]
struct IndexEntry {
    segment: Segment,
    embedding: Vec<f32>,
}

impl DocumentIndex {
    /// Build an index by pairing `segments` with their `embeddings`.
    ///
    /// The two slices are zipped positionally, so `embeddings[i]` must be
    /// the embedding of `segments[i]`. The dimension of the first embedding
    /// becomes the index's dimension.
    ///
    /// # Errors
    ///
    /// * [`DocIntelError::EmptyIndex`] if either input is empty.
    /// * [`DocIntelError::SegmentCountMismatch`] if the lengths differ.
    /// * [`DocIntelError::DimensionMismatch`] if any embedding's length
    ///   differs from the first one's.
    pub fn build(segments: Vec<Segment>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if segments.is_empty() || embeddings.is_empty() {
            return Err(DocIntelError::EmptyIndex);
        }
        if segments.len() != embeddings.len() {
            return Err(DocIntelError::SegmentCountMismatch {
                segments: segments.len(),
                embeddings: embeddings.len(),
            });
        }

        let dimensions = embeddings[0].len();
        for embedding in &embeddings {
            if embedding.len() != dimensions {
                return Err(DocIntelError::DimensionMismatch {
                    expected: dimensions,
                    actual: embedding.len(),
                });
            }
        }

        let entries = segments
            .into_iter()
            .zip(embeddings)
            .map(|(segment, embedding)| IndexEntry { segment, embedding })
            .collect();

        Ok(Self {
            entries,
            dimensions,
        })
    }

    /// The dimension every stored embedding has.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of indexed segments. Always at least one.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no segments. Never true after a successful
    /// [`build`](DocumentIndex::build).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the `k` segments most similar to `query`, scored by cosine
    /// similarity and sorted by descending score. Equal scores are ordered
    /// by ascending segment index, so results are deterministic. `k` is
    /// clamped to the number of stored segments.
    ///
    /// # Errors
    ///
    /// Returns [`DocIntelError::DimensionMismatch`] if `query`'s length
    /// differs from the index's dimension.
    pub fn query(&self, query: &[f32], k: usize) -> Result<Vec<ScoredSegment>> {
        if query.len() != self.dimensions {
            return Err(DocIntelError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let mut scored: Vec<ScoredSegment> = self
            .entries
            .iter()
            .map(|entry| ScoredSegment {
                segment: entry.segment.clone(),
                score: cosine_similarity(&entry.embedding, query),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.segment.index.cmp(&b.segment.index))
        });
        scored.truncate(k);

        Ok(scored)
    }
}

/// Cosine similarity between two equal-length vectors. Zero-magnitude
/// vectors score 0.0.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
