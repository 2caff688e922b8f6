//! Embedding capability.
//!
//! An [`Embedder`] maps text to fixed-dimension vectors. Implementations
//! wrap external APIs or local models; the pipeline only depends on this
//! trait, so providers can be swapped without touching retrieval logic.

use async_trait::async_trait;

use crate::error::{DocIntelError, Result};

/// Maps text to fixed-dimension embedding vectors.
///
/// Batch embedding is the primary operation because ingestion submits all
/// of a document's segments at once. Implementations must return exactly
/// one vector per input, in input order, and every vector they produce
/// must have [`dimensions`](Embedder::dimensions) elements.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per input, order preserved.
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text, used for queries.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DocIntelError::Embedding {
                provider: "embedder".to_string(),
                message: "empty batch result for a single input".to_string(),
            })
    }

    /// The number of elements in each embedding vector.
    fn dimensions(&self) -> usize;
}
