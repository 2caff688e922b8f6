//! Retrieval pipeline orchestration.
//!
//! [`RetrievalPipeline`] wires the chunker, an [`Embedder`], and the
//! [`DocumentStore`] into the two operations everything else builds on:
//! ingesting a document and retrieving context for a question. Collaborators
//! are injected through the builder; the pipeline owns no provider choices
//! and no global state.
//!
//! # Example
//!
//! ```rust,ignore
//! let pipeline = RetrievalPipeline::builder()
//!     .config(PipelineConfig::default())
//!     .embedder(Arc::new(GeminiEmbedder::from_env()?))
//!     .store(Arc::new(DocumentStore::new()))
//!     .build()?;
//!
//! let document_id = pipeline.ingest(&document_text).await?;
//! let context = pipeline.retrieve_context(&document_id, "What is the term?").await?;
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::chunking::Chunker;
use crate::config::PipelineConfig;
use crate::document::DocumentId;
use crate::embedding::Embedder;
use crate::error::{DocIntelError, Result};
use crate::index::DocumentIndex;
use crate::store::DocumentStore;

/// Chunk, embed, index, and retrieve, with all collaborators injected.
pub struct RetrievalPipeline {
    config: PipelineConfig,
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    store: Arc<DocumentStore>,
}

impl RetrievalPipeline {
    /// Create a builder for assembling a pipeline.
    pub fn builder() -> RetrievalPipelineBuilder {
        RetrievalPipelineBuilder::default()
    }

    /// The pipeline's configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Ingest a document: chunk it, embed every segment in one batch,
    /// build the document's index, and register it in the store.
    ///
    /// Returns the freshly minted document id. On any failure nothing is
    /// registered, so the store never holds a partial document.
    ///
    /// # Errors
    ///
    /// * [`DocIntelError::EmptyInput`] if `text` is empty or whitespace.
    /// * [`DocIntelError::Embedding`] if the embedder fails.
    /// * [`DocIntelError::SegmentCountMismatch`] or
    ///   [`DocIntelError::DimensionMismatch`] if the embedder's output does
    ///   not line up with the segments.
    pub async fn ingest(&self, text: &str) -> Result<DocumentId> {
        let segments = self.chunker.chunk(text)?;
        let segment_count = segments.len();

        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        let embeddings = self.embedder.embed(&texts).await?;

        let index = DocumentIndex::build(segments, embeddings)?;
        let document_id = self.store.register(index).await;

        info!(document_id = %document_id, segment_count, "ingested document");
        Ok(document_id)
    }

    /// Retrieve the configured number of context passages for `question`
    /// from the document registered under `document_id`.
    ///
    /// Passages are the texts of the best-matching segments, ordered by
    /// descending similarity.
    ///
    /// # Errors
    ///
    /// * [`DocIntelError::EmptyInput`] if `question` is empty or whitespace.
    /// * [`DocIntelError::DocumentNotFound`] if `document_id` is unknown.
    /// * [`DocIntelError::Embedding`] if embedding the question fails.
    pub async fn retrieve_context(&self, document_id: &str, question: &str) -> Result<Vec<String>> {
        self.retrieve_context_top_k(document_id, question, self.config.top_k)
            .await
    }

    /// Like [`retrieve_context`](RetrievalPipeline::retrieve_context) with
    /// an explicit `top_k` override.
    pub async fn retrieve_context_top_k(
        &self,
        document_id: &str,
        question: &str,
        top_k: usize,
    ) -> Result<Vec<String>> {
        if question.trim().is_empty() {
            return Err(DocIntelError::EmptyInput);
        }

        // Resolve the document before spending an embedding call on the
        // question; unknown ids must fail the same way whether or not the
        // embedder is reachable.
        let index = self.store.lookup(document_id).await?;
        let query = self.embedder.embed_one(question).await?;
        let matches = index.query(&query, top_k)?;

        debug!(
            document_id,
            matches = matches.len(),
            "retrieved context passages"
        );
        Ok(matches.into_iter().map(|m| m.segment.text).collect())
    }

    /// Remove the document registered under `document_id`, if present.
    pub async fn discard(&self, document_id: &str) {
        self.store.remove(document_id).await;
    }
}

/// Builder for [`RetrievalPipeline`].
#[derive(Default)]
pub struct RetrievalPipelineBuilder {
    config: Option<PipelineConfig>,
    embedder: Option<Arc<dyn Embedder>>,
    store: Option<Arc<DocumentStore>>,
}

impl RetrievalPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedder.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the document store.
    pub fn store(mut self, store: Arc<DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`DocIntelError::Config`] if any collaborator is missing or
    /// the configuration's chunking parameters are invalid.
    pub fn build(self) -> Result<RetrievalPipeline> {
        let config = self
            .config
            .ok_or_else(|| DocIntelError::Config("config is required".to_string()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| DocIntelError::Config("embedder is required".to_string()))?;
        let store = self
            .store
            .ok_or_else(|| DocIntelError::Config("store is required".to_string()))?;

        let chunker = Chunker::new(config.chunk_size, config.chunk_stride)?;

        Ok(RetrievalPipeline {
            config,
            chunker,
            embedder,
            store,
        })
    }
}
