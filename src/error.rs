//! Error types for the `docintel` crate.

use thiserror::Error;

/// Errors that can occur during document ingestion, retrieval, and answering.
///
/// Every failure propagates to the caller with its kind intact; nothing in
/// this crate catches-and-suppresses or retries. The request layer maps
/// kinds to HTTP statuses without inspecting message text.
#[derive(Debug, Error)]
pub enum DocIntelError {
    /// The input contained no usable text after trimming whitespace.
    #[error("no usable text in input")]
    EmptyInput,

    /// An embedding's length differed from the established dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension the index was built with (or is being built with).
        expected: usize,
        /// The offending embedding's length.
        actual: usize,
    },

    /// An index build was attempted with zero segments.
    #[error("cannot build an index from zero segments")]
    EmptyIndex,

    /// The embedder returned a different number of embeddings than inputs.
    #[error("segment/embedding count mismatch: {segments} segments, {embeddings} embeddings")]
    SegmentCountMismatch {
        /// Number of segments submitted for embedding.
        segments: usize,
        /// Number of embeddings the embedder returned.
        embeddings: usize,
    },

    /// No document is registered under the given identifier.
    #[error("document not found or session expired: {0}")]
    DocumentNotFound(String),

    /// The embedding collaborator failed.
    #[error("embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The generation collaborator failed.
    #[error("generation error ({provider}): {message}")]
    Generation {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The model's analysis reply was not the contracted JSON object.
    #[error("malformed analysis output: {0}")]
    Analysis(String),

    /// A configuration validation error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// A convenience result type for docintel operations.
pub type Result<T> = std::result::Result<T, DocIntelError>;
