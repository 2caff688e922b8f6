//! # docintel
//!
//! Document intelligence service: ingest extracted document text, index it
//! for semantic retrieval, and answer questions grounded only in the
//! retrieved passages.
//!
//! The flow is chunk, embed, index, retrieve. Each ingested document gets
//! its own in-memory vector index registered under a fresh id, so queries
//! never mix documents and a process restart forgets everything. Embedding
//! and generation are capabilities injected behind traits; [`gemini`]
//! provides the production implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docintel::{DocumentStore, GeminiEmbedder, PipelineConfig, RetrievalPipeline};
//!
//! let pipeline = RetrievalPipeline::builder()
//!     .config(PipelineConfig::default())
//!     .embedder(Arc::new(GeminiEmbedder::from_env()?))
//!     .store(Arc::new(DocumentStore::new()))
//!     .build()?;
//!
//! let document_id = pipeline.ingest(&document_text).await?;
//! let passages = pipeline.retrieve_context(&document_id, "What are the payment terms?").await?;
//! ```

pub mod assistant;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod gemini;
pub mod generation;
pub mod index;
pub mod pipeline;
pub mod prompts;
pub mod server;
pub mod store;

pub use assistant::{DocumentAnalysis, DocumentAssistant};
pub use chunking::Chunker;
pub use config::PipelineConfig;
pub use document::{DocumentId, ScoredSegment, Segment};
pub use embedding::Embedder;
pub use error::{DocIntelError, Result};
pub use gemini::{GeminiEmbedder, GeminiGenerator};
pub use generation::GenerationGateway;
pub use index::DocumentIndex;
pub use pipeline::RetrievalPipeline;
pub use server::{AppState, ServerConfig, app_router, run_server};
pub use store::DocumentStore;
