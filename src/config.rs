//! Configuration for the retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::chunking::{DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_STRIDE};
use crate::error::{DocIntelError, Result};

/// Default number of segments retrieved per query.
pub const DEFAULT_TOP_K: usize = 5;

/// Tunable parameters for chunking and retrieval.
///
/// The defaults match the service's documented behavior: 1000-character
/// windows advancing 800 characters per step, with the top 5 segments
/// retrieved per question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Window size for chunking, in characters.
    pub chunk_size: usize,
    /// Stride between windows, in characters.
    pub chunk_stride: usize,
    /// Number of segments retrieved per query.
    pub top_k: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_stride: DEFAULT_CHUNK_STRIDE,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl PipelineConfig {
    /// Create a builder for custom configurations.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for [`PipelineConfig`] with validation.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the chunk window size in characters.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size;
        self
    }

    /// Set the stride between chunk windows in characters.
    pub fn chunk_stride(mut self, chunk_stride: usize) -> Self {
        self.config.chunk_stride = chunk_stride;
        self
    }

    /// Set the number of segments retrieved per query.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DocIntelError::Config`] if the stride is zero or exceeds
    /// the chunk size, or if `top_k` is zero.
    pub fn build(self) -> Result<PipelineConfig> {
        if self.config.chunk_stride == 0 {
            return Err(DocIntelError::Config(
                "chunk stride must be greater than zero".to_string(),
            ));
        }
        if self.config.chunk_stride > self.config.chunk_size {
            return Err(DocIntelError::Config(format!(
                "chunk stride ({}) must not exceed chunk size ({})",
                self.config.chunk_stride, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(DocIntelError::Config(
                "top_k must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PipelineConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_stride, 800);
        assert_eq!(config.top_k, 5);
    }

    #[test]
    fn builder_applies_overrides() {
        let config = PipelineConfig::builder()
            .chunk_size(256)
            .chunk_stride(128)
            .top_k(3)
            .build()
            .unwrap();

        assert_eq!(config.chunk_size, 256);
        assert_eq!(config.chunk_stride, 128);
        assert_eq!(config.top_k, 3);
    }

    #[test]
    fn builder_rejects_invalid_stride() {
        assert!(PipelineConfig::builder().chunk_stride(0).build().is_err());
        assert!(
            PipelineConfig::builder()
                .chunk_size(100)
                .chunk_stride(200)
                .build()
                .is_err()
        );
    }

    #[test]
    fn builder_rejects_zero_top_k() {
        assert!(PipelineConfig::builder().top_k(0).build().is_err());
    }
}
