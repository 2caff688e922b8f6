use std::sync::Arc;

use anyhow::Context;

use docintel::assistant::DocumentAssistant;
use docintel::config::PipelineConfig;
use docintel::gemini::{GeminiEmbedder, GeminiGenerator};
use docintel::pipeline::RetrievalPipeline;
use docintel::server::{AppState, ServerConfig, run_server};
use docintel::store::DocumentStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let host = std::env::var("DOCINTEL_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("DOCINTEL_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(5000);

    let embedder = GeminiEmbedder::from_env().context("embedder init failed")?;
    let generator = GeminiGenerator::from_env().context("generator init failed")?;

    let store = Arc::new(DocumentStore::new());
    let pipeline = Arc::new(
        RetrievalPipeline::builder()
            .config(PipelineConfig::default())
            .embedder(Arc::new(embedder))
            .store(Arc::clone(&store))
            .build()
            .context("pipeline init failed")?,
    );
    let assistant = Arc::new(DocumentAssistant::new(
        Arc::clone(&pipeline),
        Arc::new(generator),
    ));

    let state = AppState {
        pipeline,
        assistant,
        store,
    };

    run_server(ServerConfig { host, port }, state).await
}
