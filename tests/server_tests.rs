//! HTTP contract tests: spawn the real router on an ephemeral port and
//! drive it with a plain HTTP client. Providers are deterministic stubs,
//! so everything runs offline.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use docintel::{
    AppState, DocumentAssistant, DocumentStore, Embedder, GenerationGateway, PipelineConfig,
    Result, RetrievalPipeline, app_router,
};

const DIMENSIONS: usize = 32;

struct MockEmbedder;

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let hash = text
                    .bytes()
                    .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
                let mut vector = vec![0.0f32; DIMENSIONS];
                for (i, value) in vector.iter_mut().enumerate() {
                    // Mix in integer space; casting first would round the
                    // dimension offset away for large hashes.
                    let mixed = hash ^ (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                    *value = ((mixed % 100_000) as f32).sin();
                }
                vector
            })
            .collect())
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }
}

const ANALYSIS_REPLY: &str = r#"{"summary":"A services agreement between a vendor and a client.","key_points":["Payment is due net thirty."],"risks":["Liability is uncapped."]}"#;
const CHAT_REPLY: &str = "The provided excerpts state the notice period is sixty days.";

/// Replies with a canned analysis for analysis prompts and a canned
/// answer for chat prompts.
struct ScriptedGateway;

#[async_trait]
impl GenerationGateway for ScriptedGateway {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if prompt.contains("<document_text>") {
            Ok(ANALYSIS_REPLY.to_string())
        } else {
            Ok(CHAT_REPLY.to_string())
        }
    }
}

/// Always fails, for exercising the internal-error path.
struct OfflineGateway;

#[async_trait]
impl GenerationGateway for OfflineGateway {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(docintel::DocIntelError::Generation {
            provider: "offline".to_string(),
            message: "model unavailable".to_string(),
        })
    }
}

async fn spawn_server_with(
    gateway: Arc<dyn GenerationGateway>,
) -> (String, tokio::task::JoinHandle<()>) {
    let store = Arc::new(DocumentStore::new());
    let pipeline = Arc::new(
        RetrievalPipeline::builder()
            .config(PipelineConfig::default())
            .embedder(Arc::new(MockEmbedder))
            .store(Arc::clone(&store))
            .build()
            .unwrap(),
    );
    let assistant = Arc::new(DocumentAssistant::new(Arc::clone(&pipeline), gateway));
    let state = AppState {
        pipeline,
        assistant,
        store,
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app_router(state);
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), handle)
}

async fn spawn_server() -> (String, tokio::task::JoinHandle<()>) {
    spawn_server_with(Arc::new(ScriptedGateway)).await
}

fn sample_document() -> String {
    let mut text = String::new();
    let mut clause = 0;
    while text.len() < 2500 {
        clause += 1;
        text.push_str(&format!(
            "Section {clause} sets the obligations for milestone {clause}. "
        ));
    }
    text
}

#[tokio::test]
async fn health_reports_status_and_document_count() {
    let (base, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    for path in ["/", "/health"] {
        let resp = client.get(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "docintel");
        assert_eq!(body["documents"], 0);
    }

    handle.abort();
}

#[tokio::test]
async fn ingest_then_query_returns_context() {
    let (base, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/ingest"))
        .json(&json!({"text": sample_document()}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let document_id = body["document_id"].as_str().unwrap().to_string();
    assert!(!document_id.is_empty());

    let resp = client
        .post(format!("{base}/query"))
        .json(&json!({
            "document_id": document_id,
            "question": "What does section one require?",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let context = body["context"].as_array().unwrap();
    assert!(!context.is_empty());
    assert!(context.len() <= 5);

    handle.abort();
}

#[tokio::test]
async fn query_honors_top_k_override() {
    let (base, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/ingest"))
        .json(&json!({"text": sample_document()}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let document_id = body["document_id"].as_str().unwrap().to_string();

    let resp = client
        .post(format!("{base}/query"))
        .json(&json!({
            "document_id": document_id,
            "question": "What does section one require?",
            "top_k": 1,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["context"].as_array().unwrap().len(), 1);

    handle.abort();
}

#[tokio::test]
async fn zero_top_k_is_a_bad_request() {
    let (base, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/ingest"))
        .json(&json!({"text": sample_document()}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let document_id = body["document_id"].as_str().unwrap().to_string();

    let resp = client
        .post(format!("{base}/query"))
        .json(&json!({
            "document_id": document_id,
            "question": "What does section one require?",
            "top_k": 0,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "top_k must be greater than zero");

    handle.abort();
}

#[tokio::test]
async fn ingesting_empty_text_is_a_bad_request() {
    let (base, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/ingest"))
        .json(&json!({"text": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "no usable text in input");

    handle.abort();
}

#[tokio::test]
async fn querying_an_unknown_document_is_not_found() {
    let (base, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/query"))
        .json(&json!({
            "document_id": "b6f3c1d0-0000-0000-0000-000000000000",
            "question": "Anything in here?",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("not found or session expired")
    );

    handle.abort();
}

#[tokio::test]
async fn analyze_then_chat_round_trip() {
    let (base, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/analyze"))
        .json(&json!({"text": sample_document()}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["summary"],
        "A services agreement between a vendor and a client."
    );
    assert_eq!(body["key_points"][0], "Payment is due net thirty.");
    assert_eq!(body["risks"][0], "Liability is uncapped.");
    let document_id = body["document_id"].as_str().unwrap().to_string();
    assert!(!document_id.is_empty());

    let resp = client
        .post(format!("{base}/chat"))
        .json(&json!({
            "document_id": document_id,
            "question": "What is the notice period?",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["answer"], CHAT_REPLY);

    handle.abort();
}

#[tokio::test]
async fn chatting_with_an_unknown_document_is_not_found() {
    let (base, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/chat"))
        .json(&json!({
            "document_id": "unknown-id",
            "question": "What is the notice period?",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    handle.abort();
}

#[tokio::test]
async fn gateway_failure_surfaces_as_internal_error_with_generic_body() {
    let (base, handle) = spawn_server_with(Arc::new(OfflineGateway)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/analyze"))
        .json(&json!({"text": sample_document()}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "An internal server error occurred.");

    handle.abort();
}

#[tokio::test]
async fn malformed_request_bodies_are_client_errors() {
    let (base, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    // Not JSON at all.
    let resp = client
        .post(format!("{base}/ingest"))
        .header("content-type", "application/json")
        .body("this is not json")
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_client_error());

    // JSON, but missing the required field.
    let resp = client
        .post(format!("{base}/chat"))
        .json(&json!({"question": "But which document?"}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_client_error());

    handle.abort();
}
