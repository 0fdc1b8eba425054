//! Provider adapters and timed HTTP calls
//!
//! Each adapter translates an abstract request (rerank: query + documents;
//! embed: kind + texts) into the provider's wire format and measures the
//! wall-clock duration of the call. The latency timer starts before the
//! concurrency gate is acquired, so queueing delay behind the gate is part
//! of the reported sample.

use crate::{
    config::Credentials,
    error::{AppError, Result},
    executor::ConcurrencyGate,
    types::{EmbeddingKind, ProviderKind, TaskKind},
};
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

const ZEROENTROPY_RERANK_MODEL: &str = "zerank-1";
const ZEROENTROPY_EMBED_MODEL: &str = "qwen/qwen3-4b";
const COHERE_MODEL: &str = "rerank-v3.5";
const JINA_RERANK_MODEL: &str = "jina-reranker-m0";
const JINA_EMBED_MODEL: &str = "jina-embeddings-v4";

const COHERE_DEFAULT_BASE_URL: &str = "https://api.cohere.com";
const JINA_DEFAULT_BASE_URL: &str = "https://api.jina.ai";

/// Build the shared HTTP client with a bounded keep-alive pool and a flat
/// global timeout
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .pool_max_idle_per_host(100)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_nodelay(true)
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))
}

/// Endpoint and authentication configuration, one variant per provider
#[derive(Debug, Clone)]
enum ProviderEndpoints {
    ZeroEntropy { base_url: String, api_key: String },
    Cohere { base_url: String, api_key: String },
    Jina { base_url: String, api_key: String },
}

/// Provider adapter holding the shared HTTP client and concurrency gate.
///
/// Constructed once at process start from the resolved configuration and
/// cloned into each benchmark job.
#[derive(Clone, Debug)]
pub struct ProviderClient {
    endpoints: ProviderEndpoints,
    http: Client,
    gate: Arc<ConcurrencyGate>,
}

impl ProviderClient {
    /// Create an adapter for the selected provider
    pub fn new(
        provider: ProviderKind,
        credentials: &Credentials,
        http: Client,
        gate: Arc<ConcurrencyGate>,
    ) -> Result<Self> {
        let endpoints = match provider {
            ProviderKind::ZeroEntropy => ProviderEndpoints::ZeroEntropy {
                base_url: normalize_base_url(
                    credentials.zeroentropy_base_url.as_deref().ok_or_else(|| {
                        AppError::auth("ZEROENTROPY_BASE_URL is required for the zeroentropy provider")
                    })?,
                ),
                api_key: credentials.zeroentropy_api_key.clone().ok_or_else(|| {
                    AppError::auth("ZEROENTROPY_API_KEY is required for the zeroentropy provider")
                })?,
            },
            ProviderKind::Cohere => ProviderEndpoints::Cohere {
                base_url: normalize_base_url(
                    credentials
                        .cohere_base_url
                        .as_deref()
                        .unwrap_or(COHERE_DEFAULT_BASE_URL),
                ),
                api_key: credentials
                    .cohere_api_key
                    .clone()
                    .ok_or_else(|| AppError::auth("COHERE_API_KEY is required for the cohere provider"))?,
            },
            ProviderKind::Jina => ProviderEndpoints::Jina {
                base_url: normalize_base_url(
                    credentials
                        .jina_base_url
                        .as_deref()
                        .unwrap_or(JINA_DEFAULT_BASE_URL),
                ),
                api_key: credentials
                    .jina_api_key
                    .clone()
                    .ok_or_else(|| AppError::auth("JINA_API_KEY is required for the jina provider"))?,
            },
        };

        Ok(Self {
            endpoints,
            http,
            gate,
        })
    }

    /// The provider this adapter talks to
    pub fn provider(&self) -> ProviderKind {
        match self.endpoints {
            ProviderEndpoints::ZeroEntropy { .. } => ProviderKind::ZeroEntropy,
            ProviderEndpoints::Cohere { .. } => ProviderKind::Cohere,
            ProviderEndpoints::Jina { .. } => ProviderKind::Jina,
        }
    }

    /// Rerank `documents` against `query`, returning the call latency in
    /// seconds (queueing behind the gate included)
    pub async fn rerank(&self, query: &str, documents: &[String]) -> Result<f64> {
        let query = nonce_prefix(query);
        let documents = nonce_prefix_all(documents);

        let started = Instant::now();
        let _permit = self.gate.acquire().await?;

        let (url, api_key, body) = match &self.endpoints {
            ProviderEndpoints::ZeroEntropy { base_url, api_key } => (
                format!("{}/models/rerank", base_url),
                api_key,
                json!({
                    "model": ZEROENTROPY_RERANK_MODEL,
                    "query": query,
                    "documents": documents,
                    "latency_mode": "fast",
                }),
            ),
            ProviderEndpoints::Cohere { base_url, api_key } => (
                format!("{}/v2/rerank", base_url),
                api_key,
                json!({
                    "model": COHERE_MODEL,
                    "query": query,
                    "documents": documents,
                }),
            ),
            ProviderEndpoints::Jina { base_url, api_key } => (
                format!("{}/v1/rerank", base_url),
                api_key,
                json!({
                    "model": JINA_RERANK_MODEL,
                    "query": query,
                    "documents": documents,
                }),
            ),
        };

        self.execute(&url, api_key, &body).await?;
        Ok(started.elapsed().as_secs_f64())
    }

    /// Embed `texts` as queries or documents, returning the call latency in
    /// seconds (queueing behind the gate included)
    pub async fn embed(&self, kind: EmbeddingKind, texts: &[String]) -> Result<f64> {
        let texts = nonce_prefix_all(texts);

        let started = Instant::now();
        let _permit = self.gate.acquire().await?;

        let (url, api_key, body) = match &self.endpoints {
            ProviderEndpoints::ZeroEntropy { base_url, api_key } => (
                format!("{}/models/embed", base_url),
                api_key,
                json!({
                    "model": ZEROENTROPY_EMBED_MODEL,
                    "embedding_type": kind.as_str(),
                    "input": texts,
                    "latency_mode": "fast",
                }),
            ),
            ProviderEndpoints::Cohere { base_url, api_key } => (
                format!("{}/v2/embed", base_url),
                api_key,
                json!({
                    "model": COHERE_MODEL,
                    "texts": texts,
                    "input_type": kind.cohere_input_type(),
                    "embedding_types": ["float"],
                }),
            ),
            ProviderEndpoints::Jina { base_url, api_key } => (
                format!("{}/v1/embed", base_url),
                api_key,
                json!({
                    "model": JINA_EMBED_MODEL,
                    "texts": texts,
                    "input_type": kind.as_str(),
                }),
            ),
        };

        self.execute(&url, api_key, &body).await?;
        Ok(started.elapsed().as_secs_f64())
    }

    /// Issue one small request to prime the TLS connection and the
    /// provider-side path; the result is discarded by the caller
    pub async fn warmup(&self, task: TaskKind) -> Result<()> {
        let inputs = vec!["4".to_string(), "1 million".to_string()];
        match task {
            TaskKind::Rerank => self.rerank("What is 2+2?", &inputs).await?,
            TaskKind::EmbedDocuments => self.embed(EmbeddingKind::Document, &inputs).await?,
            TaskKind::EmbedQueries => self.embed(EmbeddingKind::Query, &inputs).await?,
        };
        Ok(())
    }

    /// POST the request, drain the response body, and fail on any
    /// non-success status
    async fn execute(&self, url: &str, api_key: &str, body: &serde_json::Value) -> Result<()> {
        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        // Drain the body before judging the status so a sample covers the
        // full exchange
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let snippet: String = String::from_utf8_lossy(&bytes).chars().take(200).collect();
            return Err(AppError::http_request(format!(
                "{} responded {}: {}",
                url, status, snippet
            )));
        }

        Ok(())
    }
}

/// Strip trailing slashes so endpoint joins stay predictable
fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Prepend a fresh random nonce so otherwise-identical inputs can never hit
/// a server-side cache
fn nonce_prefix(text: &str) -> String {
    format!("{}{}", Uuid::new_v4(), text)
}

fn nonce_prefix_all(texts: &[String]) -> Vec<String> {
    texts.iter().map(|t| nonce_prefix(t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn zeroentropy_credentials(base_url: &str) -> Credentials {
        Credentials {
            zeroentropy_base_url: Some(base_url.to_string()),
            zeroentropy_api_key: Some("ze-test-key".to_string()),
            ..Credentials::default()
        }
    }

    fn test_client(provider: ProviderKind, credentials: &Credentials) -> ProviderClient {
        let http = build_http_client(Duration::from_secs(5)).unwrap();
        let gate = Arc::new(ConcurrencyGate::new(16));
        ProviderClient::new(provider, credentials, http, gate).unwrap()
    }

    async fn mount_ok(server: &MockServer, endpoint: &str) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(server)
            .await;
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("https://api.example.com/"), "https://api.example.com");
        assert_eq!(normalize_base_url("https://api.example.com"), "https://api.example.com");
    }

    #[test]
    fn test_nonce_prefix_keeps_suffix() {
        let prefixed = nonce_prefix("hello world");
        assert!(prefixed.ends_with("hello world"));
        assert!(prefixed.len() > "hello world".len());
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let http = build_http_client(Duration::from_secs(5)).unwrap();
        let gate = Arc::new(ConcurrencyGate::new(16));
        let err = ProviderClient::new(
            ProviderKind::Cohere,
            &Credentials::default(),
            http,
            gate,
        )
        .unwrap_err();
        assert_eq!(err.category(), "AUTH");
    }

    #[tokio::test]
    async fn test_zeroentropy_rerank_request_shape() {
        let server = MockServer::start().await;
        mount_ok(&server, "/models/rerank").await;

        let client = test_client(
            ProviderKind::ZeroEntropy,
            &zeroentropy_credentials(&server.uri()),
        );

        let documents = vec!["first doc".to_string(), "second doc".to_string()];
        let latency = client.rerank("what is rust", &documents).await.unwrap();
        assert!(latency > 0.0);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();

        assert_eq!(body["model"], "zerank-1");
        assert_eq!(body["latency_mode"], "fast");
        assert!(body["query"].as_str().unwrap().ends_with("what is rust"));
        let wire_documents = body["documents"].as_array().unwrap();
        assert_eq!(wire_documents.len(), 2);
        assert!(wire_documents[0].as_str().unwrap().ends_with("first doc"));
    }

    #[tokio::test]
    async fn test_zeroentropy_embed_request_shape() {
        let server = MockServer::start().await;
        mount_ok(&server, "/models/embed").await;

        let client = test_client(
            ProviderKind::ZeroEntropy,
            &zeroentropy_credentials(&server.uri()),
        );

        let texts = vec!["some text".to_string()];
        client.embed(EmbeddingKind::Document, &texts).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["model"], "qwen/qwen3-4b");
        assert_eq!(body["embedding_type"], "document");
        assert!(body["input"][0].as_str().unwrap().ends_with("some text"));
    }

    #[tokio::test]
    async fn test_cohere_paths_and_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/rerank"))
            .and(header("authorization", "Bearer co-test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;
        mount_ok(&server, "/v2/embed").await;

        let credentials = Credentials {
            cohere_api_key: Some("co-test-key".to_string()),
            cohere_base_url: Some(server.uri()),
            ..Credentials::default()
        };
        let client = test_client(ProviderKind::Cohere, &credentials);

        let documents = vec!["doc".to_string()];
        client.rerank("query", &documents).await.unwrap();
        client.embed(EmbeddingKind::Query, &documents).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        let embed_body: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
        assert_eq!(embed_body["input_type"], "search_query");
        assert_eq!(embed_body["embedding_types"][0], "float");
    }

    #[tokio::test]
    async fn test_jina_paths() {
        let server = MockServer::start().await;
        mount_ok(&server, "/v1/rerank").await;
        mount_ok(&server, "/v1/embed").await;

        let credentials = Credentials {
            jina_api_key: Some("jina-test-key".to_string()),
            jina_base_url: Some(server.uri()),
            ..Credentials::default()
        };
        let client = test_client(ProviderKind::Jina, &credentials);
        assert_eq!(client.provider(), ProviderKind::Jina);

        let texts = vec!["text".to_string()];
        client.rerank("query", &texts).await.unwrap();
        client.embed(EmbeddingKind::Document, &texts).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let rerank_body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let embed_body: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
        assert_eq!(rerank_body["model"], "jina-reranker-m0");
        assert_eq!(embed_body["model"], "jina-embeddings-v4");
        assert_eq!(embed_body["input_type"], "document");
    }

    #[tokio::test]
    async fn test_nonce_prefixing_defeats_caching() {
        let server = MockServer::start().await;
        mount_ok(&server, "/models/rerank").await;

        let client = test_client(
            ProviderKind::ZeroEntropy,
            &zeroentropy_credentials(&server.uri()),
        );

        let documents = vec!["same doc".to_string()];
        client.rerank("same query", &documents).await.unwrap();
        client.rerank("same query", &documents).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        let first: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let second: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();

        // Identical logical inputs must produce distinct wire payloads
        assert_ne!(first["query"], second["query"]);
        assert_ne!(first["documents"][0], second["documents"][0]);
        assert!(first["query"].as_str().unwrap().ends_with("same query"));
        assert!(second["query"].as_str().unwrap().ends_with("same query"));
    }

    #[tokio::test]
    async fn test_non_success_status_aborts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/rerank"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = test_client(
            ProviderKind::ZeroEntropy,
            &zeroentropy_credentials(&server.uri()),
        );

        let documents = vec!["doc".to_string()];
        let err = client.rerank("query", &documents).await.unwrap_err();
        assert_eq!(err.category(), "HTTP");
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_latency_includes_gate_queueing() {
        let server = MockServer::start().await;
        mount_ok(&server, "/models/rerank").await;

        let http = build_http_client(Duration::from_secs(5)).unwrap();
        let gate = Arc::new(ConcurrencyGate::new(1));
        let client = ProviderClient::new(
            ProviderKind::ZeroEntropy,
            &zeroentropy_credentials(&server.uri()),
            http,
            Arc::clone(&gate),
        )
        .unwrap();

        // Saturate the single-slot gate, then release it after 100ms
        let held = gate.acquire().await.unwrap();
        let call = {
            let client = client.clone();
            tokio::spawn(async move {
                let documents = vec!["doc".to_string()];
                client.rerank("queued query", &documents).await
            })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(held);

        let latency = call.await.unwrap().unwrap();
        assert!(
            latency >= 0.1,
            "queueing delay must be part of the sample, got {}",
            latency
        );
    }

    #[tokio::test]
    async fn test_warmup_issues_one_call_per_task() {
        let server = MockServer::start().await;
        mount_ok(&server, "/models/rerank").await;
        mount_ok(&server, "/models/embed").await;

        let client = test_client(
            ProviderKind::ZeroEntropy,
            &zeroentropy_credentials(&server.uri()),
        );

        client.warmup(TaskKind::Rerank).await.unwrap();
        client.warmup(TaskKind::EmbedQueries).await.unwrap();
        client.warmup(TaskKind::EmbedDocuments).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
    }
}
