//! Benchmark orchestration
//!
//! Wires the corpus, the provider adapter, and the open-loop load
//! generator together for one run. All shared handles (HTTP client,
//! concurrency gate, provider adapter) are constructed here and passed
//! down explicitly.

use crate::{
    client::{build_http_client, ProviderClient},
    config::Config,
    corpus::{Corpus, Sampler},
    error::{AppError, Result},
    executor::{build_schedule, run_open_loop, ConcurrencyGate},
    stats::{save_samples, LatencySummary},
    types::{EmbeddingKind, TaskKind},
};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// One scheduled request's payload, selected at launch time
enum Job {
    Rerank {
        query: String,
        documents: Vec<String>,
    },
    Embed {
        kind: EmbeddingKind,
        texts: Vec<String>,
    },
}

/// Execute one full benchmark run and return the latency summary.
///
/// Fails fast on corpus or sizing problems before the first request is
/// scheduled; any job failure after that aborts the whole run.
pub async fn run_benchmark(config: &Config) -> Result<LatencySummary> {
    let corpus = Corpus::load(&config.queries_path, &config.documents_path)?;
    validate_corpus_sizes(config, &corpus)?;

    let http = build_http_client(config.timeout)?;
    let gate = Arc::new(ConcurrencyGate::new(config.gate_capacity));
    let client = ProviderClient::new(config.provider, &config.credentials, http, gate)?;

    if config.verbose || config.debug {
        println!(
            "Warming up {} ({} items per request)...",
            config.provider, config.k
        );
    }
    client.warmup(config.task).await?;

    // One seeded generator drives the arrival draws first and every input
    // selection afterwards, so a fixed seed fixes the whole run.
    let mut rng = StdRng::seed_from_u64(config.seed);
    let schedule = build_schedule(config.qps, config.duration, &mut rng)?;
    let mut sampler = Sampler::from_rng(rng);

    if config.verbose || config.debug {
        println!(
            "Scheduled {} requests over {}s at {} req/s",
            schedule.len(),
            config.duration,
            config.qps
        );
    }

    let progress = launch_progress_bar(schedule.len() as u64, config.debug);

    let samples = {
        let progress = progress.clone();
        run_open_loop(&schedule, move |_| {
            progress.inc(1);
            let job = build_job(config.task, &corpus, &mut sampler, config.k);
            let client = client.clone();
            async move {
                match job? {
                    Job::Rerank { query, documents } => client.rerank(&query, &documents).await,
                    Job::Embed { kind, texts } => client.embed(kind, &texts).await,
                }
            }
        })
        .await?
    };

    progress.finish_and_clear();

    debug_assert_eq!(samples.len(), schedule.len());

    let summary = LatencySummary::from_samples(&samples)?;

    if let Some(path) = &config.save_path {
        save_samples(path, &samples)?;
        if config.verbose || config.debug {
            println!("Saved {} samples to {}", samples.len(), path.display());
        }
    }

    Ok(summary)
}

/// Select the payload for one job from the seeded sampler
fn build_job(task: TaskKind, corpus: &Corpus, sampler: &mut Sampler, k: usize) -> Result<Job> {
    match task {
        TaskKind::Rerank => Ok(Job::Rerank {
            query: sampler.choose_one(&corpus.queries)?,
            documents: sampler.choose_set(&corpus.documents, k)?,
        }),
        TaskKind::EmbedDocuments => Ok(Job::Embed {
            kind: EmbeddingKind::Document,
            texts: sampler.choose_set(&corpus.documents, k)?,
        }),
        TaskKind::EmbedQueries => Ok(Job::Embed {
            kind: EmbeddingKind::Query,
            texts: sampler.choose_set(&corpus.queries, k)?,
        }),
    }
}

/// Reject runs whose per-job item count cannot be satisfied by the corpus
fn validate_corpus_sizes(config: &Config, corpus: &Corpus) -> Result<()> {
    match config.task {
        TaskKind::Rerank | TaskKind::EmbedDocuments => {
            if config.k > corpus.document_count() {
                return Err(AppError::validation(format!(
                    "-k {} exceeds the {} available documents in {}",
                    config.k,
                    corpus.document_count(),
                    config.documents_path.display()
                )));
            }
        }
        TaskKind::EmbedQueries => {
            if config.k > corpus.query_count() {
                return Err(AppError::validation(format!(
                    "-k {} exceeds the {} available queries in {}",
                    config.k,
                    corpus.query_count(),
                    config.queries_path.display()
                )));
            }
        }
    }
    Ok(())
}

/// Progress bar over the scheduled sends; hidden in debug mode where
/// per-call prints would fight with it
fn launch_progress_bar(total: u64, debug: bool) -> ProgressBar {
    if debug {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    bar.set_message("API calls");
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::types::ProviderKind;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::{NamedTempFile, TempDir};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn write_corpus_file(items: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        let json = serde_json::to_string(items).unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    fn test_config(
        base_url: &str,
        queries: PathBuf,
        documents: PathBuf,
        task: TaskKind,
        save_path: Option<PathBuf>,
    ) -> Config {
        Config {
            provider: ProviderKind::ZeroEntropy,
            task,
            qps: 20.0,
            duration: 0.5,
            k: 1,
            save_path,
            queries_path: queries,
            documents_path: documents,
            seed: 42,
            gate_capacity: 256,
            timeout: Duration::from_secs(5),
            enable_color: false,
            verbose: false,
            debug: true,
            credentials: Credentials {
                zeroentropy_base_url: Some(base_url.to_string()),
                zeroentropy_api_key: Some("test-key".to_string()),
                ..Credentials::default()
            },
        }
    }

    async fn mock_provider() -> MockServer {
        let server = MockServer::start().await;
        for endpoint in ["/models/rerank", "/models/embed"] {
            Mock::given(method("POST"))
                .and(path(endpoint))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})),
                )
                .mount(&server)
                .await;
        }
        server
    }

    #[tokio::test]
    async fn test_run_collects_one_sample_per_scheduled_send() {
        let server = mock_provider().await;
        let queries = write_corpus_file(&["q1", "q2", "q3"]);
        let documents = write_corpus_file(&["d1", "d2", "d3"]);

        let config = test_config(
            &server.uri(),
            queries.path().to_path_buf(),
            documents.path().to_path_buf(),
            TaskKind::EmbedQueries,
            None,
        );

        let summary = run_benchmark(&config).await.unwrap();

        // The schedule for this seed/rate/duration is deterministic
        let mut rng = StdRng::seed_from_u64(config.seed);
        let expected = build_schedule(config.qps, config.duration, &mut rng).unwrap();
        assert_eq!(summary.sample_count, expected.len());
        assert!(summary.mean_secs > 0.0);
    }

    #[tokio::test]
    async fn test_run_saves_raw_samples() {
        let server = mock_provider().await;
        let queries = write_corpus_file(&["q1", "q2"]);
        let documents = write_corpus_file(&["d1", "d2"]);
        let out_dir = TempDir::new().unwrap();
        let save_path = out_dir.path().join("latencies.json");

        let config = test_config(
            &server.uri(),
            queries.path().to_path_buf(),
            documents.path().to_path_buf(),
            TaskKind::Rerank,
            Some(save_path.clone()),
        );

        let summary = run_benchmark(&config).await.unwrap();

        let raw = std::fs::read_to_string(&save_path).unwrap();
        let samples: Vec<f64> = serde_json::from_str(&raw).unwrap();
        assert_eq!(samples.len(), summary.sample_count);
    }

    #[tokio::test]
    async fn test_run_aborts_on_provider_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/embed"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let queries = write_corpus_file(&["q1"]);
        let documents = write_corpus_file(&["d1"]);

        let config = test_config(
            &server.uri(),
            queries.path().to_path_buf(),
            documents.path().to_path_buf(),
            TaskKind::EmbedQueries,
            None,
        );

        // The warmup call already hits the failing endpoint
        let err = run_benchmark(&config).await.unwrap_err();
        assert_eq!(err.category(), "HTTP");
    }

    #[tokio::test]
    async fn test_run_fails_fast_on_missing_corpus() {
        let server = mock_provider().await;
        let documents = write_corpus_file(&["d1"]);

        let config = test_config(
            &server.uri(),
            PathBuf::from("no/such/queries.json"),
            documents.path().to_path_buf(),
            TaskKind::EmbedQueries,
            None,
        );

        let err = run_benchmark(&config).await.unwrap_err();
        assert_eq!(err.category(), "IO");
        // Nothing must have reached the provider
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_fails_fast_on_oversized_k() {
        let server = mock_provider().await;
        let queries = write_corpus_file(&["q1", "q2"]);
        let documents = write_corpus_file(&["d1", "d2"]);

        let mut config = test_config(
            &server.uri(),
            queries.path().to_path_buf(),
            documents.path().to_path_buf(),
            TaskKind::EmbedDocuments,
            None,
        );
        config.k = 10;

        let err = run_benchmark(&config).await.unwrap_err();
        assert_eq!(err.category(), "VALIDATION");
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
