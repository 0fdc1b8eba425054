//! Corpus fetcher - downloads the query and document corpora
//!
//! Pulls MS MARCO v1.1 train queries from the Hugging Face
//! `datasets-server` rows API and a document corpus of paper abstracts
//! from a public gist, then writes both as ordered JSON arrays of strings
//! for the benchmark runner to load.

use clap::Parser;
use rerank_latency_bench::error::{AppError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

const ROWS_ENDPOINT: &str = "https://datasets-server.huggingface.co/rows";
const QUERIES_DATASET: &str = "ms_marco";
const QUERIES_CONFIG: &str = "v1.1";
const QUERIES_SPLIT: &str = "train";
/// Maximum page size accepted by the rows API
const ROWS_PAGE_SIZE: usize = 100;

const DEFAULT_DOCUMENTS_URL: &str = "https://gist.githubusercontent.com/npip99/159681cb97319d62a54e1eb8c58181de/raw/a6d35019ad3d728ed2ddcb182f82efa164501133/abstracts.txt";

/// Corpus fetcher for the rerank/embed latency benchmark
#[derive(Parser, Debug, Clone)]
#[command(name = "rlb-fetch")]
#[command(version, about, long_about = None)]
struct FetchCli {
    /// Directory to write queries.json and documents.json into
    #[arg(long, default_value = "data")]
    output_dir: PathBuf,

    /// Number of queries to download
    #[arg(long, default_value_t = 1000)]
    query_count: usize,

    /// Override the document corpus URL (must serve a JSON array of strings)
    #[arg(long, default_value = DEFAULT_DOCUMENTS_URL)]
    documents_url: String,

    /// Request timeout in seconds
    #[arg(short, long, default_value_t = 30)]
    timeout: u64,
}

/// One page of the Hugging Face rows API response
#[derive(Debug, Deserialize)]
struct RowsResponse {
    rows: Vec<RowEntry>,
}

#[derive(Debug, Deserialize)]
struct RowEntry {
    row: MsMarcoRow,
}

#[derive(Debug, Deserialize)]
struct MsMarcoRow {
    query: String,
}

#[tokio::main]
async fn main() {
    let cli = FetchCli::parse();

    if let Err(e) = run_fetch(cli).await {
        eprintln!("{}", e.format_for_console(true));
        process::exit(e.exit_code());
    }
}

async fn run_fetch(cli: FetchCli) -> Result<()> {
    if cli.query_count == 0 {
        return Err(AppError::validation("--query-count must be at least 1"));
    }

    std::fs::create_dir_all(&cli.output_dir).map_err(|e| {
        AppError::io(format!(
            "Failed to create output directory {}: {}",
            cli.output_dir.display(),
            e
        ))
    })?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .build()
        .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

    println!(
        "Downloading {} MS MARCO queries from the Hugging Face rows API...",
        cli.query_count
    );
    let queries = fetch_queries(&client, ROWS_ENDPOINT, cli.query_count).await?;
    write_corpus(&cli.output_dir.join("queries.json"), &queries)?;
    println!("Wrote {} queries", queries.len());

    println!("Downloading document corpus...");
    let documents = fetch_documents(&client, &cli.documents_url).await?;
    write_corpus(&cli.output_dir.join("documents.json"), &documents)?;
    println!("Wrote {} documents", documents.len());

    Ok(())
}

/// Page through the rows API until `count` queries are collected or the
/// split runs out
async fn fetch_queries(client: &reqwest::Client, endpoint: &str, count: usize) -> Result<Vec<String>> {
    let mut queries: Vec<String> = Vec::with_capacity(count);
    let mut offset = 0usize;

    while queries.len() < count {
        let length = ROWS_PAGE_SIZE.min(count - queries.len());
        let url = format!(
            "{}?dataset={}&config={}&split={}&offset={}&length={}",
            endpoint, QUERIES_DATASET, QUERIES_CONFIG, QUERIES_SPLIT, offset, length
        );

        let response = client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::http_request(format!(
                "Rows API responded {} for offset {}",
                status, offset
            )));
        }

        let page: RowsResponse = response
            .json()
            .await
            .map_err(|e| AppError::parse(format!("Malformed rows API response: {}", e)))?;

        if page.rows.is_empty() {
            break;
        }

        offset += page.rows.len();
        queries.extend(page.rows.into_iter().map(|entry| entry.row.query));
    }

    if queries.is_empty() {
        return Err(AppError::http_request(
            "Rows API returned no queries; cannot build the query corpus",
        ));
    }

    queries.truncate(count);
    Ok(queries)
}

/// Download the document corpus, served as a JSON array of strings
async fn fetch_documents(client: &reqwest::Client, url: &str) -> Result<Vec<String>> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::http_request(format!(
            "Document corpus URL responded {}",
            status
        )));
    }

    let raw = response.text().await?;
    let documents: Vec<String> = serde_json::from_str(&raw)
        .map_err(|e| AppError::parse(format!("Document corpus is not a JSON array of strings: {}", e)))?;

    if documents.is_empty() {
        return Err(AppError::validation("Document corpus is empty"));
    }

    Ok(documents)
}

/// Write an ordered JSON array of strings
fn write_corpus(path: &Path, items: &[String]) -> Result<()> {
    let serialized = serde_json::to_string_pretty(items)
        .map_err(|e| AppError::io(format!("Failed to serialize corpus: {}", e)))?;

    std::fs::write(path, serialized)
        .map_err(|e| AppError::io(format!("Failed to write {}: {}", path.display(), e)))?;

    Ok(())
}
