//! Configuration management module
//!
//! Resolves the CLI arguments and environment into a single validated
//! [`Config`] value constructed once at process start and passed to the
//! load generator and provider adapters.

use crate::{
    cli::Cli,
    error::{AppError, Result},
    types::{ProviderKind, TaskKind},
};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolved runtime configuration for one benchmark run
#[derive(Debug, Clone)]
pub struct Config {
    /// Provider under test
    pub provider: ProviderKind,
    /// Task to benchmark
    pub task: TaskKind,
    /// Target request rate (requests/second)
    pub qps: f64,
    /// Run duration in seconds
    pub duration: f64,
    /// Items per request (resolved from -k or the task default)
    pub k: usize,
    /// Optional path for the raw latency samples
    pub save_path: Option<PathBuf>,
    /// Query corpus path
    pub queries_path: PathBuf,
    /// Document corpus path
    pub documents_path: PathBuf,
    /// Seed for the arrival schedule and input sampling
    pub seed: u64,
    /// Concurrency gate capacity
    pub gate_capacity: usize,
    /// Flat per-request timeout
    pub timeout: Duration,
    /// Enable colored output
    pub enable_color: bool,
    /// Verbose output
    pub verbose: bool,
    /// Debug output
    pub debug: bool,
    /// Provider credentials resolved from the environment
    pub credentials: Credentials,
}

/// Provider credentials and endpoints, resolved from the environment.
///
/// Only the credentials for the selected provider are required; the rest
/// stay `None` without complaint.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub zeroentropy_base_url: Option<String>,
    pub zeroentropy_api_key: Option<String>,
    pub cohere_api_key: Option<String>,
    pub cohere_base_url: Option<String>,
    pub jina_api_key: Option<String>,
    pub jina_base_url: Option<String>,
}

impl Credentials {
    /// Read credentials from the process environment
    pub fn from_env() -> Self {
        Self {
            zeroentropy_base_url: read_env("ZEROENTROPY_BASE_URL"),
            zeroentropy_api_key: read_env("ZEROENTROPY_API_KEY"),
            cohere_api_key: read_env("COHERE_API_KEY"),
            cohere_base_url: read_env("COHERE_BASE_URL"),
            jina_api_key: read_env("JINA_API_KEY"),
            jina_base_url: read_env("JINA_BASE_URL"),
        }
    }

    /// Validate that the selected provider has what it needs, fail-fast
    pub fn validate_for(&self, provider: ProviderKind) -> Result<()> {
        match provider {
            ProviderKind::ZeroEntropy => {
                let base_url = self.zeroentropy_base_url.as_deref().ok_or_else(|| {
                    AppError::auth("ZEROENTROPY_BASE_URL is not set (required for --provider zeroentropy)")
                })?;
                url::Url::parse(base_url).map_err(|e| {
                    AppError::config(format!("Invalid ZEROENTROPY_BASE_URL '{}': {}", base_url, e))
                })?;
                if self.zeroentropy_api_key.is_none() {
                    return Err(AppError::auth(
                        "ZEROENTROPY_API_KEY is not set (required for --provider zeroentropy)",
                    ));
                }
            }
            ProviderKind::Cohere => {
                if self.cohere_api_key.is_none() {
                    return Err(AppError::auth(
                        "COHERE_API_KEY is not set (required for --provider cohere)",
                    ));
                }
            }
            ProviderKind::Jina => {
                if self.jina_api_key.is_none() {
                    return Err(AppError::auth(
                        "JINA_API_KEY is not set (required for --provider jina)",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Read an environment variable, treating empty values as unset
fn read_env(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

/// Load .env file if it exists
pub fn load_env_file(debug: bool) -> Result<()> {
    if Path::new(".env").exists() {
        dotenv::from_filename(".env")
            .map_err(|e| AppError::config(format!("Failed to load .env file: {}", e)))?;

        if debug {
            println!("Loaded configuration from .env file");
        }
    } else if debug {
        println!("No .env file found, using environment and CLI arguments");
    }

    Ok(())
}

/// Build and validate the runtime configuration from parsed CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    cli.validate().map_err(AppError::config)?;

    load_env_file(cli.debug)?;
    let credentials = Credentials::from_env();
    credentials.validate_for(cli.provider)?;

    let config = Config {
        provider: cli.provider,
        task: cli.task,
        qps: cli.qps,
        duration: cli.duration,
        k: cli.effective_k(),
        save_path: cli.save.clone(),
        queries_path: cli.queries.clone(),
        documents_path: cli.documents.clone(),
        seed: cli.seed,
        gate_capacity: cli.concurrency,
        timeout: Duration::from_secs(cli.timeout),
        enable_color: cli.use_colors(),
        verbose: cli.verbose,
        debug: cli.debug,
        credentials,
    };

    Ok(config)
}

/// Get configuration summary for display
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = String::new();

    summary.push_str("Configuration Summary:\n");
    summary.push_str(&format!("  Provider: {}\n", config.provider));
    summary.push_str(&format!("  Task: {}\n", config.task));
    summary.push_str(&format!("  Target rate: {} req/s\n", config.qps));
    summary.push_str(&format!("  Duration: {}s\n", config.duration));
    summary.push_str(&format!("  Items per request: {}\n", config.k));
    summary.push_str(&format!("  Seed: {}\n", config.seed));
    summary.push_str(&format!("  Concurrency gate: {}\n", config.gate_capacity));
    summary.push_str(&format!("  Timeout: {}s\n", config.timeout.as_secs()));
    summary.push_str(&format!("  Queries: {}\n", config.queries_path.display()));
    summary.push_str(&format!("  Documents: {}\n", config.documents_path.display()));

    if let Some(save) = &config.save_path {
        summary.push_str(&format!("  Save samples to: {}\n", save.display()));
    }

    summary
}
