//! Command-line interface module

use crate::types::{ProviderKind, TaskKind};
use clap::Parser;
use std::path::PathBuf;

/// Rerank Latency Bench - open-loop latency benchmarking for rerank/embed APIs
#[derive(Parser, Debug, Clone)]
#[command(name = "rlb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// The provider to benchmark
    #[arg(long, value_enum, default_value_t = ProviderKind::ZeroEntropy)]
    pub provider: ProviderKind,

    /// The task to benchmark
    #[arg(long, value_enum)]
    pub task: TaskKind,

    /// Target request rate in requests per second
    #[arg(long, default_value_t = crate::defaults::DEFAULT_QPS)]
    pub qps: f64,

    /// Benchmark duration in seconds
    #[arg(long, default_value_t = crate::defaults::DEFAULT_DURATION_SECS)]
    pub duration: f64,

    /// Number of items to rerank/embed per request.
    /// Defaults to 1 for embed-queries and 50 otherwise.
    #[arg(short)]
    pub k: Option<usize>,

    /// Write the raw latency samples (seconds, JSON array) to this path
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,

    /// Path to the query corpus (JSON array of strings)
    #[arg(long, default_value = crate::defaults::DEFAULT_QUERIES_PATH)]
    pub queries: PathBuf,

    /// Path to the document corpus (JSON array of strings)
    #[arg(long, default_value = crate::defaults::DEFAULT_DOCUMENTS_PATH)]
    pub documents: PathBuf,

    /// Seed for the arrival schedule and input sampling
    #[arg(long, default_value_t = crate::defaults::DEFAULT_SEED)]
    pub seed: u64,

    /// Maximum number of requests in flight at once
    #[arg(long, default_value_t = crate::defaults::DEFAULT_GATE_CAPACITY)]
    pub concurrency: usize,

    /// Request timeout in seconds
    #[arg(short, long, default_value_t = crate::defaults::DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        // Check for conflicting color flags
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if !self.qps.is_finite() || self.qps <= 0.0 {
            return Err(format!("--qps must be a positive number, got {}", self.qps));
        }

        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(format!(
                "--duration must be a positive number of seconds, got {}",
                self.duration
            ));
        }

        if let Some(k) = self.k {
            if k == 0 {
                return Err("-k must be at least 1".to_string());
            }
        }

        if self.concurrency == 0 {
            return Err("--concurrency must be at least 1".to_string());
        }

        if self.timeout == 0 {
            return Err("--timeout must be at least 1 second".to_string());
        }

        Ok(())
    }

    /// Items per request, falling back to the task-specific default
    pub fn effective_k(&self) -> usize {
        self.k.unwrap_or_else(|| self.task.default_k())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true // Force color output when --color is specified
        } else if self.no_color {
            false // Disable color output when --no-color is specified
        } else {
            supports_color() // Use automatic detection
        }
    }
}

/// Detect whether the terminal supports colored output
fn supports_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }
    true
}
