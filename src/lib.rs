//! Rerank Latency Bench
//!
//! An open-loop latency benchmarking harness that compares reranking and
//! embedding API providers by issuing timed HTTP requests on a Poisson
//! arrival schedule and reporting per-request latency statistics.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod corpus;
pub mod error;
pub mod executor;
pub mod output;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use client::ProviderClient;
pub use config::{Config, Credentials};
pub use corpus::{Corpus, Sampler};
pub use error::{AppError, Result};
pub use executor::{build_schedule, run_open_loop, ConcurrencyGate};
pub use stats::LatencySummary;
pub use types::{EmbeddingKind, ProviderKind, TaskKind};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_QPS: f64 = 0.5;
    pub const DEFAULT_DURATION_SECS: f64 = 10.0;
    pub const DEFAULT_K: usize = 50;
    pub const DEFAULT_SEED: u64 = 42;
    pub const DEFAULT_GATE_CAPACITY: usize = 256;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_QUERIES_PATH: &str = "data/queries.json";
    pub const DEFAULT_DOCUMENTS_PATH: &str = "data/documents.json";
    /// Over-draw factor for the arrival schedule; the exponential draws are
    /// truncated at the run duration afterwards.
    pub const SCHEDULE_OVERDRAW: f64 = 1.5;
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
