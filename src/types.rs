//! Type definitions and aliases

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Provider backends supported by the benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lower")]
pub enum ProviderKind {
    /// ZeroEntropy rerank/embed endpoints
    ZeroEntropy,
    /// Cohere v2 API
    Cohere,
    /// Jina AI (Cohere-compatible surface)
    Jina,
}

impl ProviderKind {
    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::ZeroEntropy => "zeroentropy",
            ProviderKind::Cohere => "cohere",
            ProviderKind::Jina => "jina",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Benchmark task variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    /// Rerank one query against k documents per request
    Rerank,
    /// Embed k query strings per request
    EmbedQueries,
    /// Embed k document strings per request
    EmbedDocuments,
}

impl TaskKind {
    /// Get a human-readable name for this task
    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::Rerank => "rerank",
            TaskKind::EmbedQueries => "embed-queries",
            TaskKind::EmbedDocuments => "embed-documents",
        }
    }

    /// Default number of items per request for this task
    pub fn default_k(&self) -> usize {
        match self {
            TaskKind::EmbedQueries => 1,
            _ => crate::defaults::DEFAULT_K,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which side of a retrieval pair an embedding request represents.
///
/// Providers optimize query and document embeddings differently, so the
/// wire format carries this distinction explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingKind {
    Query,
    Document,
}

impl EmbeddingKind {
    /// Wire value used by the ZeroEntropy and Jina APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingKind::Query => "query",
            EmbeddingKind::Document => "document",
        }
    }

    /// Wire value used by the Cohere v2 embed API
    pub fn cohere_input_type(&self) -> &'static str {
        match self {
            EmbeddingKind::Query => "search_query",
            EmbeddingKind::Document => "search_document",
        }
    }
}

impl fmt::Display for EmbeddingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
