//! Corpus loading and seeded input sampling
//!
//! The benchmark draws its request payloads from two local JSON corpora
//! (ordered arrays of strings). Sampling is driven by a single seeded
//! generator so that two providers benchmarked with identical parameters
//! see the same sequence of item sets.

use crate::error::{AppError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;

/// How much of each document is appended back onto itself at load time
const DOCUMENT_PAD_CHARS: usize = 500;

/// Query and document corpora for one benchmark run
#[derive(Debug, Clone)]
pub struct Corpus {
    /// Query strings, in file order
    pub queries: Vec<String>,
    /// Document strings, in file order, lengthened at load time
    pub documents: Vec<String>,
}

impl Corpus {
    /// Load both corpora from disk, failing fast on missing or malformed files
    pub fn load(queries_path: &Path, documents_path: &Path) -> Result<Self> {
        let queries = load_string_array(queries_path)?;
        let documents = load_string_array(documents_path)?
            .into_iter()
            .map(|d| pad_document(&d))
            .collect();

        Ok(Self { queries, documents })
    }

    /// Number of queries available
    pub fn query_count(&self) -> usize {
        self.queries.len()
    }

    /// Number of documents available
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}

/// Read an ordered JSON array of strings from a file
pub fn load_string_array(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read corpus file {}: {}", path.display(), e)))?;

    let items: Vec<String> = serde_json::from_str(&raw).map_err(|e| {
        AppError::parse(format!(
            "Corpus file {} is not a JSON array of strings: {}",
            path.display(),
            e
        ))
    })?;

    if items.is_empty() {
        return Err(AppError::validation(format!(
            "Corpus file {} contains no entries",
            path.display()
        )));
    }

    Ok(items)
}

/// Lengthen a document by appending its own first 500 characters.
///
/// Keeps payload sizes closer to realistic rerank/embed inputs even when
/// the source corpus carries short abstracts. Operates on character
/// boundaries, so multi-byte text stays valid.
fn pad_document(document: &str) -> String {
    let mut padded = String::with_capacity(document.len() + DOCUMENT_PAD_CHARS * 4);
    padded.push_str(document);
    padded.extend(document.chars().take(DOCUMENT_PAD_CHARS));
    padded
}

/// Deterministic input selector shared by every job in a run.
///
/// Selection is with replacement across jobs and without replacement
/// within one job's item set.
pub struct Sampler {
    rng: StdRng,
}

impl Sampler {
    /// Create a sampler from a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a sampler from an already-positioned generator.
    ///
    /// Used by the benchmark runner so the arrival schedule and the input
    /// selections consume one seeded draw sequence in a fixed order.
    pub fn from_rng(rng: StdRng) -> Self {
        Self { rng }
    }

    /// Pick one item, with replacement across calls
    pub fn choose_one(&mut self, items: &[String]) -> Result<String> {
        items
            .choose(&mut self.rng)
            .cloned()
            .ok_or_else(|| AppError::validation("Cannot sample from an empty corpus"))
    }

    /// Pick `k` distinct items (without replacement within this call)
    pub fn choose_set(&mut self, items: &[String], k: usize) -> Result<Vec<String>> {
        if k > items.len() {
            return Err(AppError::validation(format!(
                "Requested {} items per job but the corpus only has {}",
                k,
                items.len()
            )));
        }

        Ok(items
            .choose_multiple(&mut self.rng, k)
            .cloned()
            .collect())
    }
}
