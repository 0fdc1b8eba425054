//! Statistical reduction of collected latency samples

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Aggregate statistics for one benchmark run.
///
/// Samples are latencies in seconds, order-independent. The standard
/// deviation is the sample standard deviation (dividing by N-1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencySummary {
    /// Number of collected samples
    pub sample_count: usize,
    /// Mean latency in seconds
    pub mean_secs: f64,
    /// Sample standard deviation in seconds (0.0 with fewer than 2 samples)
    pub std_dev_secs: f64,
    /// Fastest sample in seconds
    pub min_secs: f64,
    /// Slowest sample in seconds
    pub max_secs: f64,
    /// Median latency in seconds
    pub p50_secs: f64,
    /// 90th percentile latency in seconds
    pub p90_secs: f64,
    /// 99th percentile latency in seconds
    pub p99_secs: f64,
    /// When this summary was generated
    pub generated_at: DateTime<Utc>,
}

impl LatencySummary {
    /// Reduce a set of latency samples to summary statistics
    pub fn from_samples(samples: &[f64]) -> Result<Self> {
        if samples.is_empty() {
            return Err(AppError::statistics(
                "No latency samples were collected; cannot compute statistics",
            ));
        }

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let std_dev = sample_std_dev(samples, mean);

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        Ok(Self {
            sample_count: samples.len(),
            mean_secs: mean,
            std_dev_secs: std_dev,
            min_secs: sorted[0],
            max_secs: sorted[sorted.len() - 1],
            p50_secs: percentile(&sorted, 50.0),
            p90_secs: percentile(&sorted, 90.0),
            p99_secs: percentile(&sorted, 99.0),
            generated_at: Utc::now(),
        })
    }

    /// Mean latency in milliseconds
    pub fn mean_ms(&self) -> f64 {
        self.mean_secs * 1000.0
    }

    /// Standard deviation in milliseconds
    pub fn std_dev_ms(&self) -> f64 {
        self.std_dev_secs * 1000.0
    }
}

/// Sample standard deviation (N-1 denominator; 0.0 with fewer than 2 values)
fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }

    let variance =
        values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

    variance.sqrt()
}

/// Linear-interpolation percentile over pre-sorted values
fn percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let index = (percentile / 100.0) * (sorted_values.len() as f64 - 1.0);
    let lower_index = index.floor() as usize;
    let upper_index = index.ceil() as usize;

    if lower_index == upper_index {
        sorted_values[lower_index]
    } else {
        let lower_value = sorted_values[lower_index];
        let upper_value = sorted_values[upper_index];
        let weight = index - lower_index as f64;
        lower_value + weight * (upper_value - lower_value)
    }
}

/// Persist the raw samples as an ordered JSON array of floats
pub fn save_samples(path: &Path, samples: &[f64]) -> Result<()> {
    let serialized = serde_json::to_string_pretty(samples)
        .map_err(|e| AppError::io(format!("Failed to serialize latency samples: {}", e)))?;

    std::fs::write(path, serialized).map_err(|e| {
        AppError::io(format!(
            "Failed to write latency samples to {}: {}",
            path.display(),
            e
        ))
    })?;

    Ok(())
}
