//! Open-loop load generator
//!
//! Produces a Poisson arrival schedule and executes jobs against it without
//! blocking on completion: each job is launched at its scheduled offset
//! regardless of whether earlier jobs have finished. Completion latencies
//! are collected once every launched job has resolved.

pub mod gate;

pub use gate::{ConcurrencyGate, GatePermit};

use crate::error::{AppError, Result};
use futures::future::join_all;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Exp};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Build the send-offset schedule for one run.
///
/// Inter-arrival gaps are exponentially distributed with mean `1/rate`,
/// which makes the arrivals a Poisson process. Offsets at or past
/// `duration` are discarded. Draws happen in batches of
/// `duration * rate * 1.5`; if a batch runs out before the cumulative
/// clock crosses the duration, another batch is drawn, so truncation never
/// under-fills the window.
pub fn build_schedule(rate: f64, duration: f64, rng: &mut StdRng) -> Result<Vec<Duration>> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(AppError::validation(format!(
            "Arrival rate must be positive, got {}",
            rate
        )));
    }
    if !duration.is_finite() || duration <= 0.0 {
        return Err(AppError::validation(format!(
            "Duration must be positive, got {}",
            duration
        )));
    }

    let gaps = Exp::new(rate)
        .map_err(|e| AppError::internal(format!("Invalid exponential distribution: {}", e)))?;

    let batch = ((duration * rate * crate::defaults::SCHEDULE_OVERDRAW).ceil() as usize).max(1);
    let mut offsets = Vec::with_capacity(batch);
    let mut clock = 0.0_f64;

    'draw: loop {
        for _ in 0..batch {
            clock += gaps.sample(rng);
            // Strict comparison: an offset exactly equal to the duration is excluded
            if clock >= duration {
                break 'draw;
            }
            offsets.push(Duration::from_secs_f64(clock));
        }
    }

    Ok(offsets)
}

/// Execute jobs open-loop against a schedule of send offsets.
///
/// For each offset in order, sleeps until `start + offset` (a past-due
/// deadline fires immediately, with no catch-up burst) and spawns the job
/// produced by `make_job` without awaiting it. After the last launch, a
/// final join step awaits every handle and then propagates the first
/// failure encountered in launch order.
///
/// The returned latency samples are order-independent: one sample per
/// scheduled offset, with no completion-order guarantee folded in.
pub async fn run_open_loop<F, Fut>(schedule: &[Duration], mut make_job: F) -> Result<Vec<f64>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<f64>> + Send + 'static,
{
    let start = tokio::time::Instant::now();
    let mut handles: Vec<JoinHandle<Result<f64>>> = Vec::with_capacity(schedule.len());

    for (index, offset) in schedule.iter().enumerate() {
        tokio::time::sleep_until(start + *offset).await;
        handles.push(tokio::spawn(make_job(index)));
    }

    let mut samples = Vec::with_capacity(handles.len());
    for joined in join_all(handles).await {
        let latency = joined
            .map_err(|e| AppError::execution(format!("Benchmark job did not complete: {}", e)))??;
        samples.push(latency);
    }

    Ok(samples)
}
