//! Bounded concurrency gate with high-water instrumentation

use crate::error::{AppError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Semaphore, SemaphorePermit};

/// Counting semaphore that bounds how many jobs execute at once.
///
/// The gate blocks job start, not scheduling: the open-loop scheduler keeps
/// launching tasks on time and each task waits here before touching the
/// network. The in-flight counter and high-water mark exist so tests can
/// assert the bound is never exceeded.
#[derive(Debug)]
pub struct ConcurrencyGate {
    semaphore: Semaphore,
    capacity: usize,
    in_flight: AtomicUsize,
    high_water: AtomicUsize,
}

/// Permit held for the duration of one job's execution
pub struct GatePermit<'a> {
    gate: &'a ConcurrencyGate,
    _permit: SemaphorePermit<'a>,
}

impl ConcurrencyGate {
    /// Create a gate with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Semaphore::new(capacity),
            capacity,
            in_flight: AtomicUsize::new(0),
            high_water: AtomicUsize::new(0),
        }
    }

    /// Wait for a free slot. Returns a permit released on drop.
    pub async fn acquire(&self) -> Result<GatePermit<'_>> {
        let permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| AppError::internal("Concurrency gate was closed"))?;

        let now_active = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(now_active, Ordering::SeqCst);

        Ok(GatePermit {
            gate: self,
            _permit: permit,
        })
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Jobs currently holding a permit
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously held permits seen so far
    pub fn high_water_mark(&self) -> usize {
        self.high_water.load(Ordering::SeqCst)
    }
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
