//! Process-wide admission gate for upstream calls.
//!
//! A counting semaphore caps how many upstream requests are in flight at
//! once. Callers that find the gate full wait for a slot; waiters are woken
//! in the order tokio's semaphore chooses, which is FIFO.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::ImageSearchConfig;
use crate::error::SearchError;

/// Bounded concurrency gate shared by every resolution in the process.
///
/// Clones share the same slots.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// A held gate slot. The slot is released when this is dropped.
#[derive(Debug)]
pub struct GateSlot {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyGate {
    /// Create a gate admitting `capacity` concurrent holders.
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Create a gate sized from `config.max_concurrent_requests`.
    pub fn from_config(config: &ImageSearchConfig) -> Self {
        Self::new(config.max_concurrent_requests)
    }

    /// Wait for a free slot.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::UpstreamError`] if the gate has been closed.
    pub async fn acquire(&self) -> Result<GateSlot, SearchError> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| SearchError::UpstreamError("concurrency gate closed".into()))?;
        Ok(GateSlot { _permit: permit })
    }

    /// Number of slots currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently held.
    pub fn in_use(&self) -> usize {
        self.capacity.saturating_sub(self.available())
    }
}
