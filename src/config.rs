use anyhow::{bail, Result};
use std::time::Duration;

/// Immutable scan configuration, snapshotted before the pool starts.
///
/// Cloned into each worker at spawn time; nothing mutates it mid-scan, so
/// workers read it without synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Bound on each connect attempt, and on the single banner read.
    pub connect_timeout: Duration,
    /// Connection attempts per task before declaring the port closed.
    pub max_retries: u32,
    /// Number of concurrent worker tasks draining the queue.
    pub worker_count: usize,
    /// Pacing delay between successive task enqueues (not between attempts).
    pub inter_task_delay: Duration,
    /// Base unit for exponential backoff: attempt `a` sleeps `unit * 2^a`.
    pub backoff_unit: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(1),
            max_retries: 2,
            worker_count: 100,
            inter_task_delay: Duration::from_millis(100),
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl ScanConfig {
    /// Reject configurations the pool cannot run with. Called once before
    /// any worker is spawned; past this point nothing in the scan path
    /// returns an error.
    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            bail!("worker count must be at least 1");
        }
        if self.max_retries == 0 {
            bail!("max retries must be at least 1");
        }
        Ok(())
    }

    /// Backoff for a given zero-based attempt index: `unit * 2^attempt`,
    /// saturating instead of overflowing for absurd attempt counts.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
    }
}
