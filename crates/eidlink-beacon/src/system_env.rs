//! Production Environment implementation using the host clock and RNG.
//!
//! Uptime is measured from construction with `std::time::Instant`, which is
//! monotonic. Randomness comes from the OS through getrandom.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use eidlink_core::{EntropyError, Environment};

use crate::error::BeaconError;

/// Host environment: uptime since construction plus OS entropy.
#[derive(Debug, Clone)]
pub struct SystemEnv {
    boot: Instant,
}

impl SystemEnv {
    /// Start the uptime clock now.
    #[allow(clippy::disallowed_methods)]
    pub fn new() -> Self {
        Self { boot: Instant::now() }
    }

    /// Wall-clock milliseconds since the Unix epoch.
    ///
    /// # Errors
    ///
    /// - `ClockBeforeEpoch` if the host clock is set before 1970
    #[allow(clippy::disallowed_methods)]
    pub fn wall_clock_ms(&self) -> Result<u64, BeaconError> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| BeaconError::ClockBeforeEpoch)?;
        Ok(since_epoch.as_millis() as u64)
    }
}

impl Default for SystemEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SystemEnv {
    fn uptime_ms(&self) -> u64 {
        self.boot.elapsed().as_millis() as u64
    }

    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        getrandom::fill(buffer).map_err(|err| {
            tracing::warn!(error = %err, "OS random source failed");
            EntropyError
        })
    }
}
