//! Shared fixtures for eidlink-core integration tests

#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
};

use eidlink_core::{EntropyError, Environment};

/// Day-long rotation period in milliseconds
pub const DAY_MS: u64 = 86_400_000;

/// 32-byte master key used by the reference firmware tests
pub const PRIMARY_KEY_HEX: &str =
    "cd15a5abc060b67288a61e44e995ba77d140bd46564b88de41c15a9273b0ce85";

/// Decode [`PRIMARY_KEY_HEX`].
pub fn primary_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    hex::decode_to_slice(PRIMARY_KEY_HEX, &mut key).unwrap();
    key
}

/// Deterministic environment: settable uptime, scripted random bytes.
///
/// Random bytes are served from the script in order; once it runs out the
/// environment repeats the last byte. With `failing_rng` set every request
/// fails.
#[derive(Default)]
pub struct FakeEnv {
    uptime: Cell<u64>,
    script: RefCell<VecDeque<u8>>,
    last: Cell<u8>,
    failing_rng: Cell<bool>,
}

impl FakeEnv {
    /// Environment at uptime 0 with no scripted randomness.
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment whose random source always fails.
    pub fn without_entropy() -> Self {
        let env = Self::default();
        env.failing_rng.set(true);
        env
    }

    /// Queue bytes for the random source.
    pub fn script_random(&self, bytes: &[u8]) {
        self.script.borrow_mut().extend(bytes.iter().copied());
    }

    /// Move uptime forward.
    pub fn advance_ms(&self, ms: u64) {
        self.uptime.set(self.uptime.get() + ms);
    }
}

impl Environment for FakeEnv {
    fn uptime_ms(&self) -> u64 {
        self.uptime.get()
    }

    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        if self.failing_rng.get() {
            return Err(EntropyError);
        }
        let mut script = self.script.borrow_mut();
        for byte in buffer {
            if let Some(next) = script.pop_front() {
                self.last.set(next);
            }
            *byte = self.last.get();
        }
        Ok(())
    }
}
