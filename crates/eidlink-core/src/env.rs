//! Environment abstraction for deterministic testing.
//!
//! Decouples EID logic from system resources (uptime, randomness) and from
//! the source of advertisement sequence numbers. Production ports supply a
//! monotonic clock and OS entropy; tests supply fakes they can drive.

use eidlink_proto::SEQUENCE_LIMIT;
use thiserror::Error;

/// Random source could not produce bytes
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("random source unavailable")]
pub struct EntropyError;

/// Time and randomness consumed by the core.
///
/// # Invariants
///
/// Implementations MUST guarantee:
///
/// - `uptime_ms()` never decreases
/// - `random_bytes()` uses cryptographically secure entropy in production
pub trait Environment {
    /// Milliseconds since boot (monotonic).
    fn uptime_ms(&self) -> u64;

    /// Fill `buffer` with random bytes.
    ///
    /// # Errors
    ///
    /// - `EntropyError` if no randomness is available; `buffer` contents are
    ///   unspecified
    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError>;
}

impl<T: Environment + ?Sized> Environment for &T {
    fn uptime_ms(&self) -> u64 {
        (**self).uptime_ms()
    }

    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        (**self).random_bytes(buffer)
    }
}

/// Supplies the BLE advertisement sequence number.
///
/// The advertiser reads [`sequence_counter`](Self::sequence_counter) once
/// per advertisement and calls [`advance`](Self::advance) only after the
/// advertisement was produced. Values at or above 1024 are treated as 0.
pub trait SequenceSource {
    /// Sequence number for the next advertisement.
    fn sequence_counter(&self) -> u16;

    /// The current sequence number was used successfully.
    fn advance(&mut self);
}

/// Default source: counts 0..=1023 and wraps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CyclicSequence {
    next: u16,
}

impl CyclicSequence {
    /// Start counting at `start` (reduced modulo 1024).
    pub fn starting_at(start: u16) -> Self {
        Self { next: start % SEQUENCE_LIMIT }
    }
}

impl SequenceSource for CyclicSequence {
    fn sequence_counter(&self) -> u16 {
        self.next
    }

    fn advance(&mut self) {
        self.next = (self.next + 1) % SEQUENCE_LIMIT;
    }
}

/// Caller-pinned sequence number.
///
/// Ignores [`advance`](SequenceSource::advance); the caller changes the value
/// with [`set`](Self::set). Used to supply custom address entropy or to pin
/// sequence numbers in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedSequence(u16);

impl FixedSequence {
    /// Always report `value`.
    pub fn new(value: u16) -> Self {
        Self(value)
    }

    /// Change the reported value.
    pub fn set(&mut self, value: u16) {
        self.0 = value;
    }
}

impl SequenceSource for FixedSequence {
    fn sequence_counter(&self) -> u16 {
        self.0
    }

    fn advance(&mut self) {}
}

impl<T: SequenceSource + ?Sized> SequenceSource for &mut T {
    fn sequence_counter(&self) -> u16 {
        (**self).sequence_counter()
    }

    fn advance(&mut self) {
        (**self).advance();
    }
}
