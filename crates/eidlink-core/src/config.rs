//! EID configuration.
//!
//! Ranges are checked once, when a value is constructed. The `const fn`
//! constructors assert, so an out-of-range value in a `const` item fails the
//! build:
//!
//! ```compile_fail
//! use eidlink_core::RotationPeriod;
//! const TOO_SHORT: RotationPeriod = RotationPeriod::from_secs(60);
//! let _ = TOO_SHORT;
//! ```
//!
//! The `try_*` constructors are for values that only exist at runtime.

use thiserror::Error;

/// Configuration values outside their supported range
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Rotation period outside [900, 86400] seconds
    #[error(
        "rotation period {secs}s outside [{min}, {max}]",
        min = RotationPeriod::MIN_SECS,
        max = RotationPeriod::MAX_SECS
    )]
    RotationOutOfRange {
        /// Requested period
        secs: u32,
    },

    /// Counter width outside [4, 11] bits
    #[error(
        "counter width {bits} bits outside [{min}, {max}]",
        min = CounterBits::MIN,
        max = CounterBits::MAX
    )]
    CounterBitsOutOfRange {
        /// Requested width
        bits: u8,
    },

    /// Channel count outside [1, 16]
    #[error("channel count {count} outside [1, {max}]", max = eidlink_proto::MAX_CHANNELS)]
    ChannelCountOutOfRange {
        /// Requested count
        count: u8,
    },
}

/// Length of one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPeriod(u32);

impl RotationPeriod {
    /// Shortest period: 15 minutes
    pub const MIN_SECS: u32 = 900;

    /// Longest period: one day
    pub const MAX_SECS: u32 = 86_400;

    /// One day
    pub const DEFAULT: Self = Self::from_secs(Self::MAX_SECS);

    /// Period of `secs` seconds. Panics (at compile time in const context)
    /// if out of range.
    pub const fn from_secs(secs: u32) -> Self {
        assert!(
            secs >= Self::MIN_SECS && secs <= Self::MAX_SECS,
            "rotation period must be within [900, 86400] seconds"
        );
        Self(secs)
    }

    /// Period of `secs` seconds.
    pub fn try_from_secs(secs: u32) -> Result<Self, ConfigError> {
        if (Self::MIN_SECS..=Self::MAX_SECS).contains(&secs) {
            Ok(Self(secs))
        } else {
            Err(ConfigError::RotationOutOfRange { secs })
        }
    }

    /// Period in seconds.
    pub const fn as_secs(self) -> u32 {
        self.0
    }

    /// Period in milliseconds.
    pub const fn as_millis(self) -> u64 {
        self.0 as u64 * 1000
    }
}

impl Default for RotationPeriod {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Width of the epoch counter in counter mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterBits(u8);

impl CounterBits {
    /// Narrowest counter
    pub const MIN: u8 = 4;

    /// Widest counter
    pub const MAX: u8 = 11;

    /// Counter of `bits` bits. Panics (at compile time in const context) if
    /// out of range.
    pub const fn new(bits: u8) -> Self {
        assert!(
            bits >= Self::MIN && bits <= Self::MAX,
            "counter width must be within [4, 11] bits"
        );
        Self(bits)
    }

    /// Counter of `bits` bits.
    pub fn try_new(bits: u8) -> Result<Self, ConfigError> {
        if (Self::MIN..=Self::MAX).contains(&bits) {
            Ok(Self(bits))
        } else {
            Err(ConfigError::CounterBitsOutOfRange { bits })
        }
    }

    /// Width in bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Number of distinct epochs before the counter wraps.
    pub const fn modulus(self) -> u64 {
        1 << self.0
    }
}

/// How epochs are computed. Fixed for the lifetime of an `EpochManager`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EidMode {
    /// Epoch = wall-clock milliseconds / period
    Utc {
        /// Epoch length
        rotation: RotationPeriod,
    },
    /// Epoch = (initial counter + elapsed periods) mod 2^bits
    Counter {
        /// Epoch length
        rotation: RotationPeriod,
        /// Counter width
        bits: CounterBits,
    },
}

impl EidMode {
    /// Epoch length for either mode.
    pub const fn rotation(self) -> RotationPeriod {
        match self {
            Self::Utc { rotation } | Self::Counter { rotation, .. } => rotation,
        }
    }
}

impl Default for EidMode {
    fn default() -> Self {
        Self::Utc { rotation: RotationPeriod::DEFAULT }
    }
}

/// Satellite packet settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SatConfig {
    channel_count: u8,
}

impl SatConfig {
    /// Every channel the 4-bit field can address
    pub const DEFAULT: Self = Self { channel_count: eidlink_proto::MAX_CHANNELS };

    /// Use `channel_count` channels.
    pub fn new(channel_count: u8) -> Result<Self, ConfigError> {
        if channel_count == 0 || channel_count > eidlink_proto::MAX_CHANNELS {
            return Err(ConfigError::ChannelCountOutOfRange { count: channel_count });
        }
        Ok(Self { channel_count })
    }

    /// Channels to pick from.
    pub fn channel_count(&self) -> u8 {
        self.channel_count
    }
}

impl Default for SatConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
