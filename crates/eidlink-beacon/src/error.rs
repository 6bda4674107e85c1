//! Beacon error type.

use eidlink_core::{ConfigError, EidError};
use eidlink_proto::FrameError;
use thiserror::Error;

/// Errors surfaced by the beacon binary
#[derive(Error, Debug)]
pub enum BeaconError {
    /// Input was not valid hex
    #[error("invalid hex for {what}: {source}")]
    InvalidHex {
        /// Which argument
        what: &'static str,
        /// Decoder error
        #[source]
        source: hex::FromHexError,
    },

    /// Configuration flag out of range
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// EID operation failed
    #[error(transparent)]
    Eid(#[from] EidError),

    /// Frame could not be wrapped for output
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// System clock reports a time before the Unix epoch
    #[error("system clock is before the unix epoch")]
    ClockBeforeEpoch,

    /// Writing output failed
    #[error("output failed: {0}")]
    Io(#[from] std::io::Error),
}
