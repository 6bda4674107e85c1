//! Error types for the eidlink core.
//!
//! Every failure is reported synchronously by the call that detected it.
//! Nothing is retried internally; [`EidError::is_transient`] tells the
//! caller whether retrying can help.

use eidlink_crypto::CryptoError;
use eidlink_proto::FrameError;
use thiserror::Error;

use crate::config::ConfigError;

/// errno value for invalid argument
const EINVAL: i32 = 22;
/// errno value for I/O error
const EIO: i32 = 5;
/// errno value for function not implemented
const ENOSYS: i32 = 38;
/// errno value for bad message
const EBADMSG: i32 = 74;

/// Errors from EID state, advertisement and packet assembly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EidError {
    /// Caller input the protocol cannot accept
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the input
        reason: String,
    },

    /// AES/CMAC collaborator reported failure
    #[error("crypto primitive failure: {0}")]
    PrimitiveFailure(CryptoError),

    /// Operation needs state that has not been set up
    #[error("not initialized: {what}")]
    NotInitialized {
        /// Missing piece of state
        what: &'static str,
    },

    /// Tag or device id did not match (receiver side only)
    #[error("authentication failed")]
    AuthenticationFailed,
}

impl EidError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument { reason: reason.into() }
    }

    /// Negative errno-style status code used by embedded callers.
    pub fn status_code(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. } => -EINVAL,
            Self::PrimitiveFailure(_) => -EIO,
            Self::NotInitialized { .. } => -ENOSYS,
            Self::AuthenticationFailed => -EBADMSG,
        }
    }

    /// Returns true if the same call may succeed when retried.
    ///
    /// Only primitive failures qualify; bad input and missing state fail the
    /// same way every time.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::PrimitiveFailure(_))
    }
}

impl From<CryptoError> for EidError {
    fn from(err: CryptoError) -> Self {
        if err.is_invalid_argument() {
            Self::invalid(err.to_string())
        } else {
            Self::PrimitiveFailure(err)
        }
    }
}

impl From<FrameError> for EidError {
    fn from(err: FrameError) -> Self {
        Self::invalid(err.to_string())
    }
}

impl From<ConfigError> for EidError {
    fn from(err: ConfigError) -> Self {
        Self::invalid(err.to_string())
    }
}
