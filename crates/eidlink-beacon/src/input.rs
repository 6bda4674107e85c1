//! Hex input parsing for keys and payloads.
//!
//! Only the encoding is checked here. Key and payload lengths are validated
//! by the core, which reports them as `InvalidArgument`.

use zeroize::Zeroizing;

use crate::error::BeaconError;

/// Decode a hex master key.
///
/// # Errors
///
/// - `InvalidHex` if `input` is not valid hex
pub fn parse_key(input: &str) -> Result<Zeroizing<Vec<u8>>, BeaconError> {
    hex::decode(input.trim())
        .map(Zeroizing::new)
        .map_err(|source| BeaconError::InvalidHex { what: "key", source })
}

/// Decode a hex payload. The empty string is the empty payload.
///
/// # Errors
///
/// - `InvalidHex` if `input` is not valid hex
pub fn parse_payload(input: &str) -> Result<Vec<u8>, BeaconError> {
    hex::decode(input.trim()).map_err(|source| BeaconError::InvalidHex { what: "payload", source })
}
