//! Counter-mode key derivation with AES-CMAC as PRF
//!
//! Each PRF invocation MACs
//! `BE32(counter) || label || 0x00 || context || BE32(output_bits)` and the
//! 16-byte blocks are concatenated until the requested length is reached.

use zeroize::{Zeroize, Zeroizing};

use crate::{
    error::CryptoError,
    provider::{BLOCK_SIZE, CryptoProvider},
};

/// Size of the fixed message buffer; bounds `label.len() + context.len()`.
///
/// The assembled message must be strictly shorter than this.
pub const MESSAGE_CAPACITY: usize = 64;

/// Separation byte between label and context
const SEPARATOR: u8 = 0x00;

/// Bytes taken by the counter and the trailing length field
const FRAMING_LEN: usize = 4 + 1 + 4;

/// Derive `output.len()` bytes from `key`, `label` and `context`.
///
/// The counter starts at 1 and increments per 16-byte block. On failure the
/// output is zeroized; the message and PRF buffers are zeroized on every
/// return.
///
/// # Errors
///
/// - `MessageTooLong` if the assembled message is not shorter than
///   [`MESSAGE_CAPACITY`]
/// - `InvalidOutputLength` if the output bit length overflows 32 bits
/// - any error reported by the provider's `cmac`
pub fn derive(
    provider: &impl CryptoProvider,
    key: &[u8],
    label: &[u8],
    context: &[u8],
    output: &mut [u8],
) -> Result<(), CryptoError> {
    let message_len = FRAMING_LEN + label.len() + context.len();
    if message_len >= MESSAGE_CAPACITY {
        return Err(CryptoError::MessageTooLong { len: message_len, max: MESSAGE_CAPACITY });
    }

    let output_bits = u32::try_from(output.len())
        .ok()
        .and_then(|len| len.checked_mul(8))
        .ok_or(CryptoError::InvalidOutputLength { len: output.len() })?;

    let mut message = Zeroizing::new([0u8; MESSAGE_CAPACITY]);
    let context_start = 4 + label.len() + 1;
    message[4..4 + label.len()].copy_from_slice(label);
    message[4 + label.len()] = SEPARATOR;
    message[context_start..context_start + context.len()].copy_from_slice(context);
    message[message_len - 4..message_len].copy_from_slice(&output_bits.to_be_bytes());

    let result = expand(provider, key, &mut message[..message_len], output);
    if result.is_err() {
        output.zeroize();
    }
    result
}

fn expand(
    provider: &impl CryptoProvider,
    key: &[u8],
    message: &mut [u8],
    output: &mut [u8],
) -> Result<(), CryptoError> {
    let mut counter: u32 = 1;

    for chunk in output.chunks_mut(BLOCK_SIZE) {
        message[..4].copy_from_slice(&counter.to_be_bytes());

        let block = Zeroizing::new(provider.cmac(key, message)?);
        chunk.copy_from_slice(&block[..chunk.len()]);

        counter = counter.wrapping_add(1);
    }

    Ok(())
}
