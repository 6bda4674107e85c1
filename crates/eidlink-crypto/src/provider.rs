//! AES/CMAC collaborator.
//!
//! The protocol only needs two primitives: a 16-byte MAC used both as the KDF
//! PRF and as the advertisement authenticator, and a counter-mode cipher. Both
//! are behind [`CryptoProvider`] so embedded ports can route them to a
//! hardware engine. [`SoftwareCrypto`] is the portable implementation.

use aes::{Aes128, Aes256};
use cmac::{Cmac, Mac};
use ctr::cipher::{KeyIvInit, StreamCipher};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{error::CryptoError, keys::KeySize};

/// AES block size, also the CMAC output size
pub const BLOCK_SIZE: usize = 16;

/// 16-byte CTR counter block: 12-byte nonce followed by a 32-bit big-endian
/// block counter starting at zero.
///
/// Aligned to 16 bytes so hardware engines that DMA straight from the
/// buffer can take it as-is.
#[repr(C, align(16))]
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CounterBlock([u8; BLOCK_SIZE]);

impl CounterBlock {
    /// Counter block for a 12-byte nonce.
    pub fn from_nonce(nonce: &[u8; 12]) -> Self {
        let mut block = [0u8; BLOCK_SIZE];
        block[..12].copy_from_slice(nonce);
        Self(block)
    }

    /// Raw block bytes.
    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.0
    }
}

/// Block-cipher primitives consumed by the KDF and the advertisement path.
///
/// # Invariants
///
/// Implementations MUST be deterministic: equal inputs give equal outputs.
/// Failures are reported as [`CryptoError::Primitive`] (or
/// [`CryptoError::InvalidKeyLength`] for unsupported keys), never by panicking.
pub trait CryptoProvider {
    /// AES-CMAC of `message` under `key`.
    fn cmac(&self, key: &[u8], message: &[u8]) -> Result<[u8; BLOCK_SIZE], CryptoError>;

    /// AES-CTR keystream applied in place to `data`.
    ///
    /// Zero-length data is a no-op.
    fn aes_ctr(
        &self,
        key: &[u8],
        counter: &CounterBlock,
        data: &mut [u8],
    ) -> Result<(), CryptoError>;
}

impl<T: CryptoProvider + ?Sized> CryptoProvider for &T {
    fn cmac(&self, key: &[u8], message: &[u8]) -> Result<[u8; BLOCK_SIZE], CryptoError> {
        (**self).cmac(key, message)
    }

    fn aes_ctr(
        &self,
        key: &[u8],
        counter: &CounterBlock,
        data: &mut [u8],
    ) -> Result<(), CryptoError> {
        (**self).aes_ctr(key, counter, data)
    }
}

/// Portable provider built on the RustCrypto `aes`, `cmac` and `ctr` crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareCrypto;

type Aes128Ctr = ctr::Ctr32BE<Aes128>;
type Aes256Ctr = ctr::Ctr32BE<Aes256>;

impl CryptoProvider for SoftwareCrypto {
    fn cmac(&self, key: &[u8], message: &[u8]) -> Result<[u8; BLOCK_SIZE], CryptoError> {
        const FAILED: CryptoError = CryptoError::Primitive { operation: "cmac" };

        let tag = match KeySize::from_len(key.len())? {
            KeySize::Aes128 => {
                let mut mac = <Cmac<Aes128> as Mac>::new_from_slice(key).map_err(|_| FAILED)?;
                mac.update(message);
                mac.finalize().into_bytes()
            },
            KeySize::Aes256 => {
                let mut mac = <Cmac<Aes256> as Mac>::new_from_slice(key).map_err(|_| FAILED)?;
                mac.update(message);
                mac.finalize().into_bytes()
            },
        };

        let mut out = [0u8; BLOCK_SIZE];
        out.copy_from_slice(&tag);
        Ok(out)
    }

    fn aes_ctr(
        &self,
        key: &[u8],
        counter: &CounterBlock,
        data: &mut [u8],
    ) -> Result<(), CryptoError> {
        const FAILED: CryptoError = CryptoError::Primitive { operation: "aes-ctr" };

        let size = KeySize::from_len(key.len())?;
        if data.is_empty() {
            return Ok(());
        }

        match size {
            KeySize::Aes128 => {
                let mut cipher =
                    Aes128Ctr::new_from_slices(key, counter.as_bytes()).map_err(|_| FAILED)?;
                cipher.apply_keystream(data);
            },
            KeySize::Aes256 => {
                let mut cipher =
                    Aes256Ctr::new_from_slices(key, counter.as_bytes()).map_err(|_| FAILED)?;
                cipher.apply_keystream(data);
            },
        }

        Ok(())
    }
}

/// Constant-time comparison of two authentication tags.
///
/// Tags of different length never match.
pub fn tags_equal(expected: &[u8], actual: &[u8]) -> bool {
    expected.ct_eq(actual).into()
}
