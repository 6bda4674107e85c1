//! Master and derived key types

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Largest supported key (AES-256)
pub const MAX_KEY_LEN: usize = 32;

/// AES key size selected by the master key length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySize {
    /// 16-byte key
    Aes128,
    /// 32-byte key
    Aes256,
}

impl KeySize {
    /// Key length in bytes.
    pub const fn byte_len(self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes256 => 32,
        }
    }

    /// Key size for a key of `len` bytes.
    pub fn from_len(len: usize) -> Result<Self, CryptoError> {
        match len {
            16 => Ok(Self::Aes128),
            32 => Ok(Self::Aes256),
            actual => Err(CryptoError::InvalidKeyLength { actual }),
        }
    }
}

/// Borrowed reference to the caller's master key.
///
/// The caller owns the bytes; the borrow guarantees they outlive every
/// derivation made through this handle. Nothing in this crate copies the
/// master key.
#[derive(Clone, Copy)]
pub struct MasterKey<'k> {
    bytes: &'k [u8],
    size: KeySize,
}

impl<'k> MasterKey<'k> {
    /// Wrap a caller-owned key.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyLength` if `bytes` is not 16 or 32 bytes long (an empty
    ///   slice stands in for a missing key)
    pub fn new(bytes: &'k [u8]) -> Result<Self, CryptoError> {
        let size = KeySize::from_len(bytes.len())?;
        Ok(Self { bytes, size })
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &'k [u8] {
        self.bytes
    }

    /// AES variant implied by the key length.
    pub fn size(&self) -> KeySize {
        self.size
    }
}

impl fmt::Debug for MasterKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKey").field("size", &self.size).finish_non_exhaustive()
    }
}

/// Key produced by the KDF. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; MAX_KEY_LEN],
    #[zeroize(skip)]
    size: KeySize,
}

impl DerivedKey {
    /// All-zero key of the given size, ready to be filled by the KDF.
    pub fn zeroed(size: KeySize) -> Self {
        Self { bytes: [0u8; MAX_KEY_LEN], size }
    }

    /// Key bytes (16 or 32 depending on size).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.size.byte_len()]
    }

    /// Mutable key bytes, used as KDF output.
    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        let len = self.size.byte_len();
        &mut self.bytes[..len]
    }

    /// Key size.
    pub fn size(&self) -> KeySize {
        self.size
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey").field("size", &self.size).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_128_and_256_bit_keys() {
        let short = [1u8; 16];
        let long = [2u8; 32];

        assert_eq!(MasterKey::new(&short).unwrap().size(), KeySize::Aes128);
        assert_eq!(MasterKey::new(&long).unwrap().size(), KeySize::Aes256);
    }

    #[test]
    fn rejects_missing_and_odd_keys() {
        assert_eq!(MasterKey::new(&[]).unwrap_err(), CryptoError::InvalidKeyLength { actual: 0 });
        assert_eq!(
            MasterKey::new(&[0u8; 24]).unwrap_err(),
            CryptoError::InvalidKeyLength { actual: 24 }
        );
    }

    #[test]
    fn derived_key_exposes_only_its_size() {
        let key = DerivedKey::zeroed(KeySize::Aes128);
        assert_eq!(key.as_bytes().len(), 16);

        let key = DerivedKey::zeroed(KeySize::Aes256);
        assert_eq!(key.as_bytes().len(), 32);
    }

    #[test]
    fn debug_output_hides_key_material() {
        let bytes = [0xAAu8; 16];
        let master = MasterKey::new(&bytes).unwrap();
        let rendered = format!("{master:?}");
        assert!(!rendered.contains("170"), "key bytes leaked: {rendered}");
        assert!(rendered.contains("Aes128"));
    }
}
