//! eidlink Cryptographic Primitives
//!
//! Key derivation and the block-cipher collaborator used to build ephemeral
//! identifiers. Pure functions with deterministic outputs. The AES/CMAC
//! primitives sit behind [`CryptoProvider`] so hardware-accelerated ports can
//! replace the software implementation.
//!
//! # Key Lifecycle
//!
//! A caller-owned master key is expanded into a two-level hierarchy. Level-1
//! keys change once per epoch. Level-2 values change per advertisement
//! sequence number, except the device id which is pinned to sequence 0 and
//! therefore stable for the whole epoch.
//!
//! ```text
//! Master Key (caller-owned, 16 or 32 bytes)
//!        │
//!        ▼ KDF(label, decimal(epoch))
//! DeviceKey / NonceKey / EncryptionKey        (per epoch)
//!        │
//!        ▼ KDF(label, decimal(seq))
//! DeviceID(4) / Nonce(12) / Key(key size)     (per sequence number)
//!        │
//!        ▼
//! AES-CTR + truncated AES-CMAC → advertisement
//! ```
//!
//! # Security
//!
//! Unlinkability:
//! - Epoch rotation: every identifier is re-derived when the epoch changes
//! - Sequence rotation: nonce and encryption key change per advertisement
//!
//! Key hygiene:
//! - Derived keys zeroize on drop
//! - KDF scratch buffers are wrapped in `Zeroizing` and cleared on every exit
//!   path, success or failure
//! - The master key is borrowed, never copied

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod hierarchy;
pub mod kdf;
pub mod keys;
pub mod provider;

pub use error::CryptoError;
pub use hierarchy::{DEVICE_ID_LEN, EidKeys, KeyLabel, NONCE_LEN, ValueLabel};
pub use kdf::{MESSAGE_CAPACITY, derive};
pub use keys::{DerivedKey, KeySize, MAX_KEY_LEN, MasterKey};
pub use provider::{BLOCK_SIZE, CounterBlock, CryptoProvider, SoftwareCrypto, tags_equal};
