//! Receiver-side checks for advertisements.
//!
//! A receiver holding the master key re-derives the per-sequence key and
//! nonce for a candidate epoch, compares the truncated tag in constant time
//! and only then decrypts.

use eidlink_crypto::{CounterBlock, CryptoProvider, EidKeys, MasterKey, tags_equal};
use eidlink_proto::{AUTH_TAG_LEN, AdvertisementView, MAX_PAYLOAD_LEN};
use zeroize::Zeroizing;

use crate::error::EidError;

/// Check the truncated CMAC over `ciphertext` for (`epoch`, `sequence`).
///
/// # Errors
///
/// - `AuthenticationFailed` if the tag does not match
/// - `PrimitiveFailure` if the crypto collaborator fails
pub fn verify_tag(
    crypto: &impl CryptoProvider,
    master: MasterKey<'_>,
    epoch: u32,
    sequence: u16,
    ciphertext: &[u8],
    tag: &[u8; AUTH_TAG_LEN],
) -> Result<(), EidError> {
    let key = EidKeys::new(crypto, master).encryption_key(epoch, sequence)?;
    let expected = Zeroizing::new(crypto.cmac(key.as_bytes(), ciphertext)?);

    if tags_equal(&expected[..AUTH_TAG_LEN], tag) {
        Ok(())
    } else {
        Err(EidError::AuthenticationFailed)
    }
}

/// Decrypt `ciphertext` into `out` without checking the tag.
///
/// Returns the plaintext length (equal to the ciphertext length).
///
/// # Errors
///
/// - `InvalidArgument` if `out` is shorter than `ciphertext`
/// - `PrimitiveFailure` if the crypto collaborator fails
pub fn decrypt_payload(
    crypto: &impl CryptoProvider,
    master: MasterKey<'_>,
    epoch: u32,
    sequence: u16,
    ciphertext: &[u8],
    out: &mut [u8],
) -> Result<usize, EidError> {
    if out.len() < ciphertext.len() {
        return Err(EidError::invalid(format!(
            "output buffer of {} bytes cannot hold {} bytes",
            out.len(),
            ciphertext.len()
        )));
    }

    let keys = EidKeys::new(crypto, master);
    let nonce = keys.nonce(epoch, sequence)?;
    let key = keys.encryption_key(epoch, sequence)?;

    let plaintext = &mut out[..ciphertext.len()];
    plaintext.copy_from_slice(ciphertext);
    crypto.aes_ctr(key.as_bytes(), &CounterBlock::from_nonce(&nonce), plaintext)?;

    Ok(ciphertext.len())
}

/// Authenticated contents of an advertisement.
#[derive(Clone, PartialEq, Eq)]
pub struct OpenedAdvertisement {
    sequence: u16,
    device_id: [u8; 4],
    payload: [u8; MAX_PAYLOAD_LEN],
    len: usize,
}

impl OpenedAdvertisement {
    /// Sequence number from the address.
    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    /// Device id for the epoch.
    pub fn device_id(&self) -> [u8; 4] {
        self.device_id
    }

    /// Decrypted payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.len]
    }
}

impl std::fmt::Debug for OpenedAdvertisement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenedAdvertisement")
            .field("sequence", &self.sequence)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// Parse, authenticate and decrypt a frame built in `epoch` under `master`.
///
/// # Errors
///
/// - `InvalidArgument` if the frame is malformed
/// - `AuthenticationFailed` if the device id or tag does not match
/// - `PrimitiveFailure` if the crypto collaborator fails
pub fn open_advertisement(
    crypto: &impl CryptoProvider,
    master: MasterKey<'_>,
    epoch: u32,
    frame: &[u8],
) -> Result<OpenedAdvertisement, EidError> {
    let view = AdvertisementView::parse(frame)?;
    let sequence = view.sequence();

    let device_id = EidKeys::new(crypto, master).device_id(epoch)?;
    if !tags_equal(&device_id, &view.device_id()) {
        return Err(EidError::AuthenticationFailed);
    }

    verify_tag(crypto, master, epoch, sequence, view.ciphertext(), &view.auth_tag())?;

    let mut payload = [0u8; MAX_PAYLOAD_LEN];
    let len = decrypt_payload(crypto, master, epoch, sequence, view.ciphertext(), &mut payload)?;

    Ok(OpenedAdvertisement { sequence, device_id, payload, len })
}
