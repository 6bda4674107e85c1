//! BLE advertisement assembly.
//!
//! Each call derives fresh per-sequence secrets, encrypts the payload and
//! authenticates the ciphertext:
//!
//! ```text
//! epoch ──▶ DeviceID (seq 0) ──▶ address
//! (epoch, seq) ──▶ Nonce, Key ──▶ AES-CTR(payload) ──▶ CMAC[..4]
//! ```
//!
//! # Sequence numbers
//!
//! The sequence number is read from the [`SequenceSource`] and advanced only
//! when an advertisement was produced, so a failed call can be retried with
//! the same sequence context.

use eidlink_crypto::{CounterBlock, CryptoProvider, EidKeys, MasterKey};
use eidlink_proto::{
    AUTH_TAG_LEN, AdvertisementHeader, HEADER_LEN, MAX_FRAME_LEN, MAX_PAYLOAD_LEN, SEQUENCE_LIMIT,
};
use tracing::{debug, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::{
    env::{CyclicSequence, Environment, SequenceSource},
    epoch::EpochManager,
    error::EidError,
};

/// Builds advertisements into a reusable frame buffer.
///
/// Not reentrant: one advertiser serves one execution context.
pub struct BleAdvertiser<C, S = CyclicSequence> {
    crypto: C,
    sequence: S,
    frame: [u8; MAX_FRAME_LEN],
    len: usize,
}

impl<C: CryptoProvider> BleAdvertiser<C> {
    /// Advertiser using the default 0..=1023 counter.
    pub fn new(crypto: C) -> Self {
        Self::with_sequence(crypto, CyclicSequence::default())
    }
}

impl<C: CryptoProvider, S: SequenceSource> BleAdvertiser<C, S> {
    /// Advertiser reading sequence numbers from `sequence`.
    pub fn with_sequence(crypto: C, sequence: S) -> Self {
        Self { crypto, sequence, frame: [0u8; MAX_FRAME_LEN], len: 0 }
    }

    /// Build the advertisement for `payload` in the current epoch.
    ///
    /// Returns `UUID ‖ address ‖ tag ‖ ciphertext`, borrowed from the
    /// advertiser until the next call. On error the frame buffer is zeroized
    /// and the sequence number is not advanced.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `payload` is longer than 13 bytes
    /// - `NotInitialized` if `epochs` has no key or time base
    /// - `PrimitiveFailure` if the crypto collaborator fails
    pub fn advertise<E: Environment>(
        &mut self,
        epochs: &EpochManager<'_, E>,
        payload: &[u8],
    ) -> Result<&[u8], EidError> {
        let mut sequence = self.sequence.sequence_counter();
        if sequence >= SEQUENCE_LIMIT {
            sequence = 0;
        }

        match self.build(epochs, sequence, payload) {
            Ok((epoch, len)) => {
                self.len = len;
                self.sequence.advance();
                debug!(sequence, epoch, len, "advertisement built");
                Ok(&self.frame[..len])
            },
            Err(err) => {
                self.reset();
                if err.is_transient() {
                    warn!(sequence, error = %err, "advertisement failed");
                }
                Err(err)
            },
        }
    }

    /// Last frame produced, empty after an error or [`reset`](Self::reset).
    pub fn frame(&self) -> &[u8] {
        &self.frame[..self.len]
    }

    /// Zeroize the frame buffer.
    pub fn reset(&mut self) {
        self.frame.zeroize();
        self.len = 0;
    }

    /// Sequence source.
    pub fn sequence(&self) -> &S {
        &self.sequence
    }

    /// Mutable sequence source, e.g. to pin a [`FixedSequence`](crate::FixedSequence).
    pub fn sequence_mut(&mut self) -> &mut S {
        &mut self.sequence
    }

    fn build<E: Environment>(
        &mut self,
        epochs: &EpochManager<'_, E>,
        sequence: u16,
        payload: &[u8],
    ) -> Result<(u32, usize), EidError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(EidError::invalid(format!(
                "advertisement payload of {} bytes exceeds {MAX_PAYLOAD_LEN}",
                payload.len()
            )));
        }

        let master = epochs.master_key()?;
        let epoch = epochs.current_epoch()?;
        let len = self.assemble(master, epoch, sequence, payload)?;
        Ok((epoch, len))
    }

    fn assemble(
        &mut self,
        master: MasterKey<'_>,
        epoch: u32,
        sequence: u16,
        payload: &[u8],
    ) -> Result<usize, EidError> {
        let keys = EidKeys::new(&self.crypto, master);

        let device_id = keys.device_id(epoch)?;
        let nonce = keys.nonce(epoch, sequence)?;
        let key = keys.encryption_key(epoch, sequence)?;

        let len = HEADER_LEN + payload.len();
        let header = AdvertisementHeader::new(sequence, device_id, [0u8; AUTH_TAG_LEN]);
        self.frame[..HEADER_LEN].copy_from_slice(&header.to_bytes());

        let body = &mut self.frame[HEADER_LEN..len];
        body.copy_from_slice(payload);
        self.crypto.aes_ctr(key.as_bytes(), &CounterBlock::from_nonce(&nonce), body)?;

        let tag = Zeroizing::new(self.crypto.cmac(key.as_bytes(), body)?);
        self.frame[HEADER_LEN - AUTH_TAG_LEN..HEADER_LEN].copy_from_slice(&tag[..AUTH_TAG_LEN]);

        Ok(len)
    }
}

impl<C, S> Drop for BleAdvertiser<C, S> {
    fn drop(&mut self) {
        self.frame.zeroize();
    }
}

impl<C, S: std::fmt::Debug> std::fmt::Debug for BleAdvertiser<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BleAdvertiser")
            .field("sequence", &self.sequence)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}
