//! Two-level key hierarchy for ephemeral identifiers
//!
//! Level 1 keys are derived from the master key with the epoch as context.
//! Level 2 values are derived from the matching level 1 key with the
//! sequence number as context. Contexts are ASCII decimal strings.

use zeroize::Zeroizing;

use crate::{
    error::CryptoError,
    kdf::derive,
    keys::{DerivedKey, MasterKey},
    provider::CryptoProvider,
};

/// Length of the device id embedded in the advertisement address
pub const DEVICE_ID_LEN: usize = 4;

/// Length of the CTR nonce
pub const NONCE_LEN: usize = 12;

/// Level 1 key labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLabel {
    /// Parent of the device id
    DeviceKey,
    /// Parent of the CTR nonce
    NonceKey,
    /// Parent of the per-sequence encryption key
    EncryptionKey,
}

impl KeyLabel {
    /// KDF label bytes.
    pub const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::DeviceKey => b"DeviceKey",
            Self::NonceKey => b"NonceKey",
            Self::EncryptionKey => b"EncryptionKey",
        }
    }
}

/// Level 2 value labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueLabel {
    /// 4-byte device id
    DeviceId,
    /// 12-byte CTR nonce
    Nonce,
    /// Encryption/MAC key, same size as the master key
    Key,
}

impl ValueLabel {
    /// KDF label bytes.
    pub const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::DeviceId => b"DeviceID",
            Self::Nonce => b"Nonce",
            Self::Key => b"Key",
        }
    }

    /// Level 1 key this value is derived from.
    pub const fn parent(self) -> KeyLabel {
        match self {
            Self::DeviceId => KeyLabel::DeviceKey,
            Self::Nonce => KeyLabel::NonceKey,
            Self::Key => KeyLabel::EncryptionKey,
        }
    }
}

/// ASCII decimal rendering of a counter, without terminator.
struct Decimal {
    digits: [u8; 10],
    start: usize,
}

impl Decimal {
    fn new(mut value: u32) -> Self {
        let mut digits = [0u8; 10];
        let mut start = digits.len();
        loop {
            start -= 1;
            digits[start] = b'0' + (value % 10) as u8;
            value /= 10;
            if value == 0 {
                break;
            }
        }
        Self { digits, start }
    }

    fn as_bytes(&self) -> &[u8] {
        &self.digits[self.start..]
    }
}

/// Derivations rooted at one master key.
///
/// Borrows both the provider and the master key; holds no secret state of
/// its own.
pub struct EidKeys<'a, 'k, C> {
    crypto: &'a C,
    master: MasterKey<'k>,
}

impl<'a, 'k, C: CryptoProvider> EidKeys<'a, 'k, C> {
    /// Hierarchy rooted at `master`.
    pub fn new(crypto: &'a C, master: MasterKey<'k>) -> Self {
        Self { crypto, master }
    }

    /// Level 1 key for `label` in `epoch`.
    pub fn level1(&self, label: KeyLabel, epoch: u32) -> Result<DerivedKey, CryptoError> {
        let mut key = DerivedKey::zeroed(self.master.size());
        let context = Decimal::new(epoch);
        derive(
            self.crypto,
            self.master.as_bytes(),
            label.as_bytes(),
            context.as_bytes(),
            key.as_mut_bytes(),
        )?;
        Ok(key)
    }

    /// Level 2 value for `label`, filling `output`.
    ///
    /// The intermediate level 1 key is zeroized before returning.
    pub fn value(
        &self,
        label: ValueLabel,
        epoch: u32,
        seq: u16,
        output: &mut [u8],
    ) -> Result<(), CryptoError> {
        let parent = self.level1(label.parent(), epoch)?;
        let context = Decimal::new(u32::from(seq));
        derive(self.crypto, parent.as_bytes(), label.as_bytes(), context.as_bytes(), output)
    }

    /// Device id for `epoch`. Always derived with sequence number 0 so it is
    /// stable for the whole epoch.
    pub fn device_id(&self, epoch: u32) -> Result<[u8; DEVICE_ID_LEN], CryptoError> {
        let mut id = [0u8; DEVICE_ID_LEN];
        self.value(ValueLabel::DeviceId, epoch, 0, &mut id)?;
        Ok(id)
    }

    /// CTR nonce for (`epoch`, `seq`).
    pub fn nonce(&self, epoch: u32, seq: u16) -> Result<Zeroizing<[u8; NONCE_LEN]>, CryptoError> {
        let mut nonce = Zeroizing::new([0u8; NONCE_LEN]);
        self.value(ValueLabel::Nonce, epoch, seq, &mut nonce[..])?;
        Ok(nonce)
    }

    /// Encryption and MAC key for (`epoch`, `seq`).
    pub fn encryption_key(&self, epoch: u32, seq: u16) -> Result<DerivedKey, CryptoError> {
        let mut key = DerivedKey::zeroed(self.master.size());
        self.value(ValueLabel::Key, epoch, seq, key.as_mut_bytes())?;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{kdf, provider::SoftwareCrypto};

    const MASTER: [u8; 32] = [
        0xcd, 0x15, 0xa5, 0xab, 0xc0, 0x60, 0xb6, 0x72, 0x88, 0xa6, 0x1e, 0x44, 0xe9, 0x95, 0xba,
        0x77, 0xd1, 0x40, 0xbd, 0x46, 0x56, 0x4b, 0x88, 0xde, 0x41, 0xc1, 0x5a, 0x92, 0x73, 0xb0,
        0xce, 0x85,
    ];

    fn keys() -> EidKeys<'static, 'static, SoftwareCrypto> {
        EidKeys::new(&SoftwareCrypto, MasterKey::new(&MASTER).unwrap())
    }

    #[test]
    fn decimal_rendering() {
        assert_eq!(Decimal::new(0).as_bytes(), b"0");
        assert_eq!(Decimal::new(20).as_bytes(), b"20");
        assert_eq!(Decimal::new(1023).as_bytes(), b"1023");
        assert_eq!(Decimal::new(u32::MAX).as_bytes(), b"4294967295");
    }

    #[test]
    fn level1_matches_direct_kdf() {
        let level1 = keys().level1(KeyLabel::NonceKey, 20).unwrap();

        let mut expected = [0u8; 32];
        kdf::derive(&SoftwareCrypto, &MASTER, b"NonceKey", b"20", &mut expected).unwrap();

        assert_eq!(level1.as_bytes(), &expected);
    }

    #[test]
    fn value_is_derived_from_matching_parent() {
        let parent = keys().level1(KeyLabel::EncryptionKey, 20).unwrap();
        let mut expected = [0u8; 32];
        kdf::derive(&SoftwareCrypto, parent.as_bytes(), b"Key", b"100", &mut expected).unwrap();

        let key = keys().encryption_key(20, 100).unwrap();

        assert_eq!(key.as_bytes(), &expected);
    }

    #[test]
    fn device_id_ignores_sequence_number() {
        let id = keys().device_id(20).unwrap();

        let mut explicit = [0u8; DEVICE_ID_LEN];
        keys().value(ValueLabel::DeviceId, 20, 0, &mut explicit).unwrap();

        assert_eq!(id, explicit);
    }

    #[test]
    fn device_id_changes_with_epoch() {
        assert_ne!(keys().device_id(20).unwrap(), keys().device_id(21).unwrap());
    }

    #[test]
    fn nonce_is_consistent_and_rotates_with_sequence() {
        let first = keys().nonce(20, 100).unwrap();
        let again = keys().nonce(20, 100).unwrap();
        let next = keys().nonce(20, 101).unwrap();

        assert_eq!(*first, *again);
        assert_ne!(*first, *next);
    }

    #[test]
    fn encryption_key_rotates_with_sequence_and_epoch() {
        let base = keys().encryption_key(20, 100).unwrap();

        assert_ne!(base.as_bytes(), keys().encryption_key(20, 101).unwrap().as_bytes());
        assert_ne!(base.as_bytes(), keys().encryption_key(21, 100).unwrap().as_bytes());
    }

    #[test]
    fn derived_key_size_follows_master() {
        let short = [9u8; 16];
        let keys = EidKeys::new(&SoftwareCrypto, MasterKey::new(&short).unwrap());

        assert_eq!(keys.encryption_key(1, 1).unwrap().as_bytes().len(), 16);
        assert_eq!(keys.level1(KeyLabel::DeviceKey, 1).unwrap().as_bytes().len(), 16);
    }

    #[test]
    fn labels() {
        assert_eq!(ValueLabel::DeviceId.parent(), KeyLabel::DeviceKey);
        assert_eq!(ValueLabel::Nonce.parent(), KeyLabel::NonceKey);
        assert_eq!(ValueLabel::Key.parent(), KeyLabel::EncryptionKey);
        assert_eq!(KeyLabel::EncryptionKey.as_bytes(), b"EncryptionKey");
        assert_eq!(ValueLabel::DeviceId.as_bytes(), b"DeviceID");
    }
}
