//! BLE advertisement wire layout.
//!
//! ```text
//! ┌──────────┬──────────────────────────────┬──────────┬──────────────┐
//! │ UUID (2) │ address (6)                  │ tag (4)  │ ciphertext   │
//! │ A6 FC    │ ver|seq_hi  seq_lo  dev_id×4 │ CMAC[..4]│ 0..=13 bytes │
//! └──────────┴──────────────────────────────┴──────────┴──────────────┘
//! ```
//!
//! The frame is carried as Service Data (AD type 0x16) next to a Complete
//! List of 16-bit UUIDs (AD type 0x03); see [`advertising_data`].

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::errors::{FrameError, Result};

/// 16-bit service UUID identifying eidlink advertisements
pub const SERVICE_UUID: u16 = 0xFCA6;

/// Address version field
pub const PROTOCOL_VERSION: u8 = 0;

/// Obfuscated address length
pub const ADDRESS_LEN: usize = 6;

/// Truncated CMAC length
pub const AUTH_TAG_LEN: usize = 4;

/// Fixed header: UUID, address and tag
pub const HEADER_LEN: usize = AdvertisementHeader::SIZE;

/// Largest plaintext payload
pub const MAX_PAYLOAD_LEN: usize = 13;

/// Largest frame
pub const MAX_FRAME_LEN: usize = HEADER_LEN + MAX_PAYLOAD_LEN;

/// Sequence numbers are 10 bits and wrap at this value
pub const SEQUENCE_LIMIT: u16 = 1 << 10;

/// AD type: Complete List of 16-bit Service UUIDs
pub const AD_TYPE_UUID16_ALL: u8 = 0x03;

/// AD type: Service Data, 16-bit UUID
pub const AD_TYPE_SERVICE_DATA16: u8 = 0x16;

/// Legacy advertising data capacity
pub const MAX_AD_LEN: usize = 31;

/// Fixed 12-byte advertisement header.
///
/// All bit patterns are valid, so the header can be cast straight from
/// received bytes.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned,
)]
pub struct AdvertisementHeader {
    uuid: [u8; 2],
    address: [u8; ADDRESS_LEN],
    auth_tag: [u8; AUTH_TAG_LEN],
}

impl AdvertisementHeader {
    /// Serialized size
    pub const SIZE: usize = 2 + ADDRESS_LEN + AUTH_TAG_LEN;

    /// Header for `sequence` and `device_id` with the given tag.
    ///
    /// Only the low 10 bits of `sequence` are encoded.
    pub fn new(sequence: u16, device_id: [u8; 4], auth_tag: [u8; AUTH_TAG_LEN]) -> Self {
        Self {
            uuid: SERVICE_UUID.to_le_bytes(),
            address: pack_address(sequence, device_id),
            auth_tag,
        }
    }

    /// Serialize to bytes.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out.copy_from_slice(IntoBytes::as_bytes(self));
        out
    }

    /// Service UUID as sent.
    pub fn service_uuid(&self) -> u16 {
        u16::from_le_bytes(self.uuid)
    }

    /// Obfuscated address.
    pub fn address(&self) -> [u8; ADDRESS_LEN] {
        self.address
    }

    /// Address version field.
    pub fn version(&self) -> u8 {
        self.address[0] >> 2
    }

    /// 10-bit sequence number.
    pub fn sequence(&self) -> u16 {
        (u16::from(self.address[0] & 0b11) << 8) | u16::from(self.address[1])
    }

    /// Device id for the epoch the frame was built in.
    pub fn device_id(&self) -> [u8; 4] {
        [self.address[2], self.address[3], self.address[4], self.address[5]]
    }

    /// Truncated authentication tag.
    pub fn auth_tag(&self) -> [u8; AUTH_TAG_LEN] {
        self.auth_tag
    }
}

/// Pack the obfuscated address.
///
/// Byte 0 holds the version in its upper 6 bits and sequence bits 9..8 in its
/// lower 2 bits; byte 1 holds sequence bits 7..0; bytes 2..6 are the device id.
pub fn pack_address(sequence: u16, device_id: [u8; 4]) -> [u8; ADDRESS_LEN] {
    let sequence = sequence % SEQUENCE_LIMIT;
    let [low, high] = sequence.to_le_bytes();
    [
        (PROTOCOL_VERSION << 2) | (high & 0b11),
        low,
        device_id[0],
        device_id[1],
        device_id[2],
        device_id[3],
    ]
}

/// Borrowed view of a received advertisement frame.
#[derive(Debug, Clone, Copy)]
pub struct AdvertisementView<'a> {
    header: &'a AdvertisementHeader,
    ciphertext: &'a [u8],
}

impl<'a> AdvertisementView<'a> {
    /// Split a frame into header and ciphertext without copying.
    ///
    /// # Errors
    ///
    /// - `FrameTooShort` if `bytes` is shorter than [`HEADER_LEN`]
    /// - `PayloadTooLarge` if the ciphertext is longer than [`MAX_PAYLOAD_LEN`]
    /// - `UnknownServiceUuid` if the UUID is not [`SERVICE_UUID`]
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let (header, ciphertext) = AdvertisementHeader::ref_from_prefix(bytes).map_err(|_| {
            FrameError::FrameTooShort { expected: HEADER_LEN, actual: bytes.len() }
        })?;

        if ciphertext.len() > MAX_PAYLOAD_LEN {
            return Err(FrameError::PayloadTooLarge {
                size: ciphertext.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }

        if header.service_uuid() != SERVICE_UUID {
            return Err(FrameError::UnknownServiceUuid(header.service_uuid()));
        }

        Ok(Self { header, ciphertext })
    }

    /// Fixed header.
    pub fn header(&self) -> &'a AdvertisementHeader {
        self.header
    }

    /// 10-bit sequence number.
    pub fn sequence(&self) -> u16 {
        self.header.sequence()
    }

    /// Device id bytes from the address.
    pub fn device_id(&self) -> [u8; 4] {
        self.header.device_id()
    }

    /// Truncated tag.
    pub fn auth_tag(&self) -> [u8; AUTH_TAG_LEN] {
        self.header.auth_tag()
    }

    /// Encrypted payload.
    pub fn ciphertext(&self) -> &'a [u8] {
        self.ciphertext
    }
}

/// Legacy advertising data wrapping one frame.
#[derive(Clone, PartialEq, Eq)]
pub struct AdvertisingData {
    bytes: [u8; MAX_AD_LEN],
    len: usize,
}

impl AdvertisingData {
    /// Encoded AD structures.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl std::fmt::Debug for AdvertisingData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvertisingData").field("len", &self.len).finish()
    }
}

/// Wrap a frame in the AD structures scanners look for:
/// `[03 03 A6 FC] [len+1 16 frame…]`.
///
/// # Errors
///
/// - `FrameTooShort` if `frame` has no room for the UUID
/// - `PayloadTooLarge` if `frame` is longer than [`MAX_FRAME_LEN`]
pub fn advertising_data(frame: &[u8]) -> Result<AdvertisingData> {
    if frame.len() < 2 {
        return Err(FrameError::FrameTooShort { expected: 2, actual: frame.len() });
    }
    if frame.len() > MAX_FRAME_LEN {
        return Err(FrameError::PayloadTooLarge { size: frame.len(), max: MAX_FRAME_LEN });
    }

    let [uuid_low, uuid_high] = SERVICE_UUID.to_le_bytes();
    let mut bytes = [0u8; MAX_AD_LEN];
    bytes[..4].copy_from_slice(&[3, AD_TYPE_UUID16_ALL, uuid_low, uuid_high]);
    bytes[4] = frame.len() as u8 + 1;
    bytes[5] = AD_TYPE_SERVICE_DATA16;
    bytes[6..6 + frame.len()].copy_from_slice(frame);

    Ok(AdvertisingData { bytes, len: 6 + frame.len() })
}
