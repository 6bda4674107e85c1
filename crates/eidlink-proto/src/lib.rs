//! eidlink Wire Formats
//!
//! Bit-exact layouts for the two things a device transmits: BLE
//! advertisements and satellite uplink packets. Everything here is pure
//! encoding; keys, epochs and sequence counters live in `eidlink-core`.
//!
//! # Satellite symbols
//!
//! Satellite frames are built bit by bit with [`BitWriter`], packed into
//! 6-bit symbols and protected by a [`FecEncoder`]:
//!
//! ```text
//! fields ──append──▶ BitWriter ──pack──▶ symbols ──FEC──▶ symbols ‖ parity
//! ```
//!
//! # BLE advertisements
//!
//! [`AdvertisementHeader`] is a fixed 12-byte layout cast directly from
//! received bytes with `zerocopy`; [`AdvertisementView`] adds the trailing
//! ciphertext. Parsing checks structure only. Authenticity is checked by
//! the receiver in `eidlink-core`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod advertisement;
pub mod bitwriter;
pub mod errors;
pub mod fec;
pub mod sat;

pub use advertisement::{
    AUTH_TAG_LEN, AdvertisementHeader, AdvertisementView, AdvertisingData, HEADER_LEN,
    MAX_FRAME_LEN, MAX_PAYLOAD_LEN, SEQUENCE_LIMIT, SERVICE_UUID, advertising_data, pack_address,
};
pub use bitwriter::{BitWriter, MAX_SYMBOLS, SYMBOL_BITS, SYMBOL_MASK};
pub use errors::{FrameError, Result};
pub use fec::{FecEncoder, ReedSolomon64};
pub use sat::{
    MAX_CHANNELS, PHY_PARITY, PHY_SYMBOLS, SizeClass, encode_payload_frame, encode_physical_frame,
};
