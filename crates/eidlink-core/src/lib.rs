//! eidlink Core
//!
//! Ephemeral identifier (EID) state for a tracking device: which epoch it is
//! in, which sequence number comes next, and how both turn into an encrypted
//! BLE advertisement or a FEC-protected satellite packet.
//!
//! # Architecture
//!
//! Core logic is decoupled from I/O through the [`Environment`] trait:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              Device firmware / CLI           │
//! │  (clock, entropy, radios, persisted state)   │
//! └───────────┬───────────────────────┬──────────┘
//!             │ Environment           │ SatelliteRadio
//! ┌───────────▼───────────┐   ┌───────▼──────────┐
//! │     EpochManager      │──▶│  BleAdvertiser   │──▶ advertisement bytes
//! │ (epoch, master key)   │   │  SatPacketBuilder│──▶ 6-bit symbols
//! └───────────────────────┘   └──────────────────┘
//! ```
//!
//! The core never reads the system clock or entropy directly, never sleeps
//! and never transmits. That keeps every component deterministic under test.
//!
//! # Receiving
//!
//! [`open_advertisement`] is the receiver-side inverse of
//! [`BleAdvertiser::advertise`]: given the master key and a candidate epoch
//! it checks the device id and tag, then decrypts.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod ble;
pub mod config;
pub mod env;
pub mod epoch;
pub mod error;
pub mod sat;
pub mod verify;

pub use ble::BleAdvertiser;
pub use config::{ConfigError, CounterBits, EidMode, RotationPeriod, SatConfig};
pub use env::{CyclicSequence, EntropyError, Environment, FixedSequence, SequenceSource};
pub use epoch::EpochManager;
pub use error::EidError;
pub use sat::{SatPacket, SatPacketBuilder, SatelliteRadio};
pub use verify::{OpenedAdvertisement, decrypt_payload, open_advertisement, verify_tag};
