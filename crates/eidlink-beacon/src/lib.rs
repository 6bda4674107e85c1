//! eidlink Beacon
//!
//! Host-side wiring for the EID core: a real clock and OS entropy
//! ([`SystemEnv`]), a radio that writes packets to stdout ([`StdoutRadio`])
//! and the argument parsing helpers the `eidlink-beacon` binary uses.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod input;
pub mod radio;
pub mod system_env;

pub use error::BeaconError;
pub use input::{parse_key, parse_payload};
pub use radio::StdoutRadio;
pub use system_env::SystemEnv;
