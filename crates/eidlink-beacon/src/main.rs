//! eidlink beacon binary.
//!
//! # Usage
//!
//! ```bash
//! # Three BLE advertisements in UTC mode, wall clock taken from the host
//! eidlink-beacon --key <hex> ble --payload deadbeef --count 3
//!
//! # Counter mode with a persisted epoch counter
//! eidlink-beacon --key <hex> --counter-bits 11 --initial-counter 42 ble
//!
//! # Satellite packets on up to 8 channels
//! eidlink-beacon --key <hex> --channels 8 sat --device-id 1234 --payload 01020304
//! ```

use clap::{Parser, Subcommand};
use eidlink_beacon::{BeaconError, StdoutRadio, SystemEnv, parse_key, parse_payload};
use eidlink_core::{
    BleAdvertiser, CounterBits, CyclicSequence, EidMode, EpochManager, RotationPeriod, SatConfig,
    SatPacketBuilder, SatelliteRadio,
};
use eidlink_crypto::SoftwareCrypto;
use eidlink_proto::advertising_data;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// eidlink beacon
#[derive(Parser, Debug)]
#[command(name = "eidlink-beacon")]
#[command(about = "Emit ephemeral-identifier advertisements and satellite packets")]
#[command(version)]
struct Args {
    /// Master key as hex (16 or 32 bytes)
    #[arg(short, long)]
    key: String,

    /// Wall-clock time in ms since the Unix epoch (UTC mode, default: host clock)
    #[arg(long, conflicts_with = "counter_bits")]
    utc_ms: Option<u64>,

    /// Use counter mode with an epoch counter of this many bits (4..=11)
    #[arg(long)]
    counter_bits: Option<u8>,

    /// Persisted epoch counter to start from (counter mode)
    #[arg(long, default_value = "0", requires = "counter_bits")]
    initial_counter: u64,

    /// Epoch length in seconds (900..=86400)
    #[arg(long, default_value = "86400")]
    rotation_secs: u32,

    /// Satellite channels to pick from (1..=16)
    #[arg(long, default_value = "16")]
    channels: u8,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build BLE advertisements
    Ble {
        /// Payload as hex (0..=13 bytes)
        #[arg(short, long, default_value = "")]
        payload: String,

        /// First sequence number
        #[arg(long, default_value = "0")]
        sequence: u16,

        /// Advertisements to build
        #[arg(short, long, default_value = "1")]
        count: usize,
    },

    /// Build satellite packets
    Sat {
        /// Device id carried in the payload frame (low 32 bits are sent)
        #[arg(long)]
        device_id: u64,

        /// Payload as hex (0, 4, 9 or 13 bytes)
        #[arg(short, long, default_value = "")]
        payload: String,

        /// Packets to build
        #[arg(short, long, default_value = "1")]
        count: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let rotation = RotationPeriod::try_from_secs(args.rotation_secs)?;
    let mode = match args.counter_bits {
        Some(bits) => EidMode::Counter { rotation, bits: CounterBits::try_new(bits)? },
        None => EidMode::Utc { rotation },
    };

    let env = SystemEnv::new();
    let initial_time = match mode {
        EidMode::Utc { .. } => match args.utc_ms {
            Some(utc_ms) => utc_ms,
            None => env.wall_clock_ms()?,
        },
        EidMode::Counter { .. } => args.initial_counter,
    };

    let key = parse_key(&args.key)?;
    let mut epochs = EpochManager::new(env, mode);
    epochs.init(initial_time, &key)?;

    let epoch = epochs.current_epoch()?;
    let refresh_ms = epochs.ms_until_rotation()?;
    tracing::info!(epoch, refresh_ms, "beacon ready");

    match args.command {
        Command::Ble { payload, sequence, count } => {
            let payload = parse_payload(&payload)?;
            run_ble(&epochs, &payload, sequence, count)?;
        },
        Command::Sat { device_id, payload, count } => {
            let payload = parse_payload(&payload)?;
            let config = SatConfig::new(args.channels)?;
            run_sat(epochs.env(), config, device_id, &payload, count)?;
        },
    }

    epochs.deinit();
    Ok(())
}

fn run_ble(
    epochs: &EpochManager<'_, SystemEnv>,
    payload: &[u8],
    sequence: u16,
    count: usize,
) -> Result<(), BeaconError> {
    use std::io::Write;

    let mut advertiser =
        BleAdvertiser::with_sequence(SoftwareCrypto, CyclicSequence::starting_at(sequence));
    let mut out = std::io::stdout().lock();

    for _ in 0..count {
        let frame = advertiser.advertise(epochs, payload)?;
        let ad = advertising_data(frame)?;
        writeln!(out, "{}", hex::encode(ad.as_bytes()))?;
    }

    advertiser.reset();
    Ok(())
}

fn run_sat(
    env: &SystemEnv,
    config: SatConfig,
    device_id: u64,
    payload: &[u8],
    count: usize,
) -> Result<(), BeaconError> {
    let mut builder = SatPacketBuilder::new(config);
    let mut radio = StdoutRadio::new();

    for _ in 0..count {
        let packet = builder.build_packet(env, device_id, payload)?;
        radio.transmit_packet(&packet)?;
    }

    tracing::info!(sent = radio.sent(), "satellite packets written");
    Ok(())
}
