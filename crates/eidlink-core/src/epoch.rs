//! Epoch manager: turns uptime plus a sync point into a rotation epoch.
//!
//! # Modes
//!
//! - UTC: the caller syncs wall-clock time with [`EpochManager::set_utc`].
//!   The manager stores `utc - uptime` and later computes
//!   `epoch = (base + uptime) / period`.
//! - Counter: the caller persists the epoch counter across reboots and
//!   passes it to [`EpochManager::init`]. Then
//!   `epoch = (initial + uptime / period) mod 2^bits`.
//!
//! The mode is chosen at construction and cannot change afterwards.

use eidlink_crypto::MasterKey;
use tracing::{debug, info};

use crate::{config::EidMode, env::Environment, error::EidError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeBase {
    Utc {
        /// `utc - uptime` at the last sync, modulo 2^64
        base: u64,
        /// Wall-clock time passed to the last sync
        synced_at: u64,
    },
    Counter {
        initial: u64,
    },
}

/// Epoch state for one device.
///
/// Borrows the caller's master key for `'k`; the key is never copied.
pub struct EpochManager<'k, E> {
    env: E,
    mode: EidMode,
    key: Option<MasterKey<'k>>,
    base: Option<TimeBase>,
}

impl<'k, E: Environment> EpochManager<'k, E> {
    /// Uninitialized manager in `mode`.
    pub fn new(env: E, mode: EidMode) -> Self {
        Self { env, mode, key: None, base: None }
    }

    /// Set up key and time base in one step.
    ///
    /// In UTC mode `initial_time` is wall-clock milliseconds and must be
    /// non-zero. In counter mode it is the starting epoch counter; zero means
    /// "start at epoch 0".
    ///
    /// Everything is validated before anything is stored, so on error the
    /// previous state is unchanged.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `key` is not 16 or 32 bytes, or if UTC time is 0
    pub fn init(&mut self, initial_time: u64, key: &'k [u8]) -> Result<(), EidError> {
        let key = MasterKey::new(key)?;
        let base = match self.mode {
            EidMode::Utc { .. } => self.utc_base(initial_time)?,
            EidMode::Counter { .. } => TimeBase::Counter { initial: initial_time },
        };

        self.key = Some(key);
        self.base = Some(base);

        info!(mode = ?self.mode, key_size = ?key.size(), "EID state initialized");
        Ok(())
    }

    /// Resync wall-clock time (UTC mode only).
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `utc_ms` is 0 or the manager is in counter mode
    pub fn set_utc(&mut self, utc_ms: u64) -> Result<(), EidError> {
        if matches!(self.mode, EidMode::Counter { .. }) {
            return Err(EidError::invalid("utc time is not used in counter mode"));
        }
        let base = self.utc_base(utc_ms)?;
        self.base = Some(base);

        debug!(utc_ms, "utc time synced");
        Ok(())
    }

    /// Replace the master key reference.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `key` is not 16 or 32 bytes; the previous key is
    ///   kept
    pub fn set_key(&mut self, key: &'k [u8]) -> Result<(), EidError> {
        self.key = Some(MasterKey::new(key)?);
        Ok(())
    }

    /// Forget the key and time base.
    pub fn deinit(&mut self) {
        self.key = None;
        self.base = None;
        info!("EID state cleared");
    }

    /// True once both key and time base are set.
    pub fn is_initialized(&self) -> bool {
        self.key.is_some() && self.base.is_some()
    }

    /// Epoch for the current uptime.
    ///
    /// # Errors
    ///
    /// - `NotInitialized` if no time base has been set
    /// - `InvalidArgument` if the UTC epoch no longer fits 32 bits
    pub fn current_epoch(&self) -> Result<u32, EidError> {
        let period = self.mode.rotation().as_millis();
        let uptime = self.env.uptime_ms();

        match (self.time_base()?, self.mode) {
            (TimeBase::Utc { base, .. }, _) => {
                let epoch = base.wrapping_add(uptime) / period;
                u32::try_from(epoch)
                    .map_err(|_| EidError::invalid(format!("epoch {epoch} exceeds 32 bits")))
            },
            (TimeBase::Counter { initial }, EidMode::Counter { bits, .. }) => {
                let epoch = initial.wrapping_add(uptime / period) % bits.modulus();
                Ok(epoch as u32)
            },
            (TimeBase::Counter { .. }, EidMode::Utc { .. }) => {
                Err(EidError::NotInitialized { what: "utc time" })
            },
        }
    }

    /// Milliseconds until the current epoch ends.
    ///
    /// Callers use this to schedule the next advertisement refresh.
    ///
    /// # Errors
    ///
    /// - `NotInitialized` if no time base has been set
    pub fn ms_until_rotation(&self) -> Result<u64, EidError> {
        let period = self.mode.rotation().as_millis();
        let position = match self.time_base()? {
            TimeBase::Utc { base, .. } => base.wrapping_add(self.env.uptime_ms()),
            TimeBase::Counter { .. } => self.env.uptime_ms(),
        };
        Ok(period - position % period)
    }

    /// Current wall-clock estimate in milliseconds.
    ///
    /// # Errors
    ///
    /// - `NotInitialized` if UTC time has not been synced
    pub fn utc_time(&self) -> Result<u64, EidError> {
        match self.base {
            Some(TimeBase::Utc { base, .. }) => Ok(base.wrapping_add(self.env.uptime_ms())),
            _ => Err(EidError::NotInitialized { what: "utc time" }),
        }
    }

    /// Wall-clock time passed to the last sync, if any.
    pub fn utc_time_last_synced(&self) -> Option<u64> {
        match self.base {
            Some(TimeBase::Utc { synced_at, .. }) => Some(synced_at),
            _ => None,
        }
    }

    /// Counter value passed to `init` in counter mode.
    pub fn initial_counter(&self) -> Option<u64> {
        match self.base {
            Some(TimeBase::Counter { initial }) => Some(initial),
            _ => None,
        }
    }

    /// Master key reference.
    ///
    /// # Errors
    ///
    /// - `NotInitialized` if no key has been set
    pub fn master_key(&self) -> Result<MasterKey<'k>, EidError> {
        self.key.ok_or(EidError::NotInitialized { what: "master key" })
    }

    /// Epoch mode.
    pub fn mode(&self) -> EidMode {
        self.mode
    }

    /// Environment the manager reads uptime from.
    pub fn env(&self) -> &E {
        &self.env
    }

    fn time_base(&self) -> Result<TimeBase, EidError> {
        self.base.ok_or(match self.mode {
            EidMode::Utc { .. } => EidError::NotInitialized { what: "utc time" },
            EidMode::Counter { .. } => EidError::NotInitialized { what: "epoch counter" },
        })
    }

    fn utc_base(&self, utc_ms: u64) -> Result<TimeBase, EidError> {
        if utc_ms == 0 {
            return Err(EidError::invalid("utc time must be non-zero"));
        }
        Ok(TimeBase::Utc { base: utc_ms.wrapping_sub(self.env.uptime_ms()), synced_at: utc_ms })
    }
}

impl<E> std::fmt::Debug for EpochManager<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpochManager")
            .field("mode", &self.mode)
            .field("has_key", &self.key.is_some())
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{
        config::{CounterBits, RotationPeriod},
        env::EntropyError,
    };

    const DAY_MS: u64 = 86_400_000;
    const KEY: [u8; 16] = [0x11; 16];

    #[derive(Default)]
    struct Clock {
        uptime: Cell<u64>,
    }

    impl Environment for Clock {
        fn uptime_ms(&self) -> u64 {
            self.uptime.get()
        }

        fn random_bytes(&self, _buffer: &mut [u8]) -> Result<(), EntropyError> {
            Err(EntropyError)
        }
    }

    fn counter_mode(bits: u8) -> EidMode {
        EidMode::Counter { rotation: RotationPeriod::DEFAULT, bits: CounterBits::new(bits) }
    }

    #[test]
    fn utc_epoch_is_days_since_sync_point() {
        let clock = Clock::default();
        let mut manager = EpochManager::new(&clock, EidMode::default());
        manager.init(20 * DAY_MS, &KEY).unwrap();

        assert_eq!(manager.current_epoch().unwrap(), 20);

        clock.uptime.set(DAY_MS - 1);
        assert_eq!(manager.current_epoch().unwrap(), 20);

        clock.uptime.set(DAY_MS);
        assert_eq!(manager.current_epoch().unwrap(), 21);
    }

    #[test]
    fn utc_base_accounts_for_uptime_at_sync() {
        let clock = Clock::default();
        clock.uptime.set(5_000);
        let mut manager = EpochManager::new(&clock, EidMode::default());
        manager.init(3 * DAY_MS, &KEY).unwrap();

        clock.uptime.set(5_000 + DAY_MS);
        assert_eq!(manager.current_epoch().unwrap(), 4);
        assert_eq!(manager.utc_time().unwrap(), 4 * DAY_MS);
        assert_eq!(manager.utc_time_last_synced(), Some(3 * DAY_MS));
    }

    #[test]
    fn counter_epoch_wraps_at_bit_width() {
        let clock = Clock::default();
        let mut manager = EpochManager::new(&clock, counter_mode(4));
        manager.init(14, &KEY).unwrap();

        assert_eq!(manager.current_epoch().unwrap(), 14);
        clock.uptime.set(2 * DAY_MS);
        assert_eq!(manager.current_epoch().unwrap(), 0);
        assert_eq!(manager.initial_counter(), Some(14));
    }

    #[test]
    fn counter_mode_accepts_zero_start() {
        let clock = Clock::default();
        let mut manager = EpochManager::new(&clock, counter_mode(11));
        manager.init(0, &KEY).unwrap();
        assert_eq!(manager.current_epoch().unwrap(), 0);
    }

    #[test]
    fn counter_mode_survives_huge_initial_value() {
        let clock = Clock::default();
        clock.uptime.set(DAY_MS);
        let mut manager = EpochManager::new(&clock, counter_mode(8));
        manager.init(u64::MAX, &KEY).unwrap();

        // (2^64 - 1 + 1) mod 2^8
        assert_eq!(manager.current_epoch().unwrap(), 0);
    }

    #[test]
    fn zero_utc_is_rejected_and_state_kept() {
        let clock = Clock::default();
        let mut manager = EpochManager::new(&clock, EidMode::default());
        manager.init(20 * DAY_MS, &KEY).unwrap();

        assert!(matches!(manager.set_utc(0), Err(EidError::InvalidArgument { .. })));
        assert!(matches!(manager.init(0, &KEY), Err(EidError::InvalidArgument { .. })));
        assert_eq!(manager.current_epoch().unwrap(), 20);
    }

    #[test]
    fn bad_key_is_rejected_and_state_kept() {
        let clock = Clock::default();
        let mut manager = EpochManager::new(&clock, EidMode::default());
        manager.init(20 * DAY_MS, &KEY).unwrap();

        let other = [0x22u8; 32];
        assert!(matches!(manager.init(40 * DAY_MS, &[]), Err(EidError::InvalidArgument { .. })));
        assert!(matches!(manager.set_key(&other[..7]), Err(EidError::InvalidArgument { .. })));

        assert_eq!(manager.master_key().unwrap().as_bytes(), &KEY);
        assert_eq!(manager.current_epoch().unwrap(), 20);
    }

    #[test]
    fn set_utc_is_rejected_in_counter_mode() {
        let clock = Clock::default();
        let mut manager = EpochManager::new(&clock, counter_mode(8));
        assert!(matches!(manager.set_utc(DAY_MS), Err(EidError::InvalidArgument { .. })));
    }

    #[test]
    fn uninitialized_operations_fail() {
        let clock = Clock::default();
        let manager = EpochManager::new(&clock, EidMode::default());

        assert_eq!(manager.current_epoch(), Err(EidError::NotInitialized { what: "utc time" }));
        assert_eq!(
            manager.master_key().unwrap_err(),
            EidError::NotInitialized { what: "master key" }
        );
        assert!(manager.ms_until_rotation().is_err());
        assert!(!manager.is_initialized());
    }

    #[test]
    fn deinit_clears_state() {
        let clock = Clock::default();
        let mut manager = EpochManager::new(&clock, counter_mode(8));
        manager.init(3, &KEY).unwrap();
        assert!(manager.is_initialized());

        manager.deinit();

        assert!(!manager.is_initialized());
        assert_eq!(
            manager.current_epoch(),
            Err(EidError::NotInitialized { what: "epoch counter" })
        );
        assert_eq!(manager.initial_counter(), None);
    }

    #[test]
    fn ms_until_rotation_counts_down() {
        let clock = Clock::default();
        let mut manager = EpochManager::new(&clock, EidMode::default());
        manager.init(20 * DAY_MS + 1_000, &KEY).unwrap();

        assert_eq!(manager.ms_until_rotation().unwrap(), DAY_MS - 1_000);

        clock.uptime.set(DAY_MS - 1_001);
        assert_eq!(manager.ms_until_rotation().unwrap(), 1);
    }

    #[test]
    fn counter_rotation_follows_uptime() {
        let clock = Clock::default();
        clock.uptime.set(500);
        let period = RotationPeriod::from_secs(900);
        let mode = EidMode::Counter { rotation: period, bits: CounterBits::new(6) };
        let mut manager = EpochManager::new(&clock, mode);
        manager.init(9, &KEY).unwrap();

        assert_eq!(manager.ms_until_rotation().unwrap(), 900_000 - 500);
    }
}
