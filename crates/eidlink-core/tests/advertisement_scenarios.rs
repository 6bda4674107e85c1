//! End-to-end advertisement scenarios
//!
//! A device builds advertisements with `BleAdvertiser`; a receiver holding
//! the same master key opens them with `open_advertisement` or the lower
//! level `verify_tag` / `decrypt_payload`. Key and epochs match the
//! reference firmware test vectors.

mod common;

use common::{DAY_MS, FakeEnv, primary_key};
use eidlink_core::{
    BleAdvertiser, CounterBits, EidError, EidMode, EpochManager, FixedSequence, RotationPeriod,
    decrypt_payload, open_advertisement, verify_tag,
};
use eidlink_crypto::{EidKeys, MasterKey, SoftwareCrypto};
use eidlink_proto::AdvertisementView;

const ZERO_KEY: [u8; 32] = [0u8; 32];

fn utc_manager(key: &[u8], epoch: u64) -> EpochManager<'_, FakeEnv> {
    let mut epochs = EpochManager::new(FakeEnv::new(), EidMode::default());
    epochs.init(epoch * DAY_MS, key).unwrap();
    epochs
}

fn pinned(sequence: u16) -> BleAdvertiser<SoftwareCrypto, FixedSequence> {
    BleAdvertiser::with_sequence(SoftwareCrypto, FixedSequence::new(sequence))
}

#[test]
fn empty_payload_at_epoch_20() {
    let key = primary_key();
    let epochs = utc_manager(&key, 20);
    let mut advertiser = pinned(0);

    let frame = advertiser.advertise(&epochs, &[]).unwrap();
    let view = AdvertisementView::parse(frame).unwrap();

    assert_eq!(&frame[..2], &[0xA6, 0xFC]);
    assert_eq!(view.sequence(), 0);
    assert!(view.ciphertext().is_empty());

    let master = MasterKey::new(&key).unwrap();
    verify_tag(&SoftwareCrypto, master, 20, 0, &[], &view.auth_tag()).unwrap();
}

#[test]
fn full_payload_round_trip_at_sequence_100() {
    let key = primary_key();
    let epochs = utc_manager(&key, 20);
    let mut advertiser = pinned(100);
    let payload: Vec<u8> = (0..13u8).map(|i| i.wrapping_mul(17).wrapping_add(3)).collect();

    let frame = advertiser.advertise(&epochs, &payload).unwrap().to_vec();
    let view = AdvertisementView::parse(&frame).unwrap();
    assert_eq!(view.ciphertext().len(), 13);
    assert_ne!(view.ciphertext(), payload.as_slice());

    let master = MasterKey::new(&key).unwrap();
    let mut decrypted = [0u8; 13];
    let len = decrypt_payload(&SoftwareCrypto, master, 20, 100, view.ciphertext(), &mut decrypted)
        .unwrap();
    assert_eq!(&decrypted[..len], payload.as_slice());

    verify_tag(&SoftwareCrypto, master, 20, 100, view.ciphertext(), &view.auth_tag()).unwrap();
}

#[test]
fn various_payloads_round_trip() {
    let key = primary_key();
    let epochs = utc_manager(&key, 1);
    let master = MasterKey::new(&key).unwrap();
    let payloads: [&[u8]; 5] =
        [&[0xDE, 0xAD, 0xBE, 0xEF], &[0x00], &[0xFF], &[1, 2, 3, 4, 5], b"Hello"];

    let mut advertiser = pinned(0);
    for (i, payload) in payloads.iter().enumerate() {
        let sequence = (i * 50) as u16;
        advertiser.sequence_mut().set(sequence);

        let frame = advertiser.advertise(&epochs, payload).unwrap();
        let opened = open_advertisement(&SoftwareCrypto, master, 1, frame).unwrap();

        assert_eq!(opened.sequence(), sequence);
        assert_eq!(opened.payload(), *payload, "payload {i}");
    }
}

#[test]
fn tampered_ciphertext_fails_authentication() {
    let key = primary_key();
    let epochs = utc_manager(&key, 20);
    let master = MasterKey::new(&key).unwrap();
    let mut advertiser = pinned(42);

    let mut frame = advertiser.advertise(&epochs, &[0xDE, 0xAD, 0xBE, 0xEF]).unwrap().to_vec();
    open_advertisement(&SoftwareCrypto, master, 20, &frame).unwrap();

    frame[12] ^= 0xFF;
    let err = open_advertisement(&SoftwareCrypto, master, 20, &frame).unwrap_err();

    assert_eq!(err, EidError::AuthenticationFailed);
    assert_eq!(err.status_code(), -74);
}

#[test]
fn wrong_key_fails_and_decrypts_to_garbage() {
    let key = primary_key();
    let epochs = utc_manager(&key, 20);
    let mut advertiser = pinned(50);
    let payload = [0xDE, 0xAD, 0xBE, 0xEF];

    let frame = advertiser.advertise(&epochs, &payload).unwrap().to_vec();
    let view = AdvertisementView::parse(&frame).unwrap();
    let wrong = MasterKey::new(&ZERO_KEY).unwrap();

    assert_eq!(
        verify_tag(&SoftwareCrypto, wrong, 20, 50, view.ciphertext(), &view.auth_tag()),
        Err(EidError::AuthenticationFailed)
    );

    let mut decrypted = [0u8; 4];
    decrypt_payload(&SoftwareCrypto, wrong, 20, 50, view.ciphertext(), &mut decrypted).unwrap();
    assert_ne!(decrypted, payload);
}

#[test]
fn wrong_epoch_fails_device_id_check() {
    let key = primary_key();
    let epochs = utc_manager(&key, 20);
    let master = MasterKey::new(&key).unwrap();
    let mut advertiser = pinned(7);

    let frame = advertiser.advertise(&epochs, b"hi").unwrap();

    assert_eq!(
        open_advertisement(&SoftwareCrypto, master, 21, frame),
        Err(EidError::AuthenticationFailed)
    );
}

#[test]
fn sequence_numbers_survive_the_address() {
    let key = primary_key();
    let epochs = utc_manager(&key, 20);
    let mut advertiser = pinned(0);

    for sequence in [0u16, 1, 255, 256, 512, 1023] {
        advertiser.sequence_mut().set(sequence);
        let frame = advertiser.advertise(&epochs, &[]).unwrap();
        assert_eq!(AdvertisementView::parse(frame).unwrap().sequence(), sequence);
    }
}

#[test]
fn default_sequence_wraps_after_1023() {
    let key = primary_key();
    let epochs = utc_manager(&key, 20);
    let mut advertiser = BleAdvertiser::new(SoftwareCrypto);

    let mut last = 0;
    for _ in 0..=1024 {
        let frame = advertiser.advertise(&epochs, &[]).unwrap();
        last = AdvertisementView::parse(frame).unwrap().sequence();
        if last == 1023 {
            break;
        }
    }
    assert_eq!(last, 1023);

    let frame = advertiser.advertise(&epochs, &[]).unwrap();
    assert_eq!(AdvertisementView::parse(frame).unwrap().sequence(), 0);
}

#[test]
fn device_id_is_stable_within_epoch_and_rotates_across() {
    let key = primary_key();
    let epochs = utc_manager(&key, 20);
    let mut advertiser = pinned(0);
    let expected =
        EidKeys::new(&SoftwareCrypto, MasterKey::new(&key).unwrap()).device_id(20).unwrap();

    for sequence in [0u16, 1, 300, 1023] {
        advertiser.sequence_mut().set(sequence);
        let frame = advertiser.advertise(&epochs, &[0xAB]).unwrap();
        assert_eq!(AdvertisementView::parse(frame).unwrap().device_id(), expected);
    }

    epochs.env().advance_ms(DAY_MS);
    assert_eq!(epochs.current_epoch().unwrap(), 21);

    let frame = advertiser.advertise(&epochs, &[0xAB]).unwrap();
    assert_ne!(AdvertisementView::parse(frame).unwrap().device_id(), expected);
}

#[test]
fn counter_mode_epoch_feeds_advertisements() {
    let key = primary_key();
    let mode =
        EidMode::Counter { rotation: RotationPeriod::from_secs(900), bits: CounterBits::new(4) };
    let mut epochs = EpochManager::new(FakeEnv::new(), mode);
    epochs.init(15, &key).unwrap();
    let master = MasterKey::new(&key).unwrap();
    let mut advertiser = pinned(3);

    let frame = advertiser.advertise(&epochs, b"ctr").unwrap().to_vec();
    assert_eq!(open_advertisement(&SoftwareCrypto, master, 15, &frame).unwrap().payload(), b"ctr");

    epochs.env().advance_ms(900_000);
    assert_eq!(epochs.current_epoch().unwrap(), 0);

    let frame = advertiser.advertise(&epochs, b"ctr").unwrap();
    assert_eq!(open_advertisement(&SoftwareCrypto, master, 0, frame).unwrap().payload(), b"ctr");
}

#[test]
fn invalid_init_leaves_state_unchanged() {
    let key = primary_key();
    let mut epochs = utc_manager(&key, 20);

    let err = epochs.init(0, &key).unwrap_err();
    assert_eq!(err.status_code(), -22);

    let err = epochs.init(5 * DAY_MS, &key[..7]).unwrap_err();
    assert_eq!(err.status_code(), -22);

    assert_eq!(epochs.current_epoch().unwrap(), 20);
    assert_eq!(epochs.utc_time_last_synced(), Some(20 * DAY_MS));
}

#[test]
fn deinit_stops_advertising() {
    let key = primary_key();
    let mut epochs = utc_manager(&key, 20);
    let mut advertiser = pinned(1);
    advertiser.advertise(&epochs, &[]).unwrap();

    epochs.deinit();

    let err = advertiser.advertise(&epochs, &[]).unwrap_err();
    assert_eq!(err.status_code(), -38);
    assert!(advertiser.frame().is_empty());
}
