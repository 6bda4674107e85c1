//! Fuzz target for AdvertisementView::parse and open_advertisement
//!
//! Arbitrary bytes are parsed as a BLE frame and, if they parse, run through
//! receiver-side verification. Neither step may panic; forged frames must
//! fail with an error rather than authenticate.

#![no_main]

use eidlink_core::open_advertisement;
use eidlink_crypto::{MasterKey, SoftwareCrypto};
use eidlink_proto::{AdvertisementView, HEADER_LEN, MAX_FRAME_LEN, advertising_data};
use libfuzzer_sys::fuzz_target;

const KEY: [u8; 16] = [0x42; 16];

fuzz_target!(|data: &[u8]| {
    let Ok(view) = AdvertisementView::parse(data) else {
        return;
    };

    assert!(data.len() >= HEADER_LEN && data.len() <= MAX_FRAME_LEN);
    assert_eq!(view.ciphertext().len(), data.len() - HEADER_LEN);
    assert!(view.sequence() < 1024);

    let ad = advertising_data(data).expect("parsed frames fit an AD payload");
    assert!(ad.as_bytes().len() <= 31);

    if let Ok(master) = MasterKey::new(&KEY) {
        let _ = open_advertisement(&SoftwareCrypto, master, 1, data);
    }
});
