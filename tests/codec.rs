mod common;

use amiikit::codec::{self, HMAC_POS_DATA, HMAC_POS_TAG};
use amiikit::formats::ntag::{self, CONFIG_BYTES, NTAG_SIZE, NTAG_SIZE_WITH_SIGNATURE};
use hex_literal::hex;
use sha2::{Digest, Sha256};

#[test]
fn synthetic_key_file_is_stable() {
    assert_eq!(hex::encode(Sha256::digest(common::key_file())), common::KEY_FILE_SHA256);
    assert!(!common::keys().matches_retail_digests());
}

#[test]
fn derived_keys_match_known_answers() {
    let keys = common::keys();
    let plain = common::sample_plain();

    assert_eq!(
        keys.data().derive(&plain).to_bytes(),
        hex!(
            "866a6adb903bff0fc80fc88131906775"
            "8694ebf5e90de1c62217ed74938d6d50"
            "2ad27e831a206963ce738a4ce3c8bb87"
        )
    );
    assert_eq!(
        keys.tag().derive(&plain).to_bytes(),
        hex!(
            "990575841e495ec06f0b2c6c456a2516"
            "fa3542254f80f0b297993c98b6075a7c"
            "ee754d2cdf20f4d162a3b4295f9e1dc6"
        )
    );
}

#[test]
fn pack_matches_known_answer() {
    let raw = codec::pack(&common::keys(), &common::sample_plain());

    assert_eq!(raw.len(), NTAG_SIZE_WITH_SIGNATURE);
    assert_eq!(
        hex::encode(Sha256::digest(raw)),
        "34d6fb6c1bed03a270eb30d2e2f37bb1f44f9ce6189b7e0b97ce10358400f2a4"
    );
    // serial and lock bytes pass through unencrypted
    assert_eq!(raw[..0x10], hex!("bddcfb1a3958779611304f6e8daccbea"));
    assert_eq!(raw[0x208..0x214], CONFIG_BYTES);
    assert_eq!(
        raw[0x14..0x34],
        hex!("8efc1e5232ee63906c97cc4c5e9fe7a1ba4ec8685c200edb648f762790d163f7")
    );
}

#[test]
fn unpack_recovers_the_plaintext() {
    let keys = common::keys();
    let plain = common::sample_plain();
    let raw = keys.pack(&plain);

    let unpacked = keys.unpack(&raw).unwrap();
    assert!(unpacked.valid);
    assert_eq!(
        unpacked.data[HMAC_POS_DATA..HMAC_POS_DATA + 0x20],
        hex!("78dcb4b449fcb32da3528e8b1ec9d6df0bed2fad94edeae94dccfd8e0b36f4a8")
    );
    assert_eq!(
        unpacked.data[HMAC_POS_TAG..HMAC_POS_TAG + 0x20],
        hex!("ab7b9c2784d69686321bc98182e44887eb10e10071b70aaefeeeeaca096cb642")
    );

    // only the two HMAC fields differ from the input
    for (i, (a, b)) in unpacked.data.iter().zip(plain.iter()).enumerate() {
        let in_hmac = (HMAC_POS_DATA..HMAC_POS_DATA + 0x20).contains(&i)
            || (HMAC_POS_TAG..HMAC_POS_TAG + 0x20).contains(&i);
        if !in_hmac {
            assert_eq!(a, b, "byte {i:#05x}");
        }
    }

    assert_eq!(keys.pack(&unpacked.data), raw);
}

#[test]
fn short_dump_round_trips() {
    let keys = common::keys();
    let plain = common::sample_plain();
    let full = keys.pack(&plain);

    let mut short = [0u8; NTAG_SIZE];
    codec::pack_to_tag(&keys, &plain, &mut short).unwrap();
    assert_eq!(short[..], full[..NTAG_SIZE]);

    let unpacked = codec::unpack(&keys, &short).unwrap();
    assert!(unpacked.valid);
    assert!(unpacked.data[0x208..].iter().all(|&b| b == 0xFF));

    let mut odd = [0u8; 100];
    assert!(codec::pack_to_tag(&keys, &plain, &mut odd).is_err());
}

#[test]
fn any_flipped_ciphertext_bit_is_detected() {
    let keys = common::keys();
    let raw = keys.pack(&common::sample_plain());

    // crypto buffer lands at physical 0x014..0x034 and 0x0A0..0x208
    let positions = (0x014..0x034).chain(0x0A0..0x208);
    for (n, pos) in positions.enumerate() {
        let mut tampered = raw;
        tampered[pos] ^= 1 << (n % 8);
        let unpacked = codec::unpack(&keys, &tampered).unwrap();
        assert!(!unpacked.valid, "flip at {pos:#05x} went unnoticed");
    }
}

#[test]
fn serial_and_statue_id_are_signed() {
    let keys = common::keys();
    let raw = keys.pack(&common::sample_plain());

    // physical 0x000 is the serial, 0x054 the statue ID
    for pos in [0x000, 0x005, 0x054, 0x07F] {
        let mut tampered = raw;
        tampered[pos] ^= 0x80;
        assert!(!codec::unpack(&keys, &tampered).unwrap().valid, "{pos:#05x}");
    }
}

#[test]
fn signature_and_config_are_not_signed() {
    let keys = common::keys();
    let mut raw = keys.pack(&common::sample_plain());
    raw[0x21C] ^= 0xFF;
    raw[0x208] ^= 0xFF;
    assert!(codec::unpack(&keys, &raw).unwrap().valid);
}

#[test]
fn wrong_sizes_are_rejected() {
    let keys = common::keys();
    assert!(codec::unpack(&keys, &[0u8; 541]).is_err());
    assert!(ntag::tag_to_internal(&[0u8; 0x228]).is_err());
}
