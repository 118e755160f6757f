mod common;

use amiikit::games::{Game, GameRegistry};
use amiikit::manager::{AmiiboManager, Config};
use amiikit::tag::AmiiboTag;
use amiikit::tag::settings::Status;
use amiikit::tag::title::TitleId;
use amiikit::{Error, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;

const TEST_APP_ID: u32 = 0x0010_0A00;

struct Zeroed;

impl Game for Zeroed {
    fn name(&self) -> &'static str {
        "Zeroed"
    }
    fn app_id(&self) -> u32 {
        TEST_APP_ID
    }
    fn initialization_title_ids(&self) -> &'static [TitleId] {
        &[TitleId(0x0004_0000_0010_0A00)]
    }
    fn initialize_app_data(&self, app_data: &mut [u8]) -> Result<()> {
        app_data.fill(0);
        app_data[0] = 0x01;
        Ok(())
    }
}

fn manager() -> AmiiboManager {
    let mut games = GameRegistry::new();
    games.register(TEST_APP_ID, || Box::new(Zeroed)).unwrap();
    AmiiboManager::with_keys(common::keys()).with_games(games)
}

fn sample_dump() -> Vec<u8> {
    common::keys().pack(&common::sample_plain()).to_vec()
}

#[test]
fn decrypt_then_encrypt_is_identity() {
    let manager = manager();
    let raw = sample_dump();

    let tag = manager.decrypt_tag(&raw).unwrap();
    assert!(tag.is_decrypted());
    assert_eq!(manager.encrypt_tag(&tag).unwrap(), raw);
}

#[test]
fn tampered_dump_is_refused() {
    let manager = manager();
    let mut raw = sample_dump();
    raw[0x100] ^= 0x01;
    assert!(matches!(manager.decrypt_tag(&raw), Err(Error::IntegrityCheckFailed)));
}

#[test]
fn encrypted_tag_cannot_be_encrypted_again() {
    let manager = manager();
    let tag = manager.read_encrypted_tag(&sample_dump()).unwrap();
    assert!(matches!(manager.encrypt_tag(&tag), Err(Error::NotDecrypted)));
}

#[test]
fn key_file_loads_from_disk() {
    let path = common::temp_file("key_retail.bin", &common::key_file());
    let manager = AmiiboManager::from_config(&Config {
        key_file: Some(path.clone()),
    })
    .unwrap();
    assert!(manager.has_keys());
    assert!(manager.decrypt_tag(&sample_dump()).is_ok());

    let short = common::temp_file("short.bin", &common::key_file()[..100]);
    let mut manager = AmiiboManager::new();
    assert!(matches!(manager.load_key_file(&short), Err(Error::InvalidKeyFile(_))));
    assert!(!manager.has_keys());
    manager.load_key_file(&path).unwrap();
    assert!(manager.has_keys());
}

#[test]
fn edited_tag_survives_a_round_trip() {
    let manager = manager();
    let mut tag = manager.decrypt_tag(&sample_dump()).unwrap();

    tag.randomize_uid_with(&mut StdRng::seed_from_u64(7));
    let uid = tag.uid();
    tag.initialize_app_data(&Zeroed).unwrap();
    tag.settings_mut().user_data_mut().set_nickname("Link");
    let counter = tag.write_counter();

    let raw = manager.encrypt_tag(&tag).unwrap();
    let reread = manager.decrypt_tag(&raw).unwrap();

    assert!(reread.is_uid_valid());
    assert_eq!(reread.uid(), uid);
    assert_eq!(reread.write_counter(), counter);
    assert_eq!(reread.settings().user_data().nickname(), "Link");
    assert!(reread.has_app_data());
    assert_eq!(reread.app_data_buffer()[0], 0x01);

    let game = reread
        .settings()
        .app_data()
        .resolve_game(manager.games())
        .unwrap();
    assert_eq!(game.name(), "Zeroed");
}

#[test]
fn encrypted_view_still_exposes_identity() {
    let manager = manager();
    let raw = sample_dump();
    let encrypted = manager.read_encrypted_tag(&raw).unwrap();
    let decrypted = manager.decrypt_tag(&raw).unwrap();

    assert_eq!(encrypted.uid(), decrypted.uid());
    assert_eq!(encrypted.amiibo(), decrypted.amiibo());
    assert_ne!(encrypted.crypto_buffer(), decrypted.crypto_buffer());
    assert!(!encrypted.has_app_data());
    assert!(!encrypted.has_user_data());
}

#[test]
fn fresh_tag_reports_no_data() {
    let mut data = common::sample_plain();
    data[0x02C] = 0;
    let tag = AmiiboTag::from_internal(data, true);
    assert_eq!(tag.settings().status(), Status::empty());
    assert!(!tag.has_app_data());
    assert!(!tag.has_user_data());
}

#[cfg(feature = "originality")]
#[test]
fn synthetic_dump_is_not_original() {
    let manager = manager();
    let tag = manager.decrypt_tag(&sample_dump()).unwrap();
    assert!(!tag.is_ntag_signature_valid());

    let mut short = [0u8; amiikit::formats::ntag::NTAG_SIZE];
    short.copy_from_slice(&sample_dump()[..amiikit::formats::ntag::NTAG_SIZE]);
    let tag = manager.read_encrypted_tag(&short).unwrap();
    assert!(tag.ntag_ecdsa_signature().iter().all(|&b| b == 0xFF));
    assert!(!tag.is_ntag_signature_valid());
}
