//! The [`AmiiboTag`] aggregate: a canonical buffer plus typed views.
//!
//! ## Windows over the canonical buffer
//! ```text
//! [0x000] Lock bytes + CC       (0x008)   BCC1 is byte 0
//! [0x008] Data signature        (0x020)
//! [0x028] Crypto-init sequence  (0x004)   byte 0x029-0x02A: write counter
//! [0x02C] Crypto buffer         (0x188)   see [`settings`]
//! [0x0DC]   App data            (0x0D8)   inside the crypto buffer
//! [0x1B4] Tag signature         (0x020)
//! [0x1D4] NTAG serial           (0x008)   UID0-2, BCC0, UID3-6
//! [0x1DC] Plaintext data        (0x02C)   statue ID first
//! [0x208] NTAG ECDSA signature  (0x020)
//! ```
//!
//! UID checks and the originality signature work on any tag. Settings and
//! app data only mean something once the tag is decrypted.

pub mod amiibo;
pub mod app_data;
pub mod mii;
pub mod settings;
pub mod title;
pub mod user_data;

use std::ops::Range;

use chrono::Utc;
use rand::Rng;
use tracing::debug;

use self::amiibo::Amiibo;
use self::app_data::{APP_DATA_OFFSET, APP_DATA_SIZE};
use self::settings::{Settings, Status};
use crate::codec::Unpacked;
use crate::crypto::cipher::{CRYPTO_LEN, CRYPTO_OFFSET};
use crate::formats::ntag::{self, AMIIBO_SIZE};
use crate::games::Game;
use crate::utils::{be_u16, bytesa, pack_date, set_be_u16};
use crate::{Error, Result};

const LOCK_BYTES_CC: Range<usize> = 0x000..0x008;
const DATA_SIGNATURE: Range<usize> = 0x008..0x028;
const CRYPTO_INIT_SEQUENCE: Range<usize> = 0x028..0x02C;
const CRYPTO_BUFFER: Range<usize> = CRYPTO_OFFSET..CRYPTO_OFFSET + CRYPTO_LEN;
const APP_DATA: Range<usize> =
    CRYPTO_OFFSET + APP_DATA_OFFSET..CRYPTO_OFFSET + APP_DATA_OFFSET + APP_DATA_SIZE;
const TAG_SIGNATURE: Range<usize> = 0x1B4..0x1D4;
const NTAG_SERIAL: Range<usize> = 0x1D4..0x1DC;
const PLAINTEXT_DATA: Range<usize> = 0x1DC..0x208;
const NTAG_ECDSA_SIGNATURE: Range<usize> = 0x208..0x228;

const STATUE_ID: usize = 0x1DC;
const WRITE_COUNTER: usize = 0x029;

/// NXP manufacturer code, always the first UID byte.
pub const NXP_MANUFACTURER_CODE: u8 = 0x04;
/// Cascade tag folded into BCC0.
const CASCADE_TAG: u8 = 0x88;

/// BCC0 and BCC1 for a 7-byte UID.
pub fn uid_checksums(uid: &[u8; 7]) -> (u8, u8) {
    let bcc0 = CASCADE_TAG ^ uid[0] ^ uid[1] ^ uid[2];
    let bcc1 = uid[3] ^ uid[4] ^ uid[5] ^ uid[6];
    (bcc0, bcc1)
}

macro_rules! windows {
    ($($(#[$doc:meta])* $get:ident, $get_mut:ident, $range:expr;)*) => {
        $(
            $(#[$doc])*
            pub fn $get(&self) -> &[u8] {
                &self.data[$range]
            }

            $(#[$doc])*
            pub fn $get_mut(&mut self) -> &mut [u8] {
                &mut self.data[$range]
            }
        )*
    };
}

/// An amiibo held as a canonical buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct AmiiboTag {
    data: [u8; AMIIBO_SIZE],
    decrypted: bool,
}

impl AmiiboTag {
    /// Wrap a canonical buffer. `decrypted` says whether the crypto buffer
    /// holds plaintext.
    pub fn from_internal(data: [u8; AMIIBO_SIZE], decrypted: bool) -> Self {
        Self { data, decrypted }
    }

    /// Wrap a raw dump without decrypting it.
    pub fn from_encrypted_dump(raw: &[u8]) -> Result<Self> {
        Ok(Self::from_internal(ntag::tag_to_internal(raw)?, false))
    }

    /// Wrap the output of [`crate::codec::unpack`], regardless of its
    /// integrity check.
    pub fn from_unpacked(unpacked: Unpacked) -> Self {
        Self::from_internal(unpacked.data, true)
    }

    /// Whether the crypto buffer holds plaintext.
    pub fn is_decrypted(&self) -> bool {
        self.decrypted
    }

    /// The canonical buffer.
    pub fn data(&self) -> &[u8; AMIIBO_SIZE] {
        &self.data
    }

    /// The canonical buffer, writable. Nothing is re-signed until packing.
    pub fn data_mut(&mut self) -> &mut [u8; AMIIBO_SIZE] {
        &mut self.data
    }

    /// Unwrap the canonical buffer.
    pub fn into_inner(self) -> [u8; AMIIBO_SIZE] {
        self.data
    }

    windows! {
        /// Lock bytes and capability container; byte 0 is BCC1.
        lock_bytes_cc, lock_bytes_cc_mut, LOCK_BYTES_CC;
        /// HMAC over canonical 0x029-0x208.
        data_signature, data_signature_mut, DATA_SIGNATURE;
        /// Byte 0x028 and the write counter.
        crypto_init_sequence, crypto_init_sequence_mut, CRYPTO_INIT_SEQUENCE;
        /// Settings and app data; ciphertext unless decrypted.
        crypto_buffer, crypto_buffer_mut, CRYPTO_BUFFER;
        /// Game-owned payload. Only meaningful if [`Self::has_app_data`].
        app_data_buffer, app_data_buffer_mut, APP_DATA;
        /// HMAC over canonical 0x1D4-0x208.
        tag_signature, tag_signature_mut, TAG_SIGNATURE;
        /// UID0-2, BCC0, UID3-6.
        ntag_serial, ntag_serial_mut, NTAG_SERIAL;
        /// Statue ID and the rest of the unencrypted identity block.
        plaintext_data, plaintext_data_mut, PLAINTEXT_DATA;
        /// NXP originality signature; all `0xFF` for 540-byte dumps.
        ntag_ecdsa_signature, ntag_ecdsa_signature_mut, NTAG_ECDSA_SIGNATURE;
    }

    /// Settings view over the crypto buffer.
    pub fn settings(&self) -> Settings<&[u8]> {
        Settings::wrap(self.crypto_buffer())
    }

    /// Writable settings view.
    pub fn settings_mut(&mut self) -> Settings<&mut [u8]> {
        Settings::wrap(self.crypto_buffer_mut())
    }

    /// The figure this tag identifies as.
    pub fn amiibo(&self) -> Amiibo {
        Amiibo::from_statue_id(bytesa(&self.data, STATUE_ID))
    }

    /// Overwrite the statue ID.
    pub fn set_amiibo(&mut self, amiibo: Amiibo) {
        self.data[STATUE_ID..STATUE_ID + 8].copy_from_slice(&amiibo.statue_id());
    }

    /// Number of times the tag has been written.
    pub fn write_counter(&self) -> u16 {
        be_u16(&self.data, WRITE_COUNTER)
    }

    pub fn set_write_counter(&mut self, v: u16) {
        set_be_u16(&mut self.data, WRITE_COUNTER, v);
    }

    /// The 7-byte UID (the serial without BCC0).
    pub fn uid(&self) -> [u8; 7] {
        let s = self.ntag_serial();
        [s[0], s[1], s[2], s[4], s[5], s[6], s[7]]
    }

    /// Write a UID together with freshly computed BCC0 and BCC1.
    pub fn set_uid(&mut self, uid: [u8; 7]) {
        let (bcc0, bcc1) = uid_checksums(&uid);
        self.ntag_serial_mut().copy_from_slice(&[
            uid[0], uid[1], uid[2], bcc0, uid[3], uid[4], uid[5], uid[6],
        ]);
        self.data[LOCK_BYTES_CC.start] = bcc1;
    }

    /// Whether the stored BCC bytes match the UID and the UID is a valid
    /// NXP UID.
    pub fn is_uid_valid(&self) -> bool {
        let uid = self.uid();
        let (bcc0, bcc1) = uid_checksums(&uid);
        self.ntag_serial()[3] == bcc0
            && self.data[LOCK_BYTES_CC.start] == bcc1
            && uid[0] == NXP_MANUFACTURER_CODE
            && uid[4] != CASCADE_TAG
    }

    /// Replace the UID with a random valid one.
    pub fn randomize_uid(&mut self) {
        self.randomize_uid_with(&mut rand::rng());
    }

    /// Replace the UID with a valid one drawn from `rng`.
    pub fn randomize_uid_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut uid: [u8; 7] = rng.random();
        uid[0] = NXP_MANUFACTURER_CODE;
        if uid[4] == CASCADE_TAG {
            uid[4] += 1;
        }
        self.set_uid(uid);
        debug!(uid = %hex::encode_upper(uid), "randomized UID");
    }

    /// Whether the stored originality signature is NXP's signature over
    /// the UID. Dumps without a signature always fail.
    #[cfg(feature = "originality")]
    pub fn is_ntag_signature_valid(&self) -> bool {
        crate::crypto::ecdsa::verify_ntag_signature(&self.uid(), self.ntag_ecdsa_signature())
    }

    /// Whether a game has initialized the app data. Always `false` while
    /// encrypted.
    pub fn has_app_data(&self) -> bool {
        self.decrypted && self.settings().status().contains(Status::APP_DATA_INITIALIZED)
    }

    /// Whether the owner has registered the amiibo. Always `false` while
    /// encrypted.
    pub fn has_user_data(&self) -> bool {
        self.decrypted && self.settings().status().contains(Status::USER_DATA_INITIALIZED)
    }

    /// Hand the app data over to `game`.
    ///
    /// Records the game's first initialization title and AppID, marks app
    /// data as initialized, stamps today's date, bumps both write counters
    /// and lets the game write its initial payload.
    ///
    /// The game fills a copy of the payload. On any error the tag is left
    /// exactly as it was.
    pub fn initialize_app_data(&mut self, game: &dyn Game) -> Result<()> {
        if !self.decrypted {
            return Err(Error::NotDecrypted);
        }
        let title = *game
            .initialization_title_ids()
            .first()
            .ok_or(Error::Game("game has no initialization title ID"))?;
        let today = pack_date(Utc::now().date_naive())?;

        let mut payload = [0u8; APP_DATA_SIZE];
        payload.copy_from_slice(self.app_data_buffer());
        game.initialize_app_data(&mut payload)?;

        let mut settings = self.settings_mut();
        let mut app = settings.app_data_mut();
        app.set_initialization_title_id(title);
        app.set_app_id(game.app_id());
        app.payload_mut().copy_from_slice(&payload);
        let status = settings.status() | Status::APP_DATA_INITIALIZED;
        settings.set_status(status);
        settings.set_last_modified_date_value(today);
        settings.set_write_counter(settings.write_counter().wrapping_add(1));
        self.set_write_counter(self.write_counter().wrapping_add(1));

        debug!(game = game.name(), app_id = game.app_id(), %title, "initialized app data");
        Ok(())
    }
}

impl std::fmt::Debug for AmiiboTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmiiboTag")
            .field("amiibo", &self.amiibo().to_string())
            .field("uid", &hex::encode_upper(self.uid()))
            .field("decrypted", &self.decrypted)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::tag::title::TitleId;

    struct Fill;

    impl Game for Fill {
        fn name(&self) -> &'static str {
            "Fill"
        }
        fn app_id(&self) -> u32 {
            0x1234_5678
        }
        fn initialization_title_ids(&self) -> &'static [TitleId] {
            &[TitleId(0x0004_0000_0012_3400), TitleId(0x0004_0000_0012_3500)]
        }
        fn initialize_app_data(&self, app_data: &mut [u8]) -> Result<()> {
            assert_eq!(app_data.len(), APP_DATA_SIZE);
            app_data.fill(0x5A);
            Ok(())
        }
    }

    struct Failing;

    impl Game for Failing {
        fn name(&self) -> &'static str {
            "Failing"
        }
        fn app_id(&self) -> u32 {
            0xDEAD_BEEF
        }
        fn initialization_title_ids(&self) -> &'static [TitleId] {
            &[TitleId(0x0004_0000_DEAD_BE00)]
        }
        fn initialize_app_data(&self, app_data: &mut [u8]) -> Result<()> {
            app_data[0] = 0x99;
            Err(Error::Game("payload rejected"))
        }
    }

    struct NoTitles;

    impl Game for NoTitles {
        fn name(&self) -> &'static str {
            "NoTitles"
        }
        fn app_id(&self) -> u32 {
            1
        }
        fn initialization_title_ids(&self) -> &'static [TitleId] {
            &[]
        }
        fn initialize_app_data(&self, _: &mut [u8]) -> Result<()> {
            Ok(())
        }
    }

    fn blank(decrypted: bool) -> AmiiboTag {
        AmiiboTag::from_internal([0u8; AMIIBO_SIZE], decrypted)
    }

    #[test]
    fn checksum_formula() {
        let uid = [0x04, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66];
        assert_eq!(uid_checksums(&uid), (0x88 ^ 0x04 ^ 0x11 ^ 0x22, 0x33 ^ 0x44 ^ 0x55 ^ 0x66));

        let mut tag = blank(false);
        tag.set_uid(uid);
        assert_eq!(tag.ntag_serial(), &[0x04, 0x11, 0x22, 0xBF, 0x33, 0x44, 0x55, 0x66]);
        assert_eq!(tag.lock_bytes_cc()[0], 0x44);
        assert_eq!(tag.uid(), uid);
        assert!(tag.is_uid_valid());
    }

    #[test]
    fn uid_validity_rules() {
        let mut tag = blank(false);
        tag.set_uid([0x05, 1, 2, 3, 4, 5, 6]);
        assert!(!tag.is_uid_valid());
        tag.set_uid([0x04, 1, 2, 3, 0x88, 5, 6]);
        assert!(!tag.is_uid_valid());
        tag.set_uid([0x04, 1, 2, 3, 4, 5, 6]);
        tag.lock_bytes_cc_mut()[0] ^= 1;
        assert!(!tag.is_uid_valid());
    }

    #[test]
    fn randomized_uid_is_always_valid() {
        for seed in 0..256 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut tag = blank(false);
            tag.randomize_uid_with(&mut rng);
            assert!(tag.is_uid_valid(), "seed {seed}");
            assert_eq!(tag.uid()[0], 0x04);
            assert_ne!(tag.uid()[4], 0x88);
        }
    }

    #[test]
    fn identity_and_counter() {
        let mut tag = blank(false);
        let amiibo: Amiibo = "0101030001AB0302".parse().unwrap();
        tag.set_amiibo(amiibo);
        assert_eq!(tag.amiibo(), amiibo);
        assert_eq!(&tag.plaintext_data()[..8], &amiibo.statue_id());

        tag.set_write_counter(0x0203);
        assert_eq!(&tag.data()[0x029..0x02B], &[0x02, 0x03]);
        assert_eq!(tag.crypto_init_sequence()[1], 0x02);
    }

    #[test]
    fn app_data_window_sits_inside_the_crypto_buffer() {
        let mut tag = blank(true);
        tag.app_data_buffer_mut()[0] = 0x77;
        assert_eq!(tag.data()[0x0DC], 0x77);
        assert_eq!(tag.settings().app_data().payload()[0], 0x77);
        assert_eq!(tag.app_data_buffer().len(), 0xD8);
    }

    #[test]
    fn initialize_app_data_updates_everything() {
        let mut tag = blank(true);
        tag.data_mut()[CRYPTO_OFFSET] = 0x1F;
        tag.settings_mut().set_write_counter(7);
        tag.set_write_counter(41);

        tag.initialize_app_data(&Fill).unwrap();

        let settings = tag.settings();
        assert_eq!(settings.app_data().app_id(), 0x1234_5678);
        assert_eq!(settings.app_data().initialization_title_id(), TitleId(0x0004_0000_0012_3400));
        assert!(settings.status().contains(Status::APP_DATA_INITIALIZED));
        // user-data bit and low nibble preserved
        assert_eq!(tag.data()[CRYPTO_OFFSET], 0x3F);
        assert_eq!(settings.last_modified_date(), Some(Utc::now().date_naive()));
        assert_eq!(settings.write_counter(), 8);
        assert_eq!(tag.write_counter(), 42);
        assert!(tag.app_data_buffer().iter().all(|&b| b == 0x5A));
        assert!(tag.has_app_data());
        assert!(tag.has_user_data());
    }

    #[test]
    fn initialize_app_data_needs_plaintext_and_a_title() {
        let mut tag = blank(false);
        assert!(matches!(tag.initialize_app_data(&Fill), Err(Error::NotDecrypted)));
        assert!(!tag.has_app_data());

        let mut tag = blank(true);
        assert!(matches!(tag.initialize_app_data(&NoTitles), Err(Error::Game(_))));
        assert_eq!(tag.write_counter(), 0);
    }

    #[test]
    fn failed_initialization_leaves_the_tag_untouched() {
        let mut tag = blank(true);
        tag.data_mut()[CRYPTO_OFFSET] = 0x10;
        tag.app_data_buffer_mut().fill(0x33);
        tag.set_write_counter(5);
        let before = tag.clone();

        assert!(matches!(tag.initialize_app_data(&Failing), Err(Error::Game(_))));
        assert_eq!(tag, before);
        assert!(!tag.has_app_data());
        assert_eq!(tag.settings().app_data().app_id(), 0);
        assert_eq!(tag.settings().write_counter(), 0);
    }

    #[test]
    fn initialization_sees_the_previous_payload() {
        struct Increment;

        impl Game for Increment {
            fn name(&self) -> &'static str {
                "Increment"
            }
            fn app_id(&self) -> u32 {
                2
            }
            fn initialization_title_ids(&self) -> &'static [TitleId] {
                &[TitleId(0x0004_0000_0000_0200)]
            }
            fn initialize_app_data(&self, app_data: &mut [u8]) -> Result<()> {
                app_data[0] += 1;
                Ok(())
            }
        }

        let mut tag = blank(true);
        tag.app_data_buffer_mut()[0] = 41;
        tag.initialize_app_data(&Increment).unwrap();
        assert_eq!(tag.app_data_buffer()[0], 42);
    }
}
