use std::env;
use std::fs;

use amiikit::Result;
use amiikit::manager::{AmiiboManager, Config};

fn main() -> Result<()> {
    let dump_path = env::args().nth(1).unwrap_or_else(|| "amiibo.bin".into());
    let manager = AmiiboManager::from_config(&Config {
        key_file: Some("key_retail.bin".into()),
    })?;

    let raw = fs::read(dump_path)?;
    let tag = manager.decrypt_tag(&raw)?;

    println!("amiibo id: {}", tag.amiibo());
    println!("uid: {} (valid: {})", hex::encode_upper(tag.uid()), tag.is_uid_valid());
    println!("genuine: {}", tag.is_ntag_signature_valid());
    println!("write counter: {}", tag.write_counter());
    if tag.has_user_data() {
        println!("nickname: {}", tag.settings().user_data().nickname());
    }
    if tag.has_app_data() {
        println!("app id: {:08X}", tag.settings().app_data().app_id());
    }

    Ok(())
}
