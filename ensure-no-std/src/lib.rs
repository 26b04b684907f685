#![no_std]

use wpan_ahi::ahi::{Assembler, Message};
use wpan_ahi::security::{KeyDescriptor, KeyStore};

pub fn feed(assembler: &mut Assembler, bytes: &[u8]) -> Option<Message> {
    bytes.iter().find_map(|byte| assembler.push(*byte))
}

pub fn key_store() -> KeyStore {
    KeyStore::new()
}

pub fn log_keys(keys: &KeyStore) {
    for key in keys.keys() {
        let key: &KeyDescriptor = key;
        defmt::info!("key {}", key);
    }
}
