use wpan_frame::KeyIdMode;

use crate::config::KEY_STORE_CAPACITY;
use crate::{Error, Result};

/// Maximum length of a key identifier: an 8-octet key source and a key index.
pub const MAX_KEY_ID_LEN: usize = 9;

/// A 128-bit AES key.
pub type KeyValue = [u8; 16];

/// A security key and how frames refer to it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyDescriptor {
    /// The key.
    pub key_value: KeyValue,
    /// How frames identify this key.
    pub key_id_mode: KeyIdMode,
    /// Key source followed by the key index. Only the first
    /// [`KeyIdMode::key_id_len`] octets are significant.
    pub key_id: [u8; MAX_KEY_ID_LEN],
    /// Frame counter of this key, used when `frame_counter_per_key` is set.
    pub frame_counter: u32,
    /// The key carries its own frame counter instead of using the shared one.
    pub frame_counter_per_key: bool,
}

impl KeyDescriptor {
    /// Create a descriptor using the shared frame counter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMessage`] if `key_id` is not as long as the
    /// mode requires.
    pub fn new(key_value: KeyValue, key_id_mode: KeyIdMode, key_id: &[u8]) -> Result<Self> {
        if key_id.len() != key_id_mode.key_id_len() {
            return Err(Error::InvalidMessage);
        }

        let mut id = [0u8; MAX_KEY_ID_LEN];
        id[..key_id.len()].copy_from_slice(key_id);

        Ok(Self {
            key_value,
            key_id_mode,
            key_id: id,
            frame_counter: 0,
            frame_counter_per_key: false,
        })
    }

    /// Make the key use its own frame counter, starting at `frame_counter`.
    pub fn with_frame_counter(mut self, frame_counter: u32) -> Self {
        self.frame_counter = frame_counter;
        self.frame_counter_per_key = true;
        self
    }

    /// Return the significant key identifier octets.
    pub fn key_id(&self) -> &[u8] {
        &self.key_id[..self.key_id_mode.key_id_len()]
    }

    /// Returns `true` when this descriptor is the one a frame with the given
    /// key identifier refers to.
    pub fn matches(&self, key_id_mode: KeyIdMode, key_id: &[u8]) -> bool {
        self.key_id_mode == key_id_mode && self.key_id() == key_id
    }
}

/// Take the next value of a frame counter.
fn next_counter(counter: &mut u32) -> Result<u32> {
    if *counter == u32::MAX {
        return Err(Error::CounterOverflow);
    }
    let value = *counter;
    *counter += 1;
    Ok(value)
}

/// The security keys of the device and the shared frame counter.
#[derive(Debug, Default)]
pub struct KeyStore {
    keys: heapless::Vec<KeyDescriptor, KEY_STORE_CAPACITY>,
    frame_counter: u32,
}

impl KeyStore {
    /// Create an empty key store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyStoreFull`], leaving the table untouched, if there
    /// are more descriptors than the store can hold.
    pub fn set(&mut self, descriptors: &[KeyDescriptor]) -> Result<()> {
        let keys = heapless::Vec::from_slice(descriptors).map_err(|_| Error::KeyStoreFull)?;
        self.keys = keys;
        info!("key store: {} key(s) configured", self.keys.len());
        Ok(())
    }

    /// Remove every key.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Return the configured keys.
    pub fn keys(&self) -> &[KeyDescriptor] {
        &self.keys
    }

    /// Return the first descriptor matching the key identifier.
    ///
    /// With [`KeyIdMode::Implicit`], `key_id` is empty and the first implicit
    /// key matches.
    pub fn get(&self, key_id_mode: KeyIdMode, key_id: &[u8]) -> Result<&KeyDescriptor> {
        self.keys
            .iter()
            .find(|key| key.matches(key_id_mode, key_id))
            .ok_or(Error::KeyNotFound)
    }

    /// Allocate a frame counter value for a frame secured with the matching
    /// key, and return it together with the key.
    ///
    /// The counter comes from the key itself when it carries its own, from the
    /// shared counter otherwise.
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] if no key matches, [`Error::CounterOverflow`] if
    /// the counter is exhausted. Nothing is modified on error.
    pub fn allocate_frame_counter(
        &mut self,
        key_id_mode: KeyIdMode,
        key_id: &[u8],
    ) -> Result<(u32, KeyValue)> {
        let key = self
            .keys
            .iter_mut()
            .find(|key| key.matches(key_id_mode, key_id))
            .ok_or(Error::KeyNotFound)?;

        let counter = if key.frame_counter_per_key {
            next_counter(&mut key.frame_counter)?
        } else {
            next_counter(&mut self.frame_counter)?
        };

        Ok((counter, key.key_value))
    }

    /// Return the next value of the shared frame counter.
    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }

    /// Set the shared frame counter.
    pub fn set_frame_counter(&mut self, frame_counter: u32) {
        self.frame_counter = frame_counter;
    }

    /// Set the shared frame counter, unless that would move it backwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CounterDecrease`] if `frame_counter` is lower than the
    /// current value.
    pub fn set_frame_counter_if_larger(&mut self, frame_counter: u32) -> Result<()> {
        if frame_counter < self.frame_counter {
            return Err(Error::CounterDecrease);
        }
        self.frame_counter = frame_counter;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(index: u8) -> KeyDescriptor {
        KeyDescriptor::new([index; 16], KeyIdMode::Index, &[index]).unwrap()
    }

    #[test]
    fn get_after_set() {
        let mut store = KeyStore::new();
        let source4 = KeyDescriptor::new(
            [0xaa; 16],
            KeyIdMode::Source4Index,
            &[0x01, 0x02, 0x03, 0x04, 0x01],
        )
        .unwrap();
        store.set(&[key(1), key(2), source4.clone()]).unwrap();

        assert_eq!(store.get(KeyIdMode::Index, &[2]), Ok(&key(2)));
        assert_eq!(
            store.get(KeyIdMode::Source4Index, &[0x01, 0x02, 0x03, 0x04, 0x01]),
            Ok(&source4)
        );
        // Same index, other mode.
        assert_eq!(
            store.get(KeyIdMode::Source4Index, &[0x01, 0x02, 0x03, 0x05, 0x01]),
            Err(Error::KeyNotFound)
        );
        assert_eq!(store.get(KeyIdMode::Index, &[3]), Err(Error::KeyNotFound));
        assert_eq!(store.get(KeyIdMode::Implicit, &[]), Err(Error::KeyNotFound));
    }

    #[test]
    fn first_match_wins() {
        let mut store = KeyStore::new();
        let mut other = key(1);
        other.key_value = [0x55; 16];
        store.set(&[key(1), other]).unwrap();
        assert_eq!(store.get(KeyIdMode::Index, &[1]).unwrap().key_value, [1; 16]);
    }

    #[test]
    fn implicit_key() {
        let mut store = KeyStore::new();
        let implicit = KeyDescriptor::new([7; 16], KeyIdMode::Implicit, &[]).unwrap();
        store.set(&[key(1), implicit.clone()]).unwrap();
        assert_eq!(store.get(KeyIdMode::Implicit, &[]), Ok(&implicit));
    }

    #[test]
    fn overfull_set_leaves_table_unchanged() {
        let mut store = KeyStore::new();
        store.set(&[key(1)]).unwrap();

        let too_many = [key(2), key(3), key(4), key(5), key(6), key(7), key(8), key(9)];
        assert!(too_many.len() > KEY_STORE_CAPACITY);
        assert_eq!(store.set(&too_many), Err(Error::KeyStoreFull));
        assert_eq!(store.keys(), &[key(1)]);

        store.set(&too_many[..KEY_STORE_CAPACITY]).unwrap();
        assert_eq!(store.keys().len(), KEY_STORE_CAPACITY);
    }

    #[test]
    fn key_id_length_follows_mode() {
        assert_eq!(
            KeyDescriptor::new([0; 16], KeyIdMode::Index, &[1, 2]),
            Err(Error::InvalidMessage)
        );
        let key = KeyDescriptor::new([0; 16], KeyIdMode::Source8Index, &[9; 9]).unwrap();
        assert_eq!(key.key_id(), &[9; 9]);
    }

    #[test]
    fn shared_counter() {
        let mut store = KeyStore::new();
        store.set(&[key(1), key(2)]).unwrap();

        assert_eq!(store.allocate_frame_counter(KeyIdMode::Index, &[1]), Ok((0, [1; 16])));
        assert_eq!(store.allocate_frame_counter(KeyIdMode::Index, &[2]), Ok((1, [2; 16])));
        assert_eq!(store.frame_counter(), 2);
        assert_eq!(
            store.allocate_frame_counter(KeyIdMode::Index, &[3]),
            Err(Error::KeyNotFound)
        );
        assert_eq!(store.frame_counter(), 2);
    }

    #[test]
    fn per_key_counter() {
        let mut store = KeyStore::new();
        store.set(&[key(1).with_frame_counter(100), key(2)]).unwrap();

        assert_eq!(store.allocate_frame_counter(KeyIdMode::Index, &[1]), Ok((100, [1; 16])));
        assert_eq!(store.allocate_frame_counter(KeyIdMode::Index, &[1]), Ok((101, [1; 16])));
        assert_eq!(store.frame_counter(), 0);
        assert_eq!(store.get(KeyIdMode::Index, &[1]).unwrap().frame_counter, 102);
    }

    #[test]
    fn counter_overflow() {
        let mut store = KeyStore::new();
        store.set(&[key(1), key(2).with_frame_counter(u32::MAX)]).unwrap();

        store.set_frame_counter(u32::MAX - 1);
        assert_eq!(
            store.allocate_frame_counter(KeyIdMode::Index, &[1]),
            Ok((u32::MAX - 1, [1; 16]))
        );
        assert_eq!(
            store.allocate_frame_counter(KeyIdMode::Index, &[1]),
            Err(Error::CounterOverflow)
        );
        assert_eq!(store.frame_counter(), u32::MAX);

        assert_eq!(
            store.allocate_frame_counter(KeyIdMode::Index, &[2]),
            Err(Error::CounterOverflow)
        );
    }

    #[test]
    fn set_if_larger() {
        let mut store = KeyStore::new();
        store.set_frame_counter(10);
        assert_eq!(store.set_frame_counter_if_larger(9), Err(Error::CounterDecrease));
        assert_eq!(store.frame_counter(), 10);
        assert_eq!(store.set_frame_counter_if_larger(10), Ok(()));
        assert_eq!(store.set_frame_counter_if_larger(42), Ok(()));
        assert_eq!(store.frame_counter(), 42);

        store.set_frame_counter(1);
        assert_eq!(store.frame_counter(), 1);
    }
}
