//! Frame security: the [`KeyStore`] and the CCM* encoder.
//!
//! A frame is secured in place in a [`TxFrame`] by [`encode`]: the frame
//! counter is allocated from the key store, written into the auxiliary
//! security header, and the payload is encrypted and authenticated with the
//! key matching the key identifier of the frame. [`decrypt`] reverses the
//! operation on a received frame.

mod ccm;
pub use self::ccm::{decrypt, encode, nonce, Nonce, NONCE_LEN};

mod key_store;
pub use key_store::{KeyDescriptor, KeyStore, KeyValue, MAX_KEY_ID_LEN};

mod tx_frame;
pub use tx_frame::TxFrame;
