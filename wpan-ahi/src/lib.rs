//! IEEE 802.15.4 frame security and the AHI link to a companion radio core.
//!
//! - [`security`]: the [`KeyStore`](security::KeyStore) and the CCM* encoder
//!   securing frames in place before they are handed to the radio.
//! - [`ahi`]: the byte messages exchanged with the companion core, and the
//!   streaming assembler recovering them from a byte stream.
//! - [`transport`]: the [`Correlator`](transport::Correlator) sending one
//!   request at a time and waiting for its response, and the
//!   [`Link`](transport::Link) fed byte by byte from the receive interrupt.
#![no_std]

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

#[macro_use]
pub(crate) mod utils;

pub use wpan_frame as frame;

pub mod ahi;
pub mod config;
pub mod security;
pub mod sync;
pub mod time;
pub mod transport;

mod error;
pub use error::{Error, Result};
