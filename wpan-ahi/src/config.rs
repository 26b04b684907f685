//! Compile-time and run-time configuration.
//!
//! The constants below are generated by the build script. Each one can be
//! overridden at build time through a `WPAN_AHI_<NAME>` environment variable,
//! e.g. `WPAN_AHI_RESPONSE_TIMEOUT_US=100_000`.

use crate::time::Duration;

include!(concat!(env!("OUT_DIR"), "/config.rs"));

/// Run-time configuration of a [`Correlator`](crate::transport::Correlator).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// How long a request waits for its response.
    pub response_timeout: Duration,
    /// Extended address of this device, in over-the-air (little-endian)
    /// order. Used as the source address of the CCM* nonce.
    pub ext_address: [u8; 8],
    /// First firmware version reporting the security of the ACK sent in
    /// reply to a received frame.
    pub ack_security_min_version: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_us(RESPONSE_TIMEOUT_US as u64),
            ext_address: [0; 8],
            ack_security_min_version: 0x0002_0000,
        }
    }
}
