//! Zero-copy parsing of IEEE 802.15.4 MAC frames.
//!
//! The [`Frame`] reader validates a raw MAC frame (without FCS) once, when it
//! is created, and records where every field lives in the buffer:
//! - [`frame_control`]: the decoded [`FrameControlRepr`].
//! - [`sequence_number`]: the sequence number if not suppressed.
//! - [`layout`]: the [`HeaderLayout`] with the offsets of the PAN IDs and
//!   addresses.
//! - [`security`]: the [`SecurityParams`] of the auxiliary security header.
//! - [`header_information_elements`] and [`payload_information_elements`]:
//!   the Information Elements that were found while walking the frame.
//! - [`payload`]: the MAC payload, excluding the MIC.
//!
//! Nothing is copied: every accessor borrows from the buffer the frame was
//! created from. Every multi-byte access is bounds checked while parsing, so
//! the accessors themselves never read past the end of the buffer.
//!
//! ## Reading a frame
//! ```
//! # use wpan_frame::{Frame, FrameType, Address};
//! let frame: [u8; 19] = [
//!     0x41, 0xd8, 0x01, 0xcd, 0xab, 0xff, 0xff, 0xc7, 0xd9, 0xb5, 0x14, 0x00, 0x4b, 0x12,
//!     0x00, 0x2b, 0x00, 0x00, 0x00,
//! ];
//! let frame = Frame::new(&frame[..]).unwrap();
//!
//! assert_eq!(frame.frame_control().frame_type, FrameType::Data);
//! assert_eq!(frame.dst_pan_id(), Some(0xabcd));
//! assert_eq!(frame.dst_address(), Address::BROADCAST);
//! assert_eq!(frame.payload(), &[0x2b, 0x00, 0x00, 0x00]);
//! ```
//!
//! ## Secured frames
//!
//! For a frame with the security enabled bit set, the auxiliary security
//! header is decoded into [`SecurityParams`]. The MIC is located at the tail
//! of the frame and its length only depends on the [`SecurityLevel`].
//! [`Frame::new`] assumes the payload is still in plaintext (a frame that is
//! about to be secured), while [`Frame::new_received`] treats the payload of
//! an encrypting security level as opaque.
//!
//! ## Information Elements
//!
//! Header IEs are walked until a [`HeaderTermination1`] (payload IEs follow)
//! or a [`HeaderTermination2`] (the payload follows). Payload IEs are walked
//! until a [`PayloadTermination`] IE or the end of the payload. The length of
//! every element is checked against the remaining buffer before it is
//! accepted.
//!
//! [`frame_control`]: Frame::frame_control
//! [`sequence_number`]: Frame::sequence_number
//! [`layout`]: Frame::layout
//! [`security`]: Frame::security
//! [`header_information_elements`]: Frame::header_information_elements
//! [`payload_information_elements`]: Frame::payload_information_elements
//! [`payload`]: Frame::payload
//! [`HeaderTermination1`]: HeaderElementId::HeaderTermination1
//! [`HeaderTermination2`]: HeaderElementId::HeaderTermination2
//! [`PayloadTermination`]: PayloadGroupId::PayloadTermination
#![no_std]
#![deny(missing_docs)]
#![deny(unsafe_code)]

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

#[cfg(test)]
mod tests;

mod frame;
pub use frame::*;

mod fcs;
pub use fcs::FrameWithFcs;

mod frame_control;
pub use frame_control::*;

mod addressing;
pub use addressing::*;

mod security;
pub use security::*;

mod ie;
pub use ie::*;

/// A malformed IEEE 802.15.4 frame: the buffer is truncated, a length field
/// is inconsistent with the buffer, or a field holds a reserved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Error;

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "malformed frame")
    }
}

/// A type alias for `Result<T, frame::Error>`.
pub type Result<T> = core::result::Result<T, Error>;
