//! Auxiliary Security Header readers.

use core::ops::Range;

use crate::{Error, FrameVersion, Result};

/// Security level of a secured frame.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum SecurityLevel {
    /// No security.
    None = 0,
    /// Authentication with a 32-bit MIC.
    Mic32 = 1,
    /// Authentication with a 64-bit MIC.
    Mic64 = 2,
    /// Authentication with a 128-bit MIC.
    Mic128 = 3,
    /// Encryption without authentication. Reserved since 2015.
    Enc = 4,
    /// Encryption and authentication with a 32-bit MIC.
    EncMic32 = 5,
    /// Encryption and authentication with a 64-bit MIC.
    EncMic64 = 6,
    /// Encryption and authentication with a 128-bit MIC.
    EncMic128 = 7,
}

impl SecurityLevel {
    /// Decode the 3-bit security level field. Bits above the field are
    /// ignored.
    pub fn from_bits(value: u8) -> Self {
        match value & 0b111 {
            0 => Self::None,
            1 => Self::Mic32,
            2 => Self::Mic64,
            3 => Self::Mic128,
            4 => Self::Enc,
            5 => Self::EncMic32,
            6 => Self::EncMic64,
            _ => Self::EncMic128,
        }
    }

    /// Return the MIC length in octets.
    pub fn mic_len(&self) -> usize {
        match self {
            Self::None | Self::Enc => 0,
            Self::Mic32 | Self::EncMic32 => 4,
            Self::Mic64 | Self::EncMic64 => 8,
            Self::Mic128 | Self::EncMic128 => 16,
        }
    }

    /// Returns `true` when the payload is encrypted.
    pub fn encrypts(&self) -> bool {
        (*self as u8) & 0b100 != 0
    }

    /// Returns `true` when the frame carries a MIC.
    pub fn authenticates(&self) -> bool {
        self.mic_len() != 0
    }
}

/// Key Identifier Mode of the Security Control field.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum KeyIdMode {
    /// The key is determined implicitly from the originator and recipient.
    Implicit = 0,
    /// The key is determined from a 1-octet key index.
    Index = 1,
    /// The key is determined from a 4-octet key source and a key index.
    Source4Index = 2,
    /// The key is determined from an 8-octet key source and a key index.
    Source8Index = 3,
}

impl KeyIdMode {
    /// Decode the 2-bit key identifier mode field.
    pub fn from_bits(value: u8) -> Self {
        match value & 0b11 {
            0 => Self::Implicit,
            1 => Self::Index,
            2 => Self::Source4Index,
            _ => Self::Source8Index,
        }
    }

    /// Return the length of the Key Identifier field in octets.
    pub fn key_id_len(&self) -> usize {
        match self {
            Self::Implicit => 0,
            Self::Index => 1,
            Self::Source4Index => 5,
            Self::Source8Index => 9,
        }
    }
}

/// A reader for the IEEE 802.15.4 Security Control field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SecurityControl(u8);

impl SecurityControl {
    /// Create a reader from the raw field value.
    pub fn from_bits(value: u8) -> Self {
        Self(value)
    }

    /// Build a Security Control field.
    pub fn new(level: SecurityLevel, key_id_mode: KeyIdMode, frame_counter_suppression: bool) -> Self {
        Self(level as u8 | (key_id_mode as u8) << 3 | (frame_counter_suppression as u8) << 5)
    }

    /// Return the raw field value.
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Return the security level field.
    pub fn security_level(&self) -> SecurityLevel {
        SecurityLevel::from_bits(self.0)
    }

    /// Return the key identifier mode field.
    pub fn key_id_mode(&self) -> KeyIdMode {
        KeyIdMode::from_bits(self.0 >> 3)
    }

    /// Returns `true` when the frame counter is suppressed.
    pub fn frame_counter_suppression(&self) -> bool {
        (self.0 >> 5) & 0b1 == 1
    }

    /// Returns `true` when the ASN is used in the nonce instead of the frame
    /// counter.
    pub fn asn_in_nonce(&self) -> bool {
        (self.0 >> 6) & 0b1 == 1
    }
}

/// Location and meaning of the security related fields of a frame.
///
/// All offsets are relative to the start of the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityParams {
    /// The security level.
    pub level: SecurityLevel,
    /// The key identifier mode.
    pub key_id_mode: KeyIdMode,
    /// Offset of the Security Control field.
    pub control: usize,
    /// Offset of the 4-octet frame counter, absent if suppressed.
    pub frame_counter: Option<usize>,
    /// The Key Identifier field (key source followed by key index).
    pub key_id: Range<usize>,
    /// The MIC at the tail of the frame.
    pub mic: Range<usize>,
    /// The ASN in nonce field.
    pub asn_in_nonce: bool,
}

impl SecurityParams {
    /// Parse the auxiliary security header starting at `offset` in a frame of
    /// the given version.
    ///
    /// Returns the parameters and the offset of the first octet after the
    /// header. The MIC is located at the tail of `buffer`.
    pub fn parse(buffer: &[u8], offset: usize, version: FrameVersion) -> Result<(Self, usize)> {
        let control = SecurityControl::from_bits(*buffer.get(offset).ok_or(Error)?);
        let level = control.security_level();

        if level == SecurityLevel::Enc && version.is_2015() {
            return Err(Error);
        }

        let mut end = offset + 1;

        let frame_counter = if control.frame_counter_suppression() && version.is_2015() {
            None
        } else {
            let at = end;
            end += 4;
            Some(at)
        };

        let key_id_mode = control.key_id_mode();
        let key_id = end..end + key_id_mode.key_id_len();
        end = key_id.end;

        if end > buffer.len() {
            return Err(Error);
        }

        let mic_start = buffer
            .len()
            .checked_sub(level.mic_len())
            .filter(|start| *start >= end)
            .ok_or(Error)?;

        Ok((
            Self {
                level,
                key_id_mode,
                control: offset,
                frame_counter,
                key_id,
                mic: mic_start..buffer.len(),
                asn_in_nonce: control.asn_in_nonce(),
            },
            end,
        ))
    }

    /// Return the length of the auxiliary security header in octets.
    #[allow(clippy::len_without_is_empty)]
    pub fn header_len(&self) -> usize {
        self.key_id.end - self.control
    }

    /// Return the MIC length in octets.
    pub fn mic_len(&self) -> usize {
        self.level.mic_len()
    }
}
