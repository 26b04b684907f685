//! Addressing fields: addresses, addressing modes and the PAN ID presence
//! rules.

use crate::{Error, FrameControlRepr, FrameVersion, Result};

/// An IEEE 802.15.4 address.
///
/// The octets are stored most significant octet first, which is the reverse
/// of the order in which they are transmitted.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum Address {
    /// No address.
    Absent,
    /// A 16-bit short address.
    Short([u8; 2]),
    /// A 64-bit extended address.
    Extended([u8; 8]),
}

impl Address {
    /// The broadcast address.
    pub const BROADCAST: Address = Address::Short([0xff; 2]);

    /// Query whether the address is an unicast address.
    pub fn is_unicast(&self) -> bool {
        !self.is_broadcast()
    }

    /// Query whether this address is the broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Read an address of the given mode from its over-the-air
    /// (little-endian) representation.
    pub fn from_le_bytes(mode: AddressingMode, bytes: &[u8]) -> Result<Self> {
        let raw = bytes.get(..mode.size()).ok_or(Error)?;
        Ok(match mode {
            AddressingMode::Absent => Address::Absent,
            AddressingMode::Short => Address::Short([raw[1], raw[0]]),
            AddressingMode::Extended => {
                let mut b = [0u8; 8];
                b.copy_from_slice(raw);
                b.reverse();
                Address::Extended(b)
            }
        })
    }

    /// Write the over-the-air (little-endian) representation of the address
    /// into `buffer`, returning the number of octets written.
    pub fn write_le_bytes(&self, buffer: &mut [u8]) -> Result<usize> {
        let b = buffer.get_mut(..self.len()).ok_or(Error)?;
        b.copy_from_slice(self.as_bytes());
        b.reverse();
        Ok(self.len())
    }

    /// Return the octets of the address, most significant first.
    pub const fn as_bytes(&self) -> &[u8] {
        match self {
            Address::Absent => &[],
            Address::Short(value) => value,
            Address::Extended(value) => value,
        }
    }

    /// Return the length of the address in octets.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.mode().size()
    }

    /// Returns `true` for [`Address::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Address::Absent)
    }

    /// Return the [`AddressingMode`] matching this address.
    pub fn mode(&self) -> AddressingMode {
        match self {
            Address::Absent => AddressingMode::Absent,
            Address::Short(_) => AddressingMode::Short,
            Address::Extended(_) => AddressingMode::Extended,
        }
    }
}

impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Address::Absent => write!(f, "absent"),
            Address::Short(value) => write!(f, "{:02x}:{:02x}", value[0], value[1]),
            Address::Extended(value) => write!(
                f,
                "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
                value[0], value[1], value[2], value[3], value[4], value[5], value[6], value[7]
            ),
        }
    }
}

/// IEEE 802.15.4 addressing mode.
///
/// The value `0b01` is reserved and can not be represented.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum AddressingMode {
    /// Address not present.
    Absent = 0b00,
    /// 16-bit short address.
    Short = 0b10,
    /// 64-bit extended address.
    Extended = 0b11,
}

impl AddressingMode {
    /// Return the size of the address in octets.
    pub fn size(&self) -> usize {
        match self {
            Self::Absent => 0,
            Self::Short => 2,
            Self::Extended => 8,
        }
    }

    /// Returns `true` unless the mode is [`AddressingMode::Absent`].
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

impl TryFrom<u8> for AddressingMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0b00 => Ok(Self::Absent),
            0b10 => Ok(Self::Short),
            0b11 => Ok(Self::Extended),
            _ => Err(Error),
        }
    }
}

/// Which PAN identifiers are carried in the addressing fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanIdPresence {
    /// The destination PAN ID is present.
    pub dst: bool,
    /// The source PAN ID is present.
    pub src: bool,
}

impl PanIdPresence {
    const fn new(dst: bool, src: bool) -> Self {
        Self { dst, src }
    }
}

/// Decide which PAN IDs are present in a frame.
///
/// Before 2015 the destination PAN ID follows the destination address, and
/// the source PAN ID is carried with a source address unless PAN ID
/// compression is set. From 2015 on, presence follows the combination table
/// of IEEE 802.15.4-2015, section 7.2.2.6.
pub fn pan_id_presence(
    version: FrameVersion,
    dst: AddressingMode,
    src: AddressingMode,
    pan_id_compression: bool,
) -> PanIdPresence {
    use AddressingMode::*;

    if !version.is_2015() {
        return PanIdPresence::new(
            dst.is_present(),
            src.is_present() && !pan_id_compression,
        );
    }

    match (dst, src, pan_id_compression) {
        (Absent, Absent, false) => PanIdPresence::new(false, false),
        (Absent, Absent, true) => PanIdPresence::new(true, false),
        (Short | Extended, Absent, false) => PanIdPresence::new(true, false),
        (Short | Extended, Absent, true) => PanIdPresence::new(false, false),
        (Absent, Short | Extended, false) => PanIdPresence::new(false, true),
        (Absent, Short | Extended, true) => PanIdPresence::new(false, false),
        (Extended, Extended, false) => PanIdPresence::new(true, false),
        (Extended, Extended, true) => PanIdPresence::new(false, false),
        (Short, Short, false) => PanIdPresence::new(true, true),
        (Short, Extended, false) => PanIdPresence::new(true, true),
        (Extended, Short, false) => PanIdPresence::new(true, true),
        (Short, Extended, true) => PanIdPresence::new(true, false),
        (Extended, Short, true) => PanIdPresence::new(true, false),
        (Short, Short, true) => PanIdPresence::new(true, false),
    }
}

/// Offsets (relative to the start of the frame) of the addressing fields.
///
/// The layout is a pure function of the Frame Control field: it is computed
/// without looking at the rest of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeaderLayout {
    /// Offset of the destination PAN ID.
    pub dst_pan_id: Option<usize>,
    /// Offset of the destination address.
    pub dst_address: Option<usize>,
    /// Offset of the source PAN ID.
    pub src_pan_id: Option<usize>,
    /// Offset of the source address.
    pub src_address: Option<usize>,
    /// Offset of the first octet after the addressing fields.
    pub end: usize,
}

impl HeaderLayout {
    /// Lay out the addressing fields of a frame, starting at `start`.
    pub fn new(fc: &FrameControlRepr, start: usize) -> Self {
        let presence = pan_id_presence(
            fc.frame_version,
            fc.dst_addressing_mode,
            fc.src_addressing_mode,
            fc.pan_id_compression,
        );

        fn place(offset: &mut usize, present: bool, size: usize) -> Option<usize> {
            if !present {
                return None;
            }
            let at = *offset;
            *offset += size;
            Some(at)
        }

        let mut offset = start;
        let dst_pan_id = place(&mut offset, presence.dst, 2);
        let dst_address = place(
            &mut offset,
            fc.dst_addressing_mode.is_present(),
            fc.dst_addressing_mode.size(),
        );
        let src_pan_id = place(&mut offset, presence.src, 2);
        let src_address = place(
            &mut offset,
            fc.src_addressing_mode.is_present(),
            fc.src_addressing_mode.size(),
        );

        Self {
            dst_pan_id,
            dst_address,
            src_pan_id,
            src_address,
            end: offset,
        }
    }

    /// Return the length of the addressing fields in octets.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self, start: usize) -> usize {
        self.end - start
    }
}
