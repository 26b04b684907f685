//! IEEE 802.15.4 Frame Control field readers and writers.

use crate::AddressingMode;
use crate::{Error, Result};

/// IEEE 802.15.4 frame type.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum FrameType {
    /// Beacon frame.
    Beacon = 0b000,
    /// Data frame.
    Data = 0b001,
    /// Acknowledgment frame.
    Ack = 0b010,
    /// MAC command frame.
    MacCommand = 0b011,
    /// Multipurpose frame.
    Multipurpose = 0b101,
    /// Fragment or FRAK frame.
    FragmentOrFrak = 0b110,
    /// Extended frame.
    Extended = 0b111,
}

impl TryFrom<u8> for FrameType {
    type Error = Error;

    /// `0b100` is reserved and rejected.
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0b000 => Ok(Self::Beacon),
            0b001 => Ok(Self::Data),
            0b010 => Ok(Self::Ack),
            0b011 => Ok(Self::MacCommand),
            0b101 => Ok(Self::Multipurpose),
            0b110 => Ok(Self::FragmentOrFrak),
            0b111 => Ok(Self::Extended),
            _ => Err(Error),
        }
    }
}

/// IEEE 802.15.4 frame version.
#[derive(Debug, Eq, PartialEq, Clone, Copy, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum FrameVersion {
    /// IEEE 802.15.4-2003.
    Ieee802154_2003 = 0b00,
    /// IEEE 802.15.4-2006.
    Ieee802154_2006 = 0b01,
    /// IEEE 802.15.4-2015 and later revisions.
    Ieee802154_2015 = 0b10,
}

impl FrameVersion {
    /// Returns `true` for frames following the 2015 (or later) layout rules.
    pub fn is_2015(&self) -> bool {
        *self == Self::Ieee802154_2015
    }
}

impl TryFrom<u8> for FrameVersion {
    type Error = Error;

    /// `0b11` is reserved and rejected.
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0b00 => Ok(Self::Ieee802154_2003),
            0b01 => Ok(Self::Ieee802154_2006),
            0b10 => Ok(Self::Ieee802154_2015),
            _ => Err(Error),
        }
    }
}

/// A reader/writer for the IEEE 802.15.4 Frame Control field.
pub struct FrameControl<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> FrameControl<T> {
    /// Create a new [`FrameControl`] reader/writer from a given buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is shorter than 2 octets.
    pub fn new(buffer: T) -> Result<Self> {
        let fc = Self::new_unchecked(buffer);

        if !fc.check_len() {
            return Err(Error);
        }

        Ok(fc)
    }

    fn check_len(&self) -> bool {
        self.buffer.as_ref().len() >= 2
    }

    /// Create a new [`FrameControl`] reader/writer without length checking.
    pub fn new_unchecked(buffer: T) -> Self {
        Self { buffer }
    }

    fn raw(&self) -> u16 {
        let b = &self.buffer.as_ref()[..2];
        u16::from_le_bytes([b[0], b[1]])
    }

    fn bit(&self, shift: u16) -> bool {
        (self.raw() >> shift) & 0b1 == 1
    }

    /// Return the [`FrameType`] field.
    pub fn frame_type(&self) -> Result<FrameType> {
        FrameType::try_from((self.raw() & 0b111) as u8)
    }

    /// Returns `true` when the security enabled field is set.
    pub fn security_enabled(&self) -> bool {
        self.bit(3)
    }

    /// Returns `true` when the frame pending field is set.
    pub fn frame_pending(&self) -> bool {
        self.bit(4)
    }

    /// Returns `true` when the acknowledgement request field is set.
    pub fn ack_request(&self) -> bool {
        self.bit(5)
    }

    /// Returns `true` when the PAN ID compression field is set.
    pub fn pan_id_compression(&self) -> bool {
        self.bit(6)
    }

    /// Returns `true` when the sequence number suppression field is set.
    pub fn sequence_number_suppression(&self) -> bool {
        self.bit(8)
    }

    /// Returns `true` when the information elements present field is set.
    pub fn information_elements_present(&self) -> bool {
        self.bit(9)
    }

    /// Return the destination [`AddressingMode`].
    pub fn dst_addressing_mode(&self) -> Result<AddressingMode> {
        AddressingMode::try_from(((self.raw() >> 10) & 0b11) as u8)
    }

    /// Return the [`FrameVersion`].
    pub fn frame_version(&self) -> Result<FrameVersion> {
        FrameVersion::try_from(((self.raw() >> 12) & 0b11) as u8)
    }

    /// Return the source [`AddressingMode`].
    pub fn src_addressing_mode(&self) -> Result<AddressingMode> {
        AddressingMode::try_from(((self.raw() >> 14) & 0b11) as u8)
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> FrameControl<T> {
    fn set_bit(&mut self, shift: u16, value: bool) {
        let raw = (self.raw() & !(1 << shift)) | ((value as u16) << shift);
        self.buffer.as_mut()[..2].copy_from_slice(&raw.to_le_bytes());
    }

    /// Set the frame pending field.
    pub fn set_frame_pending(&mut self, frame_pending: bool) {
        self.set_bit(4, frame_pending);
    }

    /// Set the acknowledgement request field.
    pub fn set_ack_request(&mut self, ack_request: bool) {
        self.set_bit(5, ack_request);
    }
}

/// A decoded IEEE 802.15.4 Frame Control field.
///
/// Every field has been validated: reserved frame types, frame versions and
/// addressing modes are rejected when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct FrameControlRepr {
    /// Frame type field.
    pub frame_type: FrameType,
    /// Security enabled field.
    pub security_enabled: bool,
    /// Frame pending field.
    pub frame_pending: bool,
    /// Acknowledgement request field.
    pub ack_request: bool,
    /// PAN ID compression field.
    pub pan_id_compression: bool,
    /// Sequence number suppression field.
    pub sequence_number_suppression: bool,
    /// Information elements present field.
    pub information_elements_present: bool,
    /// Destination addressing mode field.
    pub dst_addressing_mode: AddressingMode,
    /// Source addressing mode field.
    pub src_addressing_mode: AddressingMode,
    /// Frame version field.
    pub frame_version: FrameVersion,
}

impl FrameControlRepr {
    /// Decode a [`FrameControl`] field.
    pub fn parse<T: AsRef<[u8]>>(fc: &FrameControl<T>) -> Result<Self> {
        Ok(Self {
            frame_type: fc.frame_type()?,
            security_enabled: fc.security_enabled(),
            frame_pending: fc.frame_pending(),
            ack_request: fc.ack_request(),
            pan_id_compression: fc.pan_id_compression(),
            sequence_number_suppression: fc.sequence_number_suppression(),
            information_elements_present: fc.information_elements_present(),
            dst_addressing_mode: fc.dst_addressing_mode()?,
            src_addressing_mode: fc.src_addressing_mode()?,
            frame_version: fc.frame_version()?,
        })
    }

    /// Returns `true` when the sequence number is elided from the frame.
    ///
    /// The suppression bit is only honoured for 2015 frames.
    pub fn sequence_number_elided(&self) -> bool {
        self.sequence_number_suppression && self.frame_version.is_2015()
    }

    /// Returns `true` when Information Elements follow the addressing fields.
    ///
    /// The IE present bit is reserved before 2015 and ignored there.
    pub fn information_elements_follow(&self) -> bool {
        self.information_elements_present && self.frame_version.is_2015()
    }

    /// Return the raw 16-bit value of this Frame Control field.
    pub fn to_bits(&self) -> u16 {
        (self.frame_type as u16)
            | (self.security_enabled as u16) << 3
            | (self.frame_pending as u16) << 4
            | (self.ack_request as u16) << 5
            | (self.pan_id_compression as u16) << 6
            | (self.sequence_number_suppression as u16) << 8
            | (self.information_elements_present as u16) << 9
            | (self.dst_addressing_mode as u16) << 10
            | (self.frame_version as u16) << 12
            | (self.src_addressing_mode as u16) << 14
    }

    /// Emit the Frame Control field into the first two octets of `buffer`.
    pub fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        let b = buffer.get_mut(..2).ok_or(Error)?;
        b.copy_from_slice(&self.to_bits().to_le_bytes());
        Ok(())
    }
}
