//! The [`Frame`] reader.

use core::ops::Range;

use crate::ie::{walk_header_ies, walk_payload_ies};
use crate::{
    Address, AddressingMode, Error, FrameControl, FrameControlRepr, FrameType, FrameVersion,
    HeaderElementId, HeaderIeTable, HeaderInformationElement, HeaderLayout, HeaderTermination,
    KeyIdMode, PayloadIeTable, PayloadInformationElement, Result, SecurityParams,
};

/// Maximum length of a MAC frame (aMaxPhyPacketSize).
pub const MAX_FRAME_LEN: usize = 127;

/// Everything learned about a frame while parsing it.
///
/// All offsets are relative to the start of the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    /// The decoded Frame Control field.
    pub frame_control: FrameControlRepr,
    /// The sequence number, if not suppressed.
    pub sequence_number: Option<u8>,
    /// Location of the addressing fields.
    pub layout: HeaderLayout,
    /// Auxiliary security header, for frames with security enabled.
    pub security: Option<SecurityParams>,
    /// Header Information Elements.
    pub header_ies: HeaderIeTable,
    /// Payload Information Elements.
    pub payload_ies: PayloadIeTable,
    /// A Header Termination 1 IE announced payload IEs.
    pub payload_ies_present: bool,
    /// The command frame identifier of a MAC command frame.
    pub command_id: Option<u8>,
    /// Length of the MAC header: every octet that is authenticated but never
    /// encrypted.
    pub mac_header_len: usize,
    /// The MAC payload, excluding the MIC.
    pub payload: Range<usize>,
}

/// How the payload of a frame is interpreted while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadState {
    Plaintext,
    Received,
}

impl FrameInfo {
    fn parse(buffer: &[u8], state: PayloadState) -> Result<Self> {
        let len = buffer.len();
        if !(2..=MAX_FRAME_LEN).contains(&len) {
            return Err(Error);
        }

        let frame_control = FrameControlRepr::parse(&FrameControl::new(buffer)?)?;

        if !matches!(
            frame_control.frame_type,
            FrameType::Beacon | FrameType::Data | FrameType::Ack | FrameType::MacCommand
        ) {
            return Err(Error);
        }

        let mut offset = 2;
        let sequence_number = if frame_control.sequence_number_elided() {
            None
        } else {
            let sn = *buffer.get(offset).ok_or(Error)?;
            offset += 1;
            Some(sn)
        };

        let layout = HeaderLayout::new(&frame_control, offset);
        if layout.end > len {
            return Err(Error);
        }
        offset = layout.end;

        let (security, end) = if frame_control.security_enabled {
            // The 2003 security format has no auxiliary security header.
            if frame_control.frame_version == FrameVersion::Ieee802154_2003 {
                return Err(Error);
            }
            let (params, header_end) =
                SecurityParams::parse(buffer, offset, frame_control.frame_version)?;
            offset = header_end;
            let mic_start = params.mic.start;
            (Some(params), mic_start)
        } else {
            (None, len)
        };

        let opaque = state == PayloadState::Received
            && security.as_ref().is_some_and(|s| s.level.encrypts());

        let mut header_ies = HeaderIeTable::new();
        let mut payload_ies = PayloadIeTable::new();
        let mut payload_ies_present = false;
        let mut payload_ies_end = None;

        if frame_control.information_elements_follow() {
            let (header_end, termination) =
                walk_header_ies(buffer, offset, end, &mut header_ies)?;
            offset = header_end;

            if termination == HeaderTermination::PayloadIes {
                payload_ies_present = true;
                if !opaque {
                    payload_ies_end =
                        Some(walk_payload_ies(buffer, offset, end, &mut payload_ies)?);
                }
            }
        }

        let mut mac_header_len = offset;
        let mut command_id = None;

        if frame_control.frame_type == FrameType::MacCommand {
            if !payload_ies_present {
                command_id = Some(*buffer[..end].get(offset).ok_or(Error)?);
                mac_header_len += 1;
            } else if let Some(ies_end) = payload_ies_end {
                command_id = buffer[..end].get(ies_end).copied();
            }
        }

        Ok(Self {
            frame_control,
            sequence_number,
            layout,
            security,
            header_ies,
            payload_ies,
            payload_ies_present,
            command_id,
            mac_header_len,
            payload: mac_header_len..end,
        })
    }
}

/// A reader for an IEEE 802.15.4 MAC frame, without FCS.
///
/// The frame is validated once, when the reader is created.
#[derive(Debug, Clone)]
pub struct Frame<T: AsRef<[u8]>> {
    buffer: T,
    info: FrameInfo,
}

impl<T: AsRef<[u8]>> Frame<T> {
    /// Parse a frame whose payload is in plaintext, such as a frame that is
    /// about to be secured.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is truncated, a length field does not fit
    /// the buffer, or a field holds a reserved value.
    pub fn new(buffer: T) -> Result<Self> {
        let info = FrameInfo::parse(buffer.as_ref(), PayloadState::Plaintext)?;
        Ok(Self { buffer, info })
    }

    /// Parse a frame as received over the air. When the security level
    /// encrypts, the payload (payload IEs included) is treated as opaque.
    ///
    /// # Errors
    ///
    /// See [`Frame::new`].
    pub fn new_received(buffer: T) -> Result<Self> {
        let info = FrameInfo::parse(buffer.as_ref(), PayloadState::Received)?;
        Ok(Self { buffer, info })
    }

    /// Return everything learned while parsing the frame.
    pub fn info(&self) -> &FrameInfo {
        &self.info
    }

    /// Return the raw frame.
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    /// Consume the reader and return the underlying buffer.
    pub fn into_inner(self) -> T {
        self.buffer
    }

    /// Return the decoded Frame Control field.
    pub fn frame_control(&self) -> &FrameControlRepr {
        &self.info.frame_control
    }

    /// Return the sequence number, if present.
    pub fn sequence_number(&self) -> Option<u8> {
        self.info.sequence_number
    }

    /// Return the location of the addressing fields.
    pub fn layout(&self) -> &HeaderLayout {
        &self.info.layout
    }

    fn u16_at(&self, offset: Option<usize>) -> Option<u16> {
        let b = &self.buffer.as_ref()[offset?..][..2];
        Some(u16::from_le_bytes([b[0], b[1]]))
    }

    fn address_at(&self, offset: Option<usize>, mode: AddressingMode) -> Address {
        match offset {
            Some(offset) => Address::from_le_bytes(mode, &self.buffer.as_ref()[offset..])
                .unwrap_or(Address::Absent),
            None => Address::Absent,
        }
    }

    /// Return the destination PAN ID, if present.
    pub fn dst_pan_id(&self) -> Option<u16> {
        self.u16_at(self.info.layout.dst_pan_id)
    }

    /// Return the source PAN ID, if present.
    pub fn src_pan_id(&self) -> Option<u16> {
        self.u16_at(self.info.layout.src_pan_id)
    }

    /// Return the destination address.
    pub fn dst_address(&self) -> Address {
        self.address_at(
            self.info.layout.dst_address,
            self.info.frame_control.dst_addressing_mode,
        )
    }

    /// Return the source address.
    pub fn src_address(&self) -> Address {
        self.address_at(
            self.info.layout.src_address,
            self.info.frame_control.src_addressing_mode,
        )
    }

    /// Return the auxiliary security header parameters, if security is
    /// enabled.
    pub fn security(&self) -> Option<&SecurityParams> {
        self.info.security.as_ref()
    }

    /// Return the frame counter, if security is enabled and the counter is not
    /// suppressed.
    pub fn frame_counter(&self) -> Option<u32> {
        let at = self.info.security.as_ref()?.frame_counter?;
        let b = &self.buffer.as_ref()[at..][..4];
        Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Return the Key Identifier field (key source followed by key index).
    pub fn key_id(&self) -> &[u8] {
        match &self.info.security {
            Some(params) => &self.buffer.as_ref()[params.key_id.clone()],
            None => &[],
        }
    }

    /// Return the key index, if the key identifier mode carries one.
    pub fn key_index(&self) -> Option<u8> {
        let params = self.info.security.as_ref()?;
        if params.key_id_mode == KeyIdMode::Implicit {
            return None;
        }
        self.key_id().last().copied()
    }

    /// Return the key source, empty unless the key identifier mode carries
    /// one.
    pub fn key_source(&self) -> &[u8] {
        let key_id = self.key_id();
        match key_id.split_last() {
            Some((_, source)) => source,
            None => key_id,
        }
    }

    /// Return the MIC.
    pub fn mic(&self) -> &[u8] {
        match &self.info.security {
            Some(params) => &self.buffer.as_ref()[params.mic.clone()],
            None => &[],
        }
    }

    /// Return the MAC header: every octet before the payload.
    pub fn header(&self) -> &[u8] {
        &self.buffer.as_ref()[..self.info.mac_header_len]
    }

    /// Return the MAC payload, excluding the MIC.
    ///
    /// Payload IEs, when present, are part of the payload.
    pub fn payload(&self) -> &[u8] {
        &self.buffer.as_ref()[self.info.payload.clone()]
    }

    /// Return the command frame identifier of a MAC command frame.
    pub fn command_id(&self) -> Option<u8> {
        self.info.command_id
    }

    /// Returns an [`Iterator`] over the Header Information Elements.
    pub fn header_information_elements(
        &self,
    ) -> impl Iterator<Item = HeaderInformationElement<&[u8]>> + '_ {
        self.info.header_ies.iter().map(move |entry| {
            HeaderInformationElement::new_unchecked(
                &self.buffer.as_ref()[entry.offset..][..2 + entry.len],
            )
        })
    }

    /// Returns an [`Iterator`] over the Payload Information Elements. Empty for
    /// a received frame with an encrypted payload.
    pub fn payload_information_elements(
        &self,
    ) -> impl Iterator<Item = PayloadInformationElement<&[u8]>> + '_ {
        self.info.payload_ies.iter().map(move |entry| {
            PayloadInformationElement::new_unchecked(
                &self.buffer.as_ref()[entry.offset..][..2 + entry.len],
            )
        })
    }

    /// Return the content of the first Header Information Element with the
    /// given id.
    pub fn header_ie(&self, id: HeaderElementId) -> Option<&[u8]> {
        let entry = self.info.header_ies.iter().find(|entry| entry.id == id)?;
        Some(&self.buffer.as_ref()[entry.offset + 2..][..entry.len])
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Frame<T> {
    /// Write the frame counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame carries no frame counter.
    pub fn set_frame_counter(&mut self, frame_counter: u32) -> Result<()> {
        let at = self
            .info
            .security
            .as_ref()
            .and_then(|params| params.frame_counter)
            .ok_or(Error)?;
        self.buffer.as_mut()[at..][..4].copy_from_slice(&frame_counter.to_le_bytes());
        Ok(())
    }

    /// Split the frame into its header, payload and MIC.
    pub fn split_mut(&mut self) -> (&mut [u8], &mut [u8], &mut [u8]) {
        let payload = self.info.payload.clone();
        let (header, rest) = self.buffer.as_mut().split_at_mut(payload.start);
        let (payload, mic) = rest.split_at_mut(payload.end - payload.start);
        (header, payload, mic)
    }
}

impl<T: AsRef<[u8]>> core::fmt::Display for Frame<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let fc = self.frame_control();
        write!(f, "{:?} ({:?})", fc.frame_type, fc.frame_version)?;
        if let Some(sn) = self.sequence_number() {
            write!(f, " seq {}", sn)?;
        }
        if let Some(pan_id) = self.dst_pan_id() {
            write!(f, " dst-pan {:04x}", pan_id)?;
        }
        if !self.dst_address().is_absent() {
            write!(f, " dst {}", self.dst_address())?;
        }
        if let Some(pan_id) = self.src_pan_id() {
            write!(f, " src-pan {:04x}", pan_id)?;
        }
        if !self.src_address().is_absent() {
            write!(f, " src {}", self.src_address())?;
        }
        if let Some(params) = self.security() {
            write!(f, " {:?}", params.level)?;
        }
        Ok(())
    }
}
