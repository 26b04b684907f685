//! IEEE 802.15.4 Header Information Element readers and writers.

use crate::{Error, Result};

/// A reader/writer for an IEEE 802.15.4 Header Information Element.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub struct HeaderInformationElement<T: AsRef<[u8]>> {
    data: T,
}

impl<T: AsRef<[u8]>> HeaderInformationElement<T> {
    /// Create a new [`HeaderInformationElement`] reader/writer from a given
    /// buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is too short to hold the descriptor and
    /// the content announced by the length field, or if the type bit marks a
    /// payload IE.
    pub fn new(data: T) -> Result<Self> {
        let ie = Self::new_unchecked(data);

        if !ie.check_len() || ie.descriptor() >> 15 != 0 {
            return Err(Error);
        }

        Ok(ie)
    }

    fn check_len(&self) -> bool {
        let data = self.data.as_ref();
        data.len() >= 2 && data.len() >= 2 + self.len()
    }

    /// Create a new [`HeaderInformationElement`] reader/writer from a given
    /// buffer without length checking.
    pub fn new_unchecked(data: T) -> Self {
        Self { data }
    }

    fn descriptor(&self) -> u16 {
        let b = &self.data.as_ref()[0..2];
        u16::from_le_bytes([b[0], b[1]])
    }

    /// Returns `true` when the length field is 0.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the length field value.
    pub fn len(&self) -> usize {
        (self.descriptor() & 0b0111_1111) as usize
    }

    /// Return the [`HeaderElementId`].
    pub fn element_id(&self) -> HeaderElementId {
        HeaderElementId::from(((self.descriptor() >> 7) & 0xff) as u8)
    }

    /// Return the content of this Header Information Element.
    pub fn content(&self) -> &[u8] {
        &self.data.as_ref()[2..][..self.len()]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> HeaderInformationElement<T> {
    /// Write a descriptor for an element with the given id and content
    /// length.
    pub fn set_descriptor(&mut self, id: HeaderElementId, len: usize) {
        let value = (len as u16 & 0b0111_1111) | ((u8::from(id) as u16) << 7);
        self.data.as_mut()[0..2].copy_from_slice(&value.to_le_bytes());
    }

    /// Return the content of this Header Information Element.
    pub fn content_mut(&mut self) -> &mut [u8] {
        &mut self.data.as_mut()[2..]
    }
}

impl<T: AsRef<[u8]>> core::fmt::Display for HeaderInformationElement<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let id = self.element_id();
        match id {
            HeaderElementId::HeaderTermination1 | HeaderElementId::HeaderTermination2 => {
                write!(f, "{:?}", id)
            }
            HeaderElementId::Csl => match Csl::new(self.content()) {
                Ok(csl) => write!(f, "{} {}", id, csl),
                Err(_) => write!(f, "{:?}({:0x?})", id, self.content()),
            },
            HeaderElementId::TimeCorrection => match TimeCorrection::new(self.content()) {
                Ok(tc) => write!(f, "{} {}", id, tc),
                Err(_) => write!(f, "{:?}({:0x?})", id, self.content()),
            },
            id => write!(f, "{:?}({:0x?})", id, self.content()),
        }
    }
}

/// Header Information Element ID.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaderElementId {
    /// Vendor specific header.
    VendorSpecificHeader,
    /// Csl header.
    Csl,
    /// Rit header.
    Rit,
    /// Rendezvous Time header.
    RendezvousTime,
    /// Time Correction header.
    TimeCorrection,
    /// Simplified Superframe Specification header.
    SimplifiedSuperframeSpecification,
    /// Global Time header.
    GlobalTime,
    /// Header Termination 1: payload IEs follow.
    HeaderTermination1,
    /// Header Termination 2: the payload follows.
    HeaderTermination2,
    /// Any other element id.
    Unknown(u8),
}

impl From<u8> for HeaderElementId {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::VendorSpecificHeader,
            0x1a => Self::Csl,
            0x1b => Self::Rit,
            0x1d => Self::RendezvousTime,
            0x1e => Self::TimeCorrection,
            0x23 => Self::SimplifiedSuperframeSpecification,
            0x29 => Self::GlobalTime,
            0x7e => Self::HeaderTermination1,
            0x7f => Self::HeaderTermination2,
            id => Self::Unknown(id),
        }
    }
}

impl From<HeaderElementId> for u8 {
    fn from(value: HeaderElementId) -> Self {
        match value {
            HeaderElementId::VendorSpecificHeader => 0x00,
            HeaderElementId::Csl => 0x1a,
            HeaderElementId::Rit => 0x1b,
            HeaderElementId::RendezvousTime => 0x1d,
            HeaderElementId::TimeCorrection => 0x1e,
            HeaderElementId::SimplifiedSuperframeSpecification => 0x23,
            HeaderElementId::GlobalTime => 0x29,
            HeaderElementId::HeaderTermination1 => 0x7e,
            HeaderElementId::HeaderTermination2 => 0x7f,
            HeaderElementId::Unknown(id) => id,
        }
    }
}

impl core::fmt::Display for HeaderElementId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TimeCorrection => write!(f, "Time Correction"),
            Self::Csl => write!(f, "CSL"),
            _ => write!(f, "{:?}", self),
        }
    }
}

/// A reader for the CSL Header Information Element.
///
/// Phase and period are expressed in units of 10 symbols.
#[derive(Debug)]
pub struct Csl<T: AsRef<[u8]>> {
    data: T,
}

impl<T: AsRef<[u8]>> Csl<T> {
    /// Create a new [`Csl`] reader, accepting both the 4-octet and the
    /// 6-octet (with rendezvous time) form.
    pub fn new(data: T) -> Result<Self> {
        match data.as_ref().len() {
            4 | 6 => Ok(Self { data }),
            _ => Err(Error),
        }
    }

    fn u16_at(&self, offset: usize) -> u16 {
        let b = &self.data.as_ref()[offset..][..2];
        u16::from_le_bytes([b[0], b[1]])
    }

    /// Return the CSL phase.
    pub fn phase(&self) -> u16 {
        self.u16_at(0)
    }

    /// Return the CSL period.
    pub fn period(&self) -> u16 {
        self.u16_at(2)
    }

    /// Return the rendezvous time, if present.
    pub fn rendezvous_time(&self) -> Option<u16> {
        (self.data.as_ref().len() == 6).then(|| self.u16_at(4))
    }
}

impl<T: AsRef<[u8]>> core::fmt::Display for Csl<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "phase: {}, period: {}", self.phase(), self.period())?;
        if let Some(rt) = self.rendezvous_time() {
            write!(f, ", rendezvous time: {}", rt)?;
        }
        Ok(())
    }
}

/// A reader for the Time Correction Header Information Element.
#[derive(Debug)]
pub struct TimeCorrection<T: AsRef<[u8]>> {
    data: T,
}

impl<T: AsRef<[u8]>> TimeCorrection<T> {
    /// Create a new [`TimeCorrection`] reader.
    pub fn new(data: T) -> Result<Self> {
        if data.as_ref().len() < 2 {
            return Err(Error);
        }
        Ok(Self { data })
    }

    fn raw(&self) -> u16 {
        let b = &self.data.as_ref()[..2];
        u16::from_le_bytes([b[0], b[1]])
    }

    /// Return the time correction in microseconds.
    pub fn time_correction_us(&self) -> i16 {
        // Sign-extend the 12-bit field.
        (((self.raw() & 0x0fff) << 4) as i16) >> 4
    }

    /// Returns `true` when the frame was not acknowledged.
    pub fn nack(&self) -> bool {
        self.raw() & 0x8000 != 0
    }
}

impl<T: AsRef<[u8]>> core::fmt::Display for TimeCorrection<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}us, nack: {}", self.time_correction_us(), self.nack() as usize)
    }
}

/// Thread vendor OUI (little-endian) followed by the Enhanced-ACK probing
/// sub-type.
const LINK_METRICS_PREFIX: [u8; 4] = [0x9b, 0xb8, 0xea, 0x00];

/// A high-level representation of a Header Information Element to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaderInformationElementRepr<'c> {
    /// CSL IE.
    Csl {
        /// CSL phase, in units of 10 symbols.
        phase: u16,
        /// CSL period, in units of 10 symbols.
        period: u16,
        /// Rendezvous time, in units of 10 symbols.
        rendezvous_time: Option<u16>,
    },
    /// Thread Enhanced-ACK Link Metrics vendor IE, carrying the raw metric
    /// values in the order they were configured.
    LinkMetrics {
        /// Metric values.
        values: &'c [u8],
    },
    /// Any element with raw content.
    Raw {
        /// Element id.
        id: HeaderElementId,
        /// Element content.
        content: &'c [u8],
    },
    /// Header Termination 1.
    HeaderTermination1,
    /// Header Termination 2.
    HeaderTermination2,
}

impl HeaderInformationElementRepr<'_> {
    /// Return the length of the content in octets.
    pub fn content_len(&self) -> usize {
        match self {
            Self::Csl {
                rendezvous_time, ..
            } => 4 + 2 * rendezvous_time.is_some() as usize,
            Self::LinkMetrics { values } => LINK_METRICS_PREFIX.len() + values.len(),
            Self::Raw { content, .. } => content.len(),
            Self::HeaderTermination1 | Self::HeaderTermination2 => 0,
        }
    }

    /// Return the length of the element, including its descriptor.
    pub fn buffer_len(&self) -> usize {
        2 + self.content_len()
    }

    fn id(&self) -> HeaderElementId {
        match self {
            Self::Csl { .. } => HeaderElementId::Csl,
            Self::LinkMetrics { .. } => HeaderElementId::VendorSpecificHeader,
            Self::Raw { id, .. } => *id,
            Self::HeaderTermination1 => HeaderElementId::HeaderTermination1,
            Self::HeaderTermination2 => HeaderElementId::HeaderTermination2,
        }
    }

    /// Emit the element into `buffer`, returning the number of octets
    /// written.
    pub fn emit(&self, buffer: &mut [u8]) -> Result<usize> {
        let len = self.content_len();
        if len > 0x7f {
            return Err(Error);
        }

        let b = buffer.get_mut(..2 + len).ok_or(Error)?;
        let mut ie = HeaderInformationElement::new_unchecked(b);
        ie.set_descriptor(self.id(), len);

        let content = ie.content_mut();
        match self {
            Self::Csl {
                phase,
                period,
                rendezvous_time,
            } => {
                content[0..2].copy_from_slice(&phase.to_le_bytes());
                content[2..4].copy_from_slice(&period.to_le_bytes());
                if let Some(rt) = rendezvous_time {
                    content[4..6].copy_from_slice(&rt.to_le_bytes());
                }
            }
            Self::LinkMetrics { values } => {
                let (prefix, rest) = content.split_at_mut(LINK_METRICS_PREFIX.len());
                prefix.copy_from_slice(&LINK_METRICS_PREFIX);
                rest.copy_from_slice(values);
            }
            Self::Raw { content: raw, .. } => content.copy_from_slice(raw),
            Self::HeaderTermination1 | Self::HeaderTermination2 => {}
        }

        Ok(2 + len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor() {
        // Time correction, 2 octets.
        let data = [0x02, 0x0f, 0xe1, 0x8f];
        let ie = HeaderInformationElement::new(&data[..]).unwrap();
        assert_eq!(ie.element_id(), HeaderElementId::TimeCorrection);
        assert_eq!(ie.len(), 2);
        assert_eq!(ie.content(), &[0xe1, 0x8f]);

        let tc = TimeCorrection::new(ie.content()).unwrap();
        assert_eq!(tc.time_correction_us(), -31);
        assert!(tc.nack());

        // Header termination 1.
        let ie = HeaderInformationElement::new(&[0x00, 0x3f][..]).unwrap();
        assert_eq!(ie.element_id(), HeaderElementId::HeaderTermination1);
        assert!(ie.is_empty());

        // Header termination 2.
        let ie = HeaderInformationElement::new(&[0x80, 0x3f][..]).unwrap();
        assert_eq!(ie.element_id(), HeaderElementId::HeaderTermination2);
    }

    #[test]
    fn length_checked_against_buffer() {
        assert!(HeaderInformationElement::new(&[0x02][..]).is_err());
        assert!(HeaderInformationElement::new(&[0x02, 0x0f, 0xe1][..]).is_err());
        // Type bit set: this is a payload IE descriptor.
        assert!(HeaderInformationElement::new(&[0x00, 0x88][..]).is_err());
    }

    #[test]
    fn emit_csl() {
        let repr = HeaderInformationElementRepr::Csl {
            phase: 0x1234,
            period: 0x00c8,
            rendezvous_time: None,
        };
        let mut buffer = [0u8; 6];
        assert_eq!(repr.emit(&mut buffer), Ok(6));
        assert_eq!(buffer, [0x04, 0x0d, 0x34, 0x12, 0xc8, 0x00]);

        let ie = HeaderInformationElement::new(&buffer[..]).unwrap();
        assert_eq!(ie.element_id(), HeaderElementId::Csl);
        let csl = Csl::new(ie.content()).unwrap();
        assert_eq!(csl.phase(), 0x1234);
        assert_eq!(csl.period(), 200);
        assert_eq!(csl.rendezvous_time(), None);

        let repr = HeaderInformationElementRepr::Csl {
            phase: 1,
            period: 2,
            rendezvous_time: Some(3),
        };
        assert_eq!(repr.buffer_len(), 8);
        assert!(repr.emit(&mut buffer).is_err());
    }

    #[test]
    fn emit_link_metrics() {
        let repr = HeaderInformationElementRepr::LinkMetrics {
            values: &[0xa5, 0x3c],
        };
        let mut buffer = [0u8; 8];
        assert_eq!(repr.emit(&mut buffer), Ok(8));
        assert_eq!(buffer, [0x06, 0x00, 0x9b, 0xb8, 0xea, 0x00, 0xa5, 0x3c]);

        let ie = HeaderInformationElement::new(&buffer[..]).unwrap();
        assert_eq!(ie.element_id(), HeaderElementId::VendorSpecificHeader);
        assert_eq!(ie.len(), 6);
    }

    #[test]
    fn emit_termination() {
        let mut buffer = [0u8; 2];
        HeaderInformationElementRepr::HeaderTermination2
            .emit(&mut buffer)
            .unwrap();
        assert_eq!(buffer, [0x80, 0x3f]);
    }

    #[test]
    fn unknown_ids_round_trip() {
        assert_eq!(HeaderElementId::from(0x42), HeaderElementId::Unknown(0x42));
        assert_eq!(u8::from(HeaderElementId::Unknown(0x42)), 0x42);
        assert_eq!(u8::from(HeaderElementId::from(0x1a)), 0x1a);
    }
}
