use crate::{Error, Result};

/// A reader/writer for an IEEE 802.15.4 Payload Information Element.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub struct PayloadInformationElement<T: AsRef<[u8]>> {
    data: T,
}

impl<T: AsRef<[u8]>> PayloadInformationElement<T> {
    /// Create a new [`PayloadInformationElement`] reader/writer from a given
    /// buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer can not hold the descriptor and the
    /// announced content, or if the type bit marks a header IE.
    pub fn new(data: T) -> Result<Self> {
        let ie = Self::new_unchecked(data);

        if !ie.check_len() || ie.descriptor() >> 15 != 1 {
            return Err(Error);
        }

        Ok(ie)
    }

    fn check_len(&self) -> bool {
        let data = self.data.as_ref();
        data.len() >= 2 && data.len() >= 2 + self.len()
    }

    /// Create a new [`PayloadInformationElement`] reader/writer from a given
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

    /// Return the length field value (the length of the content).
    pub fn len(&self) -> usize {
        (self.descriptor() & 0b0111_1111_1111) as usize
    }

    /// Return the [`PayloadGroupId`].
    pub fn group_id(&self) -> PayloadGroupId {
        PayloadGroupId::from(((self.descriptor() >> 11) & 0b1111) as u8)
    }

    /// Return the content of this Payload Information Element.
    pub fn content(&self) -> &[u8] {
        &self.data.as_ref()[2..][..self.len()]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> PayloadInformationElement<T> {
    /// Write a descriptor for an element of the given group and content
    /// length.
    pub fn set_descriptor(&mut self, group_id: PayloadGroupId, len: usize) {
        let value = (len as u16 & 0b0111_1111_1111)
            | ((u8::from(group_id) as u16 & 0b1111) << 11)
            | 0b1000_0000_0000_0000;
        self.data.as_mut()[0..2].copy_from_slice(&value.to_le_bytes());
    }

    /// Return the content of this Payload Information Element.
    pub fn content_mut(&mut self) -> &mut [u8] {
        &mut self.data.as_mut()[2..]
    }
}

impl<T: AsRef<[u8]>> core::fmt::Display for PayloadInformationElement<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.group_id() {
            PayloadGroupId::PayloadTermination => write!(f, "PayloadTermination"),
            id => write!(f, "{:?}({:0x?})", id, self.content()),
        }
    }
}

/// Payload Information Element group ID.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadGroupId {
    /// Encapsulated Service Data Unit Information Elements.
    Esdu,
    /// MAC sublayer Management Entity Information Elements.
    Mlme,
    /// Vendor specific Nested Information Elements.
    VendorSpecific,
    /// Multiplexed IE.
    Multiplexed,
    /// IETF IE.
    Ietf,
    /// Payload Termination.
    PayloadTermination,
    /// Any other group id.
    Unknown(u8),
}

impl From<u8> for PayloadGroupId {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::Esdu,
            0x01 => Self::Mlme,
            0x02 => Self::VendorSpecific,
            0x03 => Self::Multiplexed,
            0x05 => Self::Ietf,
            0x0f => Self::PayloadTermination,
            id => Self::Unknown(id),
        }
    }
}

impl From<PayloadGroupId> for u8 {
    fn from(value: PayloadGroupId) -> Self {
        match value {
            PayloadGroupId::Esdu => 0x00,
            PayloadGroupId::Mlme => 0x01,
            PayloadGroupId::VendorSpecific => 0x02,
            PayloadGroupId::Multiplexed => 0x03,
            PayloadGroupId::Ietf => 0x05,
            PayloadGroupId::PayloadTermination => 0x0f,
            PayloadGroupId::Unknown(id) => id,
        }
    }
}
