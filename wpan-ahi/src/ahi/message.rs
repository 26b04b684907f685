use crate::config::MAX_MESSAGE_LEN;
use crate::{Error, Result};

/// Length of the fixed message header: `msg_len`, `rsp_msg`, `rsp_event` and a
/// reserved octet.
pub const HEADER_LEN: usize = 7;

mod field {
    use core::ops::Range;

    pub const MSG_LEN: Range<usize> = 0..2;
    pub const RSP_MSG: Range<usize> = 2..4;
    pub const RSP_EVENT: Range<usize> = 4..6;
    pub const RESERVED: usize = 6;
    pub const PAYLOAD: usize = super::HEADER_LEN;
}

/// The `(rsp_msg, rsp_event)` pair identifying the message that completes a
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct ResponseToken {
    /// Message id of the response.
    pub msg: u16,
    /// Event id of the response.
    pub event: u16,
}

impl ResponseToken {
    /// Create a new token.
    pub const fn new(msg: u16, event: u16) -> Self {
        Self { msg, event }
    }
}

/// How a prefix of a byte stream looks like as a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Completeness {
    /// More bytes are needed.
    Incomplete,
    /// The buffer holds exactly one message.
    Valid,
    /// The buffer can not be the start of a message.
    Corrupt,
}

/// Check whether `buffer` holds exactly one structurally valid message.
pub fn completeness(buffer: &[u8]) -> Completeness {
    if buffer.len() >= field::MSG_LEN.end {
        let msg_len = u16::from_le_bytes([buffer[0], buffer[1]]) as usize;
        if !(HEADER_LEN..=MAX_MESSAGE_LEN).contains(&msg_len) {
            return Completeness::Corrupt;
        }
        if buffer.len() > field::RESERVED && buffer[field::RESERVED] != 0 {
            return Completeness::Corrupt;
        }
        if buffer.len() == msg_len {
            return Completeness::Valid;
        }
        if buffer.len() > msg_len {
            return Completeness::Corrupt;
        }
    }
    Completeness::Incomplete
}

/// An AHI message.
///
/// Used for both directions: outgoing commands are built in place with the
/// `push_*` methods, incoming responses and events are read with the
/// accessors. `msg_len` always counts the whole message, header included.
#[derive(Clone, PartialEq, Eq)]
pub struct Message {
    buffer: heapless::Vec<u8, MAX_MESSAGE_LEN>,
}

impl Message {
    /// Create a message with an empty payload.
    pub fn new(token: ResponseToken) -> Self {
        let mut message = Self {
            buffer: heapless::Vec::new(),
        };
        message.reset(token);
        message
    }

    /// Parse a message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMessage`] unless `bytes` holds exactly one
    /// structurally valid message.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if completeness(bytes) != Completeness::Valid {
            return Err(Error::InvalidMessage);
        }
        Ok(Self {
            buffer: heapless::Vec::from_slice(bytes).map_err(|_| Error::InvalidMessage)?,
        })
    }

    /// Empty the payload and write a new header, reusing the buffer.
    pub fn reset(&mut self, token: ResponseToken) {
        self.buffer.clear();
        self.buffer.resize_default(HEADER_LEN).ok();
        self.buffer[field::RSP_MSG].copy_from_slice(&token.msg.to_le_bytes());
        self.buffer[field::RSP_EVENT].copy_from_slice(&token.event.to_le_bytes());
        self.update_len();
    }

    fn update_len(&mut self) {
        let len = self.buffer.len() as u16;
        self.buffer[field::MSG_LEN].copy_from_slice(&len.to_le_bytes());
    }

    /// Append raw bytes to the payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMessage`], leaving the message unchanged, if
    /// the message would exceed the maximum message length.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer
            .extend_from_slice(bytes)
            .map_err(|_| Error::InvalidMessage)?;
        self.update_len();
        Ok(())
    }

    /// Append an octet to the payload.
    pub fn push_u8(&mut self, value: u8) -> Result<()> {
        self.push_bytes(&[value])
    }

    /// Append a little-endian `u16` to the payload.
    pub fn push_u16(&mut self, value: u16) -> Result<()> {
        self.push_bytes(&value.to_le_bytes())
    }

    /// Append a little-endian `u32` to the payload.
    pub fn push_u32(&mut self, value: u32) -> Result<()> {
        self.push_bytes(&value.to_le_bytes())
    }

    /// Return the whole message, as sent over the wire.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Return the `msg_len` field.
    pub fn msg_len(&self) -> u16 {
        self.u16_at(field::MSG_LEN.start)
    }

    /// Return the `rsp_msg` field.
    pub fn rsp_msg(&self) -> u16 {
        self.u16_at(field::RSP_MSG.start)
    }

    /// Return the `rsp_event` field.
    pub fn rsp_event(&self) -> u16 {
        self.u16_at(field::RSP_EVENT.start)
    }

    /// Return the `(rsp_msg, rsp_event)` pair of the message.
    pub fn token(&self) -> ResponseToken {
        ResponseToken::new(self.rsp_msg(), self.rsp_event())
    }

    /// Return the payload.
    pub fn payload(&self) -> &[u8] {
        &self.buffer[field::PAYLOAD..]
    }

    /// Return a [`Reader`] over the payload.
    pub fn reader(&self) -> Reader<'_> {
        Reader::new(self.payload())
    }

    fn u16_at(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.buffer[offset], self.buffer[offset + 1]])
    }
}

impl core::fmt::Debug for Message {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Message")
            .field("msg_len", &self.msg_len())
            .field("rsp_msg", &self.rsp_msg())
            .field("rsp_event", &self.rsp_event())
            .field("payload", &self.payload())
            .finish()
    }
}

impl core::fmt::Display for Message {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "msg {:04x} event {:04x} len {} payload {:02x?}",
            self.rsp_msg(),
            self.rsp_event(),
            self.msg_len(),
            self.payload()
        )
    }
}

/// A bounds checked cursor over a message payload.
#[derive(Debug, Clone)]
pub struct Reader<'p> {
    data: &'p [u8],
}

impl<'p> Reader<'p> {
    /// Create a reader over `data`.
    pub fn new(data: &'p [u8]) -> Self {
        Self { data }
    }

    /// Take the next `len` bytes.
    pub fn bytes(&mut self, len: usize) -> Result<&'p [u8]> {
        if len > self.data.len() {
            return Err(Error::InvalidMessage);
        }
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Ok(head)
    }

    /// Take the next octet.
    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    /// Take the next octet as a signed value.
    pub fn i8(&mut self) -> Result<i8> {
        Ok(self.u8()? as i8)
    }

    /// Take the next little-endian `u16`.
    pub fn u16(&mut self) -> Result<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Take the next little-endian `u32`.
    pub fn u32(&mut self) -> Result<u32> {
        let b = self.bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Take the next little-endian `u64`.
    pub fn u64(&mut self) -> Result<u64> {
        let b = self.bytes(8)?;
        let mut value = [0u8; 8];
        value.copy_from_slice(b);
        Ok(u64::from_le_bytes(value))
    }

    /// Return the bytes not read yet.
    pub fn remaining(&self) -> &'p [u8] {
        self.data
    }

    /// Returns `true` when everything was read.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
