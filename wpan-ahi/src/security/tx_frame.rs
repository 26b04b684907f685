use wpan_frame::{Frame, MAX_FRAME_LEN};

use crate::{Error, Result};

/// A MAC frame (without FCS) waiting to be transmitted.
///
/// The frame is secured at most once, however many times it is sent: after
/// [`encode`](super::encode) the buffer holds the ciphertext and the MIC, and
/// a copy of the MAC header taken when the frame counter was written.
#[derive(Debug, Clone)]
pub struct TxFrame {
    buffer: [u8; MAX_FRAME_LEN],
    len: usize,
    encoded: bool,
    header: heapless::Vec<u8, MAX_FRAME_LEN>,
}

impl TxFrame {
    /// Copy a frame into a transmit buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFrame`] if the frame does not parse.
    pub fn new(frame: &[u8]) -> Result<Self> {
        Frame::new(frame)?;

        let mut buffer = [0u8; MAX_FRAME_LEN];
        buffer[..frame.len()].copy_from_slice(frame);

        Ok(Self {
            buffer,
            len: frame.len(),
            encoded: false,
            header: heapless::Vec::new(),
        })
    }

    /// Return the frame as it is sent.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// Return the length of the frame.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` once the frame has been secured.
    pub fn is_encoded(&self) -> bool {
        self.encoded
    }

    /// Parse the frame.
    pub fn frame(&self) -> Result<Frame<&[u8]>> {
        Ok(Frame::new(self.as_bytes())?)
    }

    /// Return the MAC header recorded when the frame was secured.
    pub fn header_snapshot(&self) -> &[u8] {
        &self.header
    }

    /// Write the recorded MAC header back into the frame. Called before every
    /// physical re-send, as the radio may have updated header fields in place.
    pub fn restore_header(&mut self) {
        let len = self.header.len();
        self.buffer[..len].copy_from_slice(&self.header);
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer[..self.len]
    }

    pub(crate) fn snapshot_header(&mut self, header_len: usize) -> Result<()> {
        self.header = heapless::Vec::from_slice(&self.buffer[..header_len])
            .map_err(|_| Error::MalformedFrame)?;
        Ok(())
    }

    pub(crate) fn set_encoded(&mut self) {
        self.encoded = true;
    }
}

impl AsRef<[u8]> for TxFrame {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
