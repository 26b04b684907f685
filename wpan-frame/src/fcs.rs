use crate::{Error, Frame, Result};

/// The 16-bit ITU-T CRC used by IEEE 802.15.4 (x^16 + x^12 + x^5 + 1), with
/// both the initial and the final value set to 0x0000.
const CRC_16_IEEE802154: crc::Algorithm<u16> = crc::Algorithm {
    width: 16,
    poly: 0x1021,
    init: 0x0000,
    refin: true,
    refout: true,
    xorout: 0x0000,
    check: 0x2189,
    residue: 0x0000,
};

/// A reader for an IEEE 802.15.4 frame that still carries its 2-octet Frame
/// Check Sequence.
#[derive(Debug)]
pub struct FrameWithFcs<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> FrameWithFcs<T> {
    /// Create a new [`FrameWithFcs`] from a given buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer can not hold an FCS or if the FCS does
    /// not match the content.
    pub fn new(buffer: T) -> Result<Self> {
        let frame = Self::new_unchecked(buffer);

        if frame.buffer.as_ref().len() < 2 || !frame.check_fcs() {
            return Err(Error);
        }

        Ok(frame)
    }

    /// Create a new [`FrameWithFcs`] from a given buffer without checking the
    /// FCS.
    pub fn new_unchecked(buffer: T) -> Self {
        Self { buffer }
    }

    /// Calculate the FCS over the content of the frame.
    pub fn calculate_fcs(&self) -> u16 {
        crc::Crc::<u16>::new(&CRC_16_IEEE802154).checksum(self.content())
    }

    /// Returns `true` when the FCS matches the content.
    pub fn check_fcs(&self) -> bool {
        self.calculate_fcs() == self.fcs()
    }

    /// Return the content of the frame, excluding the FCS.
    pub fn content(&self) -> &[u8] {
        let data = self.buffer.as_ref();
        &data[..data.len() - 2]
    }

    /// Return the FCS.
    pub fn fcs(&self) -> u16 {
        let data = self.buffer.as_ref();
        let len = data.len();
        u16::from_le_bytes([data[len - 2], data[len - 1]])
    }

    /// Parse the content of the frame as received over the air.
    pub fn frame(&self) -> Result<Frame<&'_ [u8]>> {
        Frame::new_received(self.content())
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> FrameWithFcs<T> {
    /// Compute the FCS over the content and write it in the last two octets.
    pub fn fill_fcs(&mut self) {
        let fcs = self.calculate_fcs();
        let data = self.buffer.as_mut();
        let len = data.len();
        data[len - 2..].copy_from_slice(&fcs.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_fcs() {
        let frame = [
            0x02, 0x2e, 0x8d, 0xcd, 0xab, 0x02, 0x00, 0x02, 0x00, 0x02, 0x00, 0x02, 0x00, 0x02,
            0x0f, 0x00, 0x00, 0x7d, 0xd4,
        ];
        let frame = FrameWithFcs::new(&frame[..]).unwrap();
        assert_eq!(frame.fcs(), 0xd47d);
        assert_eq!(frame.content().len(), 17);
        assert!(frame.frame().is_ok());

        let mut corrupted = [
            0x02, 0x2e, 0x8d, 0xcd, 0xab, 0x02, 0x00, 0x02, 0x00, 0x02, 0x00, 0x02, 0x00, 0x02,
            0x0f, 0x00, 0x01, 0x7d, 0xd4,
        ];
        assert!(FrameWithFcs::new(&corrupted[..]).is_err());

        let mut frame = FrameWithFcs::new_unchecked(&mut corrupted[..]);
        frame.fill_fcs();
        assert!(frame.check_fcs());
    }

    #[test]
    fn too_short() {
        assert!(FrameWithFcs::new(&[0x00][..]).is_err());
        // An empty frame has an FCS of 0.
        assert!(FrameWithFcs::new(&[0x00, 0x00][..]).is_ok());
    }
}
