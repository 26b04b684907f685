//! Messages the companion core sends without being asked, and the completion
//! events of long running commands.

use wpan_frame::MAX_FRAME_LEN;

use super::message::{Message, Reader, ResponseToken};
use crate::time::Instant;
use crate::{Error, Result};

/// The `rsp_event` field of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventCode {
    /// Completion of a command.
    CommandComplete,
    /// A frame was received.
    FrameReceived,
    /// The receiver was turned on.
    RxStarted,
    /// The receiver was turned off, or a receive slot ended.
    RxStopped,
    /// The companion core reset.
    Reset,
    /// The companion core detected an error, such as a loss of
    /// synchronization with the host.
    Error,
    /// The frame counter of the companion core is exhausted.
    CounterOverflow,
    /// Completion of a transmission.
    TxDone,
    /// Completion of an energy detection.
    EdDone,
    /// Any other value.
    Unknown(u16),
}

impl From<u16> for EventCode {
    fn from(value: u16) -> Self {
        match value {
            0x0000 => Self::CommandComplete,
            0x0100 => Self::FrameReceived,
            0x0101 => Self::RxStarted,
            0x0102 => Self::RxStopped,
            0x0103 => Self::Reset,
            0x0104 => Self::Error,
            0x0105 => Self::CounterOverflow,
            0x0110 => Self::TxDone,
            0x0111 => Self::EdDone,
            value => Self::Unknown(value),
        }
    }
}

impl From<EventCode> for u16 {
    fn from(value: EventCode) -> Self {
        match value {
            EventCode::CommandComplete => 0x0000,
            EventCode::FrameReceived => 0x0100,
            EventCode::RxStarted => 0x0101,
            EventCode::RxStopped => 0x0102,
            EventCode::Reset => 0x0103,
            EventCode::Error => 0x0104,
            EventCode::CounterOverflow => 0x0105,
            EventCode::TxDone => 0x0110,
            EventCode::EdDone => 0x0111,
            EventCode::Unknown(value) => value,
        }
    }
}

/// Why the companion core reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetReason {
    /// Power on.
    PowerOn,
    /// Watchdog expiry.
    Watchdog,
    /// Requested, by the host or the firmware.
    Software,
    /// Any other value.
    Unknown(u8),
}

impl From<u8> for ResetReason {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::PowerOn,
            1 => Self::Watchdog,
            2 => Self::Software,
            value => Self::Unknown(value),
        }
    }
}

/// Error reported by the companion core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoreError {
    /// The companion core lost the synchronization of the byte stream.
    OutOfSync,
    /// A received message did not fit the buffers of the companion core.
    BufferOverflow,
    /// Any other value.
    Unknown(u8),
}

impl From<u8> for CoreError {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::OutOfSync,
            1 => Self::BufferOverflow,
            value => Self::Unknown(value),
        }
    }
}

/// Security of the enhanced ACK the companion core sent in reply to a
/// received frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AckSecurity {
    /// The firmware does not report it.
    Unsupported,
    /// No ACK was sent, or it was not secured.
    Unsecured,
    /// The ACK was secured.
    Secured {
        /// Frame counter used for the ACK.
        frame_counter: u32,
        /// Index of the key used for the ACK.
        key_index: u8,
    },
}

/// A frame received by the companion core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReceived<'a> {
    /// The frame, without FCS.
    pub psdu: &'a [u8],
    /// End of reception, on the clock of the companion core.
    pub timestamp: u64,
    /// Received signal strength, in dBm.
    pub rssi: i8,
    /// Link quality indicator.
    pub lqi: u8,
    /// The ACK sent in reply had the frame pending bit set.
    pub frame_pending: bool,
    /// Security of the ACK sent in reply.
    pub ack: AckSecurity,
    /// When the host finished receiving the event.
    pub host_time: Instant,
}

mod flags {
    pub const FRAME_PENDING: u8 = 0b01;
    pub const ACK_SECURED: u8 = 0b10;
}

impl<'a> FrameReceived<'a> {
    fn parse(reader: &mut Reader<'a>, ack_security: bool, host_time: Instant) -> Result<Self> {
        let len = reader.u8()? as usize;
        if len > MAX_FRAME_LEN {
            return Err(Error::InvalidMessage);
        }
        let psdu = reader.bytes(len)?;
        let timestamp = reader.u64()?;
        let rssi = reader.i8()?;
        let lqi = reader.u8()?;
        let bits = reader.u8()?;

        // Older firmware stops here.
        let ack = if ack_security && reader.remaining().len() >= 5 {
            let frame_counter = reader.u32()?;
            let key_index = reader.u8()?;
            if bits & flags::ACK_SECURED != 0 {
                AckSecurity::Secured {
                    frame_counter,
                    key_index,
                }
            } else {
                AckSecurity::Unsecured
            }
        } else {
            AckSecurity::Unsupported
        };

        Ok(Self {
            psdu,
            timestamp,
            rssi,
            lqi,
            frame_pending: bits & flags::FRAME_PENDING != 0,
            ack,
            host_time,
        })
    }
}

/// A message that is not the response to the request in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    /// A frame was received.
    FrameReceived(FrameReceived<'a>),
    /// The receiver was turned on.
    RxStarted,
    /// The receiver was turned off, or a receive slot ended.
    RxStopped,
    /// The companion core reset.
    Reset(ResetReason),
    /// The companion core reported an error.
    Error(CoreError),
    /// The frame counter of the companion core is exhausted.
    CounterOverflow,
    /// A response nobody waits for anymore, or an unknown event.
    Unsolicited(ResponseToken),
}

impl<'a> Event<'a> {
    /// Decode an event.
    ///
    /// `ack_security` tells whether the firmware reports the security of the
    /// ACKs it sends, `host_time` is when the message was received.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMessage`] if the payload is too short for the
    /// event.
    pub fn parse(message: &'a Message, ack_security: bool, host_time: Instant) -> Result<Self> {
        let mut reader = message.reader();
        Ok(match EventCode::from(message.rsp_event()) {
            EventCode::FrameReceived => Event::FrameReceived(FrameReceived::parse(
                &mut reader,
                ack_security,
                host_time,
            )?),
            EventCode::RxStarted => Event::RxStarted,
            EventCode::RxStopped => Event::RxStopped,
            EventCode::Reset => Event::Reset(ResetReason::from(reader.u8().unwrap_or(0))),
            EventCode::Error => Event::Error(CoreError::from(reader.u8()?)),
            EventCode::CounterOverflow => Event::CounterOverflow,
            EventCode::CommandComplete
            | EventCode::TxDone
            | EventCode::EdDone
            | EventCode::Unknown(_) => Event::Unsolicited(message.token()),
        })
    }
}

/// The outcome of a transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxDone {
    /// The enhanced or immediate ACK received, without FCS. Empty when the
    /// frame did not request one.
    pub ack: heapless::Vec<u8, MAX_FRAME_LEN>,
}

impl TxDone {
    /// Decode the payload following the status of a [`EventCode::TxDone`]
    /// completion.
    pub fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let ack = if reader.is_empty() {
            heapless::Vec::new()
        } else {
            let len = reader.u8()? as usize;
            heapless::Vec::from_slice(reader.bytes(len)?).map_err(|_| Error::InvalidMessage)?
        };
        Ok(Self { ack })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_received(trailer: &[u8]) -> Message {
        let mut message = Message::new(ResponseToken::new(0, 0x0100));
        message.push_u8(3).unwrap();
        message.push_bytes(&[0x02, 0x10, 0x2a]).unwrap();
        message.push_bytes(&1_000_000u64.to_le_bytes()).unwrap();
        message.push_u8(-60i8 as u8).unwrap();
        message.push_u8(200).unwrap();
        message.push_bytes(trailer).unwrap();
        message
    }

    #[test]
    fn frame_received_legacy() {
        let message = frame_received(&[0b01]);
        let event = Event::parse(&message, true, Instant::from_us(42)).unwrap();
        assert_eq!(
            event,
            Event::FrameReceived(FrameReceived {
                psdu: &[0x02, 0x10, 0x2a],
                timestamp: 1_000_000,
                rssi: -60,
                lqi: 200,
                frame_pending: true,
                ack: AckSecurity::Unsupported,
                host_time: Instant::from_us(42),
            })
        );
    }

    #[test]
    fn frame_received_ack_security() {
        let message = frame_received(&[0b10, 0x04, 0x03, 0x02, 0x01, 0x07]);

        let Event::FrameReceived(frame) = Event::parse(&message, true, Instant::default()).unwrap()
        else {
            panic!("not a frame");
        };
        assert!(!frame.frame_pending);
        assert_eq!(
            frame.ack,
            AckSecurity::Secured {
                frame_counter: 0x0102_0304,
                key_index: 7
            }
        );

        // Fields present, but the firmware is too old to fill them in.
        let Event::FrameReceived(frame) = Event::parse(&message, false, Instant::default()).unwrap()
        else {
            panic!("not a frame");
        };
        assert_eq!(frame.ack, AckSecurity::Unsupported);

        let message = frame_received(&[0b00, 0, 0, 0, 0, 0]);
        let Event::FrameReceived(frame) = Event::parse(&message, true, Instant::default()).unwrap()
        else {
            panic!("not a frame");
        };
        assert_eq!(frame.ack, AckSecurity::Unsecured);
    }

    #[test]
    fn truncated_frame_received() {
        let mut message = Message::new(ResponseToken::new(0, 0x0100));
        message.push_bytes(&[0x05, 0x02, 0x10]).unwrap();
        assert_eq!(
            Event::parse(&message, true, Instant::default()),
            Err(Error::InvalidMessage)
        );
    }

    #[test]
    fn other_events() {
        let mut message = Message::new(ResponseToken::new(0, 0x0103));
        message.push_u8(1).unwrap();
        assert_eq!(
            Event::parse(&message, true, Instant::default()),
            Ok(Event::Reset(ResetReason::Watchdog))
        );

        let mut message = Message::new(ResponseToken::new(0, 0x0104));
        message.push_u8(0).unwrap();
        assert_eq!(
            Event::parse(&message, true, Instant::default()),
            Ok(Event::Error(CoreError::OutOfSync))
        );

        let message = Message::new(ResponseToken::new(0x0043, 0x0110));
        assert_eq!(
            Event::parse(&message, true, Instant::default()),
            Ok(Event::Unsolicited(ResponseToken::new(0x0043, 0x0110)))
        );
    }

    #[test]
    fn tx_done() {
        let mut message = Message::new(ResponseToken::new(0x0043, 0x0110));
        message.push_bytes(&[0x00, 0x03, 0x02, 0x00, 0x2a]).unwrap();
        let mut reader = crate::ahi::completion(&message).unwrap();
        let done = TxDone::parse(&mut reader).unwrap();
        assert_eq!(&done.ack[..], &[0x02, 0x00, 0x2a]);

        let mut reader = Reader::new(&[]);
        assert!(TxDone::parse(&mut reader).unwrap().ack.is_empty());
    }
}
