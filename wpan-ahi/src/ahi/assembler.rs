use super::message::{completeness, Completeness, Message};
use crate::config::MAX_MESSAGE_LEN;

/// Counters of the receive side of the byte stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AssemblerStats {
    /// Messages assembled.
    pub messages: u32,
    /// Times the stream had to be resynchronized.
    pub resyncs: u32,
    /// Bytes discarded while resynchronizing.
    pub dropped_bytes: u32,
}

/// Recover messages from a byte stream, one byte at a time.
///
/// After every byte the buffered prefix is checked. A corrupt prefix is
/// recovered from by discarding its oldest byte until what is left is again
/// the possible start of a message, or nothing is left.
#[derive(Debug, Default)]
pub struct Assembler {
    buffer: heapless::Vec<u8, MAX_MESSAGE_LEN>,
    stats: AssemblerStats,
}

impl Assembler {
    /// Create an empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte. Returns a message when `byte` completes one.
    pub fn push(&mut self, byte: u8) -> Option<Message> {
        if self.buffer.push(byte).is_err() {
            self.discard_oldest();
            self.buffer.push(byte).ok();
        }

        let mut resynchronizing = false;
        loop {
            match completeness(&self.buffer) {
                Completeness::Incomplete => return None,
                Completeness::Valid => {
                    let message = Message::parse(&self.buffer).ok();
                    self.buffer.clear();
                    self.stats.messages = self.stats.messages.wrapping_add(1);
                    trace!(
                        "ahi: message of {} bytes",
                        message.as_ref().map_or(0, |m| m.msg_len())
                    );
                    return message;
                }
                Completeness::Corrupt => {
                    if !resynchronizing {
                        resynchronizing = true;
                        self.stats.resyncs = self.stats.resyncs.wrapping_add(1);
                        warn!("ahi: corrupt stream, resynchronizing");
                    }
                    self.discard_oldest();
                    if self.buffer.is_empty() {
                        return None;
                    }
                }
            }
        }
    }

    fn discard_oldest(&mut self) {
        if !self.buffer.is_empty() {
            self.buffer.remove(0);
            self.stats.dropped_bytes = self.stats.dropped_bytes.wrapping_add(1);
        }
    }

    /// Forget the bytes of a partially received message.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Return the number of buffered bytes.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Return the counters.
    pub fn stats(&self) -> AssemblerStats {
        self.stats
    }
}
