//! Request/response correlation over a byte stream.
//!
//! The [`Link`] is the receive side: it is fed byte by byte, typically from
//! the UART receive interrupt, reassembles messages, completes the request in
//! flight, and hands every other message to an [`EventHandler`]. The
//! [`Correlator`] is the send side: it serializes callers so that a single
//! request is ever in flight, sends it, and waits for its response with a
//! timeout.
//!
//! ```ignore
//! let link = Link::new(handler, clock);
//! // In the UART receive interrupt:
//! link.on_byte_received(byte);
//! // In a task:
//! let correlator = Correlator::new(&link, uart, delay, Config::default());
//! correlator.set_pan_id(0xabcd).await?;
//! ```

mod correlator;
pub use correlator::Correlator;

mod link;
pub use link::{Link, LinkStats};

use core::future::Future;

use crate::ahi::{CoreError, Event, FrameReceived, ResetReason, ResponseToken};
use crate::config::MAX_OBSERVERS;
use crate::time::Instant;
use crate::{Error, Result};

/// A byte transport to the companion core.
pub trait Uart {
    /// Error of the underlying driver.
    type Error: core::fmt::Debug;

    /// Write all of `bytes`.
    fn write(&mut self, bytes: &[u8]) -> impl Future<Output = core::result::Result<(), Self::Error>>;
}

/// A monotonic microsecond clock.
pub trait Clock {
    /// Return the current time.
    fn now(&self) -> Instant;
}

/// Receives the messages of the companion core that do not complete a
/// request.
///
/// Every method is called from the context feeding the [`Link`], possibly an
/// interrupt handler: none may block.
pub trait EventHandler {
    /// A frame was received.
    fn frame_received(&self, _frame: &FrameReceived<'_>) {}

    /// The receiver was turned on.
    fn rx_started(&self) {}

    /// The receiver was turned off, or a receive slot ended.
    fn rx_stopped(&self) {}

    /// The companion core reset.
    fn reset(&self, _reason: ResetReason) {}

    /// The companion core reported an error.
    fn core_error(&self, _error: CoreError) {}

    /// The frame counter of the companion core is exhausted.
    fn counter_overflow(&self) {}

    /// A response arrived after its request gave up, or an unknown event
    /// arrived.
    fn unsolicited(&self, _token: ResponseToken) {}
}

impl<T: EventHandler + ?Sized> EventHandler for &T {
    fn frame_received(&self, frame: &FrameReceived<'_>) {
        (**self).frame_received(frame)
    }

    fn rx_started(&self) {
        (**self).rx_started()
    }

    fn rx_stopped(&self) {
        (**self).rx_stopped()
    }

    fn reset(&self, reason: ResetReason) {
        (**self).reset(reason)
    }

    fn core_error(&self, error: CoreError) {
        (**self).core_error(error)
    }

    fn counter_overflow(&self) {
        (**self).counter_overflow()
    }

    fn unsolicited(&self, token: ResponseToken) {
        (**self).unsolicited(token)
    }
}

/// An [`EventHandler`] ignoring every event.
impl EventHandler for () {}

/// Call the method of `handler` matching `event`.
pub fn dispatch<H: EventHandler + ?Sized>(handler: &H, event: &Event<'_>) {
    match event {
        Event::FrameReceived(frame) => handler.frame_received(frame),
        Event::RxStarted => handler.rx_started(),
        Event::RxStopped => handler.rx_stopped(),
        Event::Reset(reason) => handler.reset(*reason),
        Event::Error(error) => handler.core_error(*error),
        Event::CounterOverflow => handler.counter_overflow(),
        Event::Unsolicited(token) => handler.unsolicited(*token),
    }
}

/// Fan an event out to several handlers, in registration order.
pub struct Observers<'a, const N: usize = MAX_OBSERVERS> {
    handlers: heapless::Vec<&'a dyn EventHandler, N>,
}

impl<'a, const N: usize> Observers<'a, N> {
    /// Create an empty list.
    pub const fn new() -> Self {
        Self {
            handlers: heapless::Vec::new(),
        }
    }

    /// Add a handler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMessage`] if the list is full.
    pub fn register(&mut self, handler: &'a dyn EventHandler) -> Result<()> {
        self.handlers
            .push(handler)
            .map_err(|_| Error::InvalidMessage)
    }

    /// Return the number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<const N: usize> Default for Observers<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EventHandler for Observers<'_, N> {
    fn frame_received(&self, frame: &FrameReceived<'_>) {
        self.handlers.iter().for_each(|h| h.frame_received(frame));
    }

    fn rx_started(&self) {
        self.handlers.iter().for_each(|h| h.rx_started());
    }

    fn rx_stopped(&self) {
        self.handlers.iter().for_each(|h| h.rx_stopped());
    }

    fn reset(&self, reason: ResetReason) {
        self.handlers.iter().for_each(|h| h.reset(reason));
    }

    fn core_error(&self, error: CoreError) {
        self.handlers.iter().for_each(|h| h.core_error(error));
    }

    fn counter_overflow(&self) {
        self.handlers.iter().for_each(|h| h.counter_overflow());
    }

    fn unsolicited(&self, token: ResponseToken) {
        self.handlers.iter().for_each(|h| h.unsolicited(token));
    }
}

#[cfg(test)]
pub(crate) mod test {
    //! Test doubles for the transport.

    use core::cell::RefCell;
    use core::sync::atomic::{AtomicU64, Ordering};
    use std::collections::VecDeque;
    use std::string::{String, ToString};
    use std::sync::Mutex;
    use std::vec::Vec;

    use super::*;

    /// A clock standing still.
    #[derive(Default)]
    pub struct FixedClock(pub AtomicU64);

    impl FixedClock {
        pub fn set(&self, us: u64) {
            self.0.store(us, Ordering::Relaxed);
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> Instant {
            Instant::from_us(self.0.load(Ordering::Relaxed))
        }
    }

    /// Records the events it receives as text.
    #[derive(Default)]
    pub struct Recorder {
        pub events: Mutex<Vec<String>>,
    }

    impl Recorder {
        pub fn take(&self) -> Vec<String> {
            core::mem::take(&mut *self.events.lock().unwrap())
        }

        fn record(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl EventHandler for Recorder {
        fn frame_received(&self, frame: &FrameReceived<'_>) {
            self.record(format!("frame {:02x?} at {}", frame.psdu, frame.host_time));
        }

        fn rx_started(&self) {
            self.record("rx started".to_string());
        }

        fn rx_stopped(&self) {
            self.record("rx stopped".to_string());
        }

        fn reset(&self, reason: ResetReason) {
            self.record(format!("reset {reason:?}"));
        }

        fn core_error(&self, error: CoreError) {
            self.record(format!("error {error:?}"));
        }

        fn counter_overflow(&self) {
            self.record("counter overflow".to_string());
        }

        fn unsolicited(&self, token: ResponseToken) {
            self.record(format!("unsolicited {:04x}/{:04x}", token.msg, token.event));
        }
    }

    /// A UART whose peer answers each write with the next scripted reply,
    /// delivered to the link before the write completes.
    pub struct ScriptedUart<'l, H: EventHandler, C: Clock> {
        pub link: &'l Link<H, C>,
        pub replies: &'l RefCell<VecDeque<Vec<u8>>>,
        pub sent: &'l RefCell<Vec<Vec<u8>>>,
    }

    impl<H: EventHandler, C: Clock> Uart for ScriptedUart<'_, H, C> {
        type Error = ();

        async fn write(&mut self, bytes: &[u8]) -> core::result::Result<(), ()> {
            self.sent.borrow_mut().push(bytes.to_vec());
            let reply = self.replies.borrow_mut().pop_front();
            if let Some(reply) = reply {
                self.link.on_bytes_received(&reply);
            }
            Ok(())
        }
    }

    /// A UART that always fails.
    pub struct BrokenUart;

    impl Uart for BrokenUart {
        type Error = ();

        async fn write(&mut self, _bytes: &[u8]) -> core::result::Result<(), ()> {
            Err(())
        }
    }
}
