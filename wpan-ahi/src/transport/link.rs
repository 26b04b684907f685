use core::cell::RefCell;

use critical_section::Mutex;

use super::{dispatch, Clock, EventHandler};
use crate::ahi::{Assembler, AssemblerStats, Event, EventCode, Message, ResponseToken};
use crate::sync::Signal;
use crate::{Error, Result};

/// Counters of the receive side.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Counters of the byte stream.
    pub stream: AssemblerStats,
    /// Messages completing the request in flight.
    pub responses: u32,
    /// Messages handed to the event handler.
    pub events: u32,
    /// Responses that arrived after their request gave up.
    pub orphaned: u32,
    /// Events too short for their code.
    pub invalid: u32,
}

struct LinkState {
    assembler: Assembler,
    pending: Option<ResponseToken>,
    ack_security: bool,
    stats: LinkStats,
}

/// What to do with an assembled message, decided while the state is locked.
enum Route {
    Response(Message),
    /// A reset while a request is in flight fails the request and is reported
    /// to the handler as well.
    ResetDuringRequest(Message),
    Event(Message),
}

/// The receive side of the link to the companion core.
///
/// Every method takes `&self`: the link is fed from an interrupt handler
/// while a task waits for responses. The state is only touched inside
/// critical sections, and the event handler is called outside of them.
pub struct Link<H: EventHandler, C: Clock> {
    state: Mutex<RefCell<LinkState>>,
    response: Signal<Result<Message>>,
    handler: H,
    clock: C,
}

impl<H: EventHandler, C: Clock> Link<H, C> {
    /// Create a link reporting events to `handler`, timestamped with `clock`.
    pub fn new(handler: H, clock: C) -> Self {
        Self {
            state: Mutex::new(RefCell::new(LinkState {
                assembler: Assembler::new(),
                pending: None,
                ack_security: false,
                stats: LinkStats::default(),
            })),
            response: Signal::new(),
            handler,
            clock,
        }
    }

    /// Feed one byte received from the companion core.
    pub fn on_byte_received(&self, byte: u8) {
        let route = critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let message = state.assembler.push(byte)?;
            Some(state.route(message))
        });

        match route {
            None => {}
            Some(Route::Response(message)) => {
                self.response.signal(Ok(message));
            }
            Some(Route::ResetDuringRequest(message)) => {
                warn!("ahi: companion core reset during a request");
                self.response.signal(Err(Error::DeviceReset));
                self.deliver(&message);
            }
            Some(Route::Event(message)) => self.deliver(&message),
        }
    }

    /// Feed bytes received from the companion core.
    pub fn on_bytes_received(&self, bytes: &[u8]) {
        for byte in bytes {
            self.on_byte_received(*byte);
        }
    }

    fn deliver(&self, message: &Message) {
        let ack_security = critical_section::with(|cs| self.state.borrow_ref(cs).ack_security);
        match Event::parse(message, ack_security, self.clock.now()) {
            Ok(event) => {
                if let Event::Unsolicited(token) = event {
                    debug!("ahi: unsolicited message {} {}", token.msg, token.event);
                }
                dispatch(&self.handler, &event);
            }
            Err(_) => {
                warn!("ahi: invalid event {}", message.rsp_event());
                critical_section::with(|cs| {
                    let mut state = self.state.borrow_ref_mut(cs);
                    state.stats.invalid = state.stats.invalid.wrapping_add(1);
                });
            }
        }
    }

    /// Wait for messages matching `token`. Replaces the previous token, and
    /// drops a response that nobody received.
    pub(crate) fn expect(&self, token: ResponseToken) {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).pending = Some(token));
        self.response.reset();
    }

    /// Stop waiting. A response arriving later is reported as unsolicited.
    pub(crate) fn abandon(&self) {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).pending = None);
    }

    /// Wait for the response to the expected token.
    pub(crate) async fn response(&self) -> Result<Message> {
        self.response.wait().await
    }

    /// Tell whether the firmware reports the security of the ACKs it sends.
    pub fn set_ack_security(&self, supported: bool) {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).ack_security = supported);
    }

    /// Returns `true` when a request waits for its response.
    pub fn is_pending(&self) -> bool {
        critical_section::with(|cs| self.state.borrow_ref(cs).pending.is_some())
    }

    /// Return the counters.
    pub fn stats(&self) -> LinkStats {
        critical_section::with(|cs| {
            let state = self.state.borrow_ref(cs);
            LinkStats {
                stream: state.assembler.stats(),
                ..state.stats
            }
        })
    }

    /// Return the event handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl LinkState {
    fn route(&mut self, message: Message) -> Route {
        let token = message.token();

        if self.pending == Some(token) {
            self.pending = None;
            self.stats.responses = self.stats.responses.wrapping_add(1);
            trace!("ahi: response {} {}", token.msg, token.event);
            return Route::Response(message);
        }

        self.stats.events = self.stats.events.wrapping_add(1);
        match EventCode::from(token.event) {
            EventCode::Reset if self.pending.is_some() => {
                self.pending = None;
                Route::ResetDuringRequest(message)
            }
            EventCode::CommandComplete | EventCode::TxDone | EventCode::EdDone => {
                self.stats.orphaned = self.stats.orphaned.wrapping_add(1);
                Route::Event(message)
            }
            _ => Route::Event(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use pollster::FutureExt as _;

    use super::super::test::{FixedClock, Recorder};
    use super::*;
    use crate::ahi::Command;

    fn link() -> Link<Recorder, FixedClock> {
        Link::new(Recorder::default(), FixedClock::default())
    }

    fn message(token: ResponseToken, payload: &[u8]) -> Message {
        let mut message = Message::new(token);
        message.push_bytes(payload).unwrap();
        message
    }

    #[test]
    fn response_completes_request() {
        let link = link();
        let token = Command::VersionGet.response();
        link.expect(token);
        assert!(link.is_pending());

        let reply = message(token, &[0x00, 0x01, 0x00, 0x02, 0x00]);
        link.on_bytes_received(reply.as_bytes());

        assert!(!link.is_pending());
        assert_eq!(link.response().block_on(), Ok(reply));
        assert!(link.handler().take().is_empty());
        assert_eq!(link.stats().responses, 1);
        assert_eq!(link.stats().stream.messages, 1);
    }

    #[test]
    fn events_go_to_the_handler() {
        let link = link();
        link.handler.take();
        link.clock.set(1500);

        let mut frame = Message::new(ResponseToken::new(0, EventCode::FrameReceived.into()));
        frame.push_bytes(&[0x02, 0x02, 0x00]).unwrap();
        frame.push_bytes(&[0; 8]).unwrap();
        frame.push_bytes(&[0xc4, 0xff, 0x00]).unwrap();

        link.on_bytes_received(frame.as_bytes());
        link.on_bytes_received(message(ResponseToken::new(0, 0x0101), &[]).as_bytes());

        assert_eq!(
            link.handler().take(),
            ["frame [02, 00] at 1.500ms", "rx started"]
        );
        assert_eq!(link.stats().events, 2);
    }

    #[test]
    fn late_response_is_orphaned() {
        let link = link();
        let token = Command::RxStart.response();
        link.expect(token);
        link.abandon();

        link.on_bytes_received(message(token, &[0x00]).as_bytes());

        assert!(!link.response.is_signaled());
        assert_eq!(link.handler().take(), ["unsolicited 0040/0000"]);
        assert_eq!(link.stats().orphaned, 1);
    }

    #[test]
    fn reset_fails_request_and_is_reported() {
        let link = link();
        link.expect(Command::VersionGet.response());

        link.on_bytes_received(message(ResponseToken::new(0, 0x0103), &[0x01]).as_bytes());

        assert_eq!(link.response().block_on(), Err(Error::DeviceReset));
        assert_eq!(link.handler().take(), ["reset Watchdog"]);
        assert!(!link.is_pending());

        // Without a request in flight, only the handler hears about it.
        link.on_bytes_received(message(ResponseToken::new(0, 0x0103), &[0x00]).as_bytes());
        assert!(!link.response.is_signaled());
        assert_eq!(link.handler().take(), ["reset PowerOn"]);
    }

    #[test]
    fn invalid_event_is_counted() {
        let link = link();
        link.on_bytes_received(message(ResponseToken::new(0, 0x0100), &[0x05]).as_bytes());
        assert!(link.handler().take().is_empty());
        assert_eq!(link.stats().invalid, 1);
    }

    #[test]
    fn expect_drops_stale_response() {
        let link = link();
        let token = Command::RxStop.response();
        link.expect(token);
        link.on_bytes_received(message(token, &[0x00]).as_bytes());
        assert!(link.response.is_signaled());

        link.expect(token);
        assert!(!link.response.is_signaled());
    }
}
