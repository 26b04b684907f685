//! A single-slot signal. Signalling never blocks and overwrites a value that
//! was not received yet. Both sides may run in different contexts (a task and
//! an interrupt handler): every access to the slot happens inside a critical
//! section.
use core::cell::RefCell;
use core::future::poll_fn;
use core::task::{Poll, Waker};

use critical_section::Mutex;

struct SignalState<T> {
    value: Option<T>,
    waker: Option<Waker>,
}

/// A single-slot signal.
pub struct Signal<T> {
    state: Mutex<RefCell<SignalState<T>>>,
}

impl<T> Signal<T> {
    /// Create an empty signal.
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(SignalState {
                value: None,
                waker: None,
            })),
        }
    }

    /// Store `value` and wake the receiver. Returns `true` when a value that
    /// was not received yet got overwritten.
    pub fn signal(&self, value: T) -> bool {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let replaced = state.value.replace(value).is_some();
            if let Some(waker) = state.waker.take() {
                waker.wake();
            }
            replaced
        })
    }

    /// Drop the value, if any.
    pub fn reset(&self) {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).value = None);
    }

    /// Take the value without waiting.
    pub fn try_take(&self) -> Option<T> {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).value.take())
    }

    /// Returns `true` when a value is waiting to be received.
    pub fn is_signaled(&self) -> bool {
        critical_section::with(|cs| self.state.borrow_ref(cs).value.is_some())
    }

    /// Wait for a value.
    pub async fn wait(&self) -> T {
        poll_fn(|cx| {
            critical_section::with(|cs| {
                let mut state = self.state.borrow_ref_mut(cs);
                match state.value.take() {
                    Some(value) => Poll::Ready(value),
                    None => {
                        match &mut state.waker {
                            Some(waker) => waker.clone_from(cx.waker()),
                            waker @ None => *waker = Some(cx.waker().clone()),
                        }
                        Poll::Pending
                    }
                }
            })
        })
        .await
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}
