//! A handful of executor independent synchronization primitives.
//!
//! [`Mutex`] serializes futures of any task or thread, and [`Signal`] is safe
//! to use from an interrupt handler: both keep their state in a critical
//! section. The combinators drive futures within one task.
mod join;
mod mutex;
mod select;
mod signal;
mod yield_now;

pub use join::join;
pub use mutex::{Mutex, MutexGuard};
pub use select::select;
pub use signal::Signal;
pub use yield_now::yield_now;

use core::future::Future;

use embedded_hal_async::delay::DelayNs;

use crate::time::Duration;

/// Type representing 2 possible outcomes/states
#[derive(Debug, PartialEq, Eq)]
pub enum Either<T, S> {
    /// The first outcome.
    First(T),
    /// The second outcome.
    Second(S),
}

impl<T, S> Either<T, S> {
    /// Returns `true` for [`Either::First`].
    pub fn is_first(&self) -> bool {
        matches!(self, Either::First(_))
    }

    /// Returns `true` for [`Either::Second`].
    pub fn is_second(&self) -> bool {
        matches!(self, Either::Second(_))
    }
}

/// The deadline of [`with_timeout`] passed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedOut;

/// Run `future` until it completes or `timeout` expires, whichever happens
/// first. The future is dropped on timeout.
pub async fn with_timeout<D, F>(
    delay: &mut D,
    timeout: Duration,
    future: F,
) -> Result<F::Output, TimedOut>
where
    D: DelayNs,
    F: Future,
{
    match select(future, delay.delay_us(timeout.as_us_u32())).await {
        Either::First(output) => Ok(output),
        Either::Second(()) => Err(TimedOut),
    }
}
