use core::future::{poll_fn, Future};
use core::pin::pin;
use core::task::Poll;

use super::Either;

/// Run 2 futures concurrently and return the output of the first one to
/// complete. The other one is dropped.
///
/// `f1` is polled first, so it wins when both are ready.
pub async fn select<F1: Future, F2: Future>(f1: F1, f2: F2) -> Either<F1::Output, F2::Output> {
    let mut f1 = pin!(f1);
    let mut f2 = pin!(f2);

    poll_fn(|cx| {
        if let Poll::Ready(output) = f1.as_mut().poll(cx) {
            return Poll::Ready(Either::First(output));
        }
        if let Poll::Ready(output) = f2.as_mut().poll(cx) {
            return Poll::Ready(Either::Second(output));
        }
        Poll::Pending
    })
    .await
}
