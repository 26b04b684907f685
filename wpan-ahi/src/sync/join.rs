use core::future::{poll_fn, Future};
use core::pin::pin;
use core::task::Poll;

/// Run 2 futures concurrently and return both outputs once both completed.
pub async fn join<F1: Future, F2: Future>(f1: F1, f2: F2) -> (F1::Output, F2::Output) {
    let mut f1 = pin!(f1);
    let mut f2 = pin!(f2);
    let mut out1 = None;
    let mut out2 = None;

    poll_fn(|cx| {
        if out1.is_none() {
            if let Poll::Ready(output) = f1.as_mut().poll(cx) {
                out1 = Some(output);
            }
        }
        if out2.is_none() {
            if let Poll::Ready(output) = f2.as_mut().poll(cx) {
                out2 = Some(output);
            }
        }

        match (out1.take(), out2.take()) {
            (Some(o1), Some(o2)) => Poll::Ready((o1, o2)),
            (o1, o2) => {
                out1 = o1;
                out2 = o2;
                Poll::Pending
            }
        }
    })
    .await
}
