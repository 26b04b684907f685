use core::future::poll_fn;
use core::task::Poll;

/// Make the current task yield once, so that other futures of the task get
/// the opportunity to make progress.
pub async fn yield_now() {
    let mut has_yielded = false;
    poll_fn(move |cx| {
        if has_yielded {
            Poll::Ready(())
        } else {
            cx.waker().wake_by_ref();
            has_yielded = true;
            Poll::Pending
        }
    })
    .await
}
