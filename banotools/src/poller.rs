//! A cancellable scheduled-retry primitive.
//!
//! Checkout uses this to watch an order while the payment widget is open, but nothing here knows about orders. Each
//! tick evaluates the supplied closure; a `Some` ends the poll with [`PollOutcome::Confirmed`], and after
//! `max_attempts` ticks without one the poll gives up with [`PollOutcome::TimedOut`]. The caller decides what a
//! timeout means; checkout treats it as optimistic success.
use std::{future::Future, time::Duration};

use log::trace;
use tokio::sync::watch;

/// How checkout polls: every 3 seconds, for a minute.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const MAX_POLL_ATTEMPTS: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The closure produced a value on some attempt.
    Confirmed(T),
    /// All attempts were used up without a value.
    TimedOut,
    /// The handle was cancelled while waiting between attempts.
    Cancelled,
}

/// Cancels an in-flight [`poll_until`] from another task.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// The receiving half a poll waits on.
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Resolves once the matching handle cancels. Never resolves if the handle is dropped un-cancelled.
    async fn cancelled(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Evaluates `f` up to `max_attempts` times, `interval` apart. The attempt number (1-based) is passed to the
/// closure. There is no delay before the first attempt, and none after the last.
pub async fn poll_until<F, Fut, T>(
    interval: Duration,
    max_attempts: u32,
    mut cancel: CancelToken,
    mut f: F,
) -> PollOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for attempt in 1..=max_attempts {
        trace!("⏱️ Poll attempt {attempt} of {max_attempts}");
        if let Some(value) = f(attempt).await {
            return PollOutcome::Confirmed(value);
        }
        if attempt == max_attempts {
            break;
        }
        tokio::select! {
            _ = tokio::time::sleep(interval) => {},
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
        }
    }
    PollOutcome::TimedOut
}

#[cfg(test)]
mod test {
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    };

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_exactly_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let (_handle, token) = cancel_pair();
        let outcome: PollOutcome<()> = poll_until(POLL_INTERVAL, MAX_POLL_ATTEMPTS, token, move |_| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                None
            }
        })
        .await;
        assert_eq!(outcome, PollOutcome::TimedOut);
        assert_eq!(calls.load(Ordering::SeqCst), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn confirms_as_soon_as_the_closure_produces() {
        let (_handle, token) = cancel_pair();
        let outcome = poll_until(POLL_INTERVAL, MAX_POLL_ATTEMPTS, token, |attempt| async move {
            (attempt == 3).then_some("done")
        })
        .await;
        assert_eq!(outcome, PollOutcome::Confirmed("done"));
    }

    #[tokio::test(start_paused = true)]
    async fn first_attempt_happens_immediately() {
        let (_handle, token) = cancel_pair();
        let start = tokio::time::Instant::now();
        let outcome = poll_until(POLL_INTERVAL, MAX_POLL_ATTEMPTS, token, |_| async { Some(()) }).await;
        assert_eq!(outcome, PollOutcome::Confirmed(()));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_the_handle_stops_the_poll() {
        let (handle, token) = cancel_pair();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(7)).await;
            handle.cancel();
        });
        let outcome: PollOutcome<()> = poll_until(POLL_INTERVAL, MAX_POLL_ATTEMPTS, token, |_| async { None }).await;
        assert_eq!(outcome, PollOutcome::Cancelled);
    }
}
