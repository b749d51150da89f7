//! Shared negotiation outcome.
//!
//! The selector writes the outcome from inside the handshake callback, while
//! the handoff engine reads it on every readiness event. The two sides may run
//! on different threads, so the decision lives in a [`OnceLock`]: it is
//! written at most once, never reverted, and readable without locking.
//! An async driver can additionally park a [`Waker`] that is woken when the
//! decision lands.

use std::future::poll_fn;
use std::sync::{Mutex, OnceLock, PoisonError};
use std::task::{Context, Poll, Waker};

use crate::name::ProtocolName;

/// Observable negotiation state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NegotiationOutcome {
    /// The extension has not reported a selection yet.
    Undecided,
    /// A modern protocol was agreed.
    Protocol(ProtocolName),
    /// The peer does not support negotiation or offered nothing we accept.
    Fallback,
}

impl NegotiationOutcome {
    /// Reports whether the outcome has left [`NegotiationOutcome::Undecided`].
    #[must_use]
    pub const fn is_decided(&self) -> bool {
        !matches!(self, Self::Undecided)
    }

    /// Returns the agreed modern protocol, if any.
    #[must_use]
    pub const fn protocol(&self) -> Option<&ProtocolName> {
        match self {
            Self::Protocol(name) => Some(name),
            _ => None,
        }
    }
}

/// A settled outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// A modern protocol was agreed.
    Protocol(ProtocolName),
    /// Use the legacy fallback protocol.
    Fallback,
}

impl From<Decision> for NegotiationOutcome {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Protocol(name) => Self::Protocol(name),
            Decision::Fallback => Self::Fallback,
        }
    }
}

/// Write-once cell holding the negotiation decision.
#[derive(Debug, Default)]
pub struct OutcomeCell {
    decision: OnceLock<Decision>,
    waiter: Mutex<Option<Waker>>,
}

impl OutcomeCell {
    /// Creates an undecided cell.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            decision: OnceLock::new(),
            waiter: Mutex::new(None),
        }
    }

    /// Records `decision` unless one is already stored.
    ///
    /// Returns the decision that is in effect afterwards, which is the
    /// earlier one when the cell was already decided.
    pub fn decide(&self, decision: Decision) -> &Decision {
        let mut stored = false;
        let effective = self.decision.get_or_init(|| {
            stored = true;
            decision
        });

        if stored {
            let waker = self
                .waiter
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(waker) = waker {
                waker.wake();
            }
        }

        effective
    }

    /// Returns the stored decision, if any.
    #[must_use]
    pub fn decision(&self) -> Option<&Decision> {
        self.decision.get()
    }

    /// Returns a snapshot of the current outcome.
    #[must_use]
    pub fn outcome(&self) -> NegotiationOutcome {
        self.decision
            .get()
            .map_or(NegotiationOutcome::Undecided, |decision| {
                decision.clone().into()
            })
    }

    /// Reports whether a decision has been stored.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        self.decision.get().is_some()
    }

    /// Polls for the decision, registering `cx`'s waker while undecided.
    ///
    /// Only the most recently registered waker is retained.
    pub fn poll_decision(&self, cx: &mut Context<'_>) -> Poll<Decision> {
        if let Some(decision) = self.decision.get() {
            return Poll::Ready(decision.clone());
        }

        *self.waiter.lock().unwrap_or_else(PoisonError::into_inner) = Some(cx.waker().clone());

        // Re-check after registering so a decision stored in between is not missed.
        match self.decision.get() {
            Some(decision) => Poll::Ready(decision.clone()),
            None => Poll::Pending,
        }
    }

    /// Waits until a decision is stored.
    pub async fn decided(&self) -> Decision {
        poll_fn(|cx| self.poll_decision(cx)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::Wake;

    struct CountingWaker(AtomicUsize);

    impl Wake for CountingWaker {
        fn wake(self: Arc<Self>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn new_cell_is_undecided() {
        let cell = OutcomeCell::new();
        assert_eq!(cell.outcome(), NegotiationOutcome::Undecided);
        assert!(!cell.is_decided());
        assert!(cell.decision().is_none());
    }

    #[test]
    fn first_decision_sticks() {
        let cell = OutcomeCell::new();
        cell.decide(Decision::Protocol(ProtocolName::SPDY_3));
        let effective = cell.decide(Decision::Fallback);

        assert_eq!(effective, &Decision::Protocol(ProtocolName::SPDY_3));
        assert_eq!(
            cell.outcome(),
            NegotiationOutcome::Protocol(ProtocolName::SPDY_3)
        );
    }

    #[test]
    fn decide_wakes_registered_waiter_once() {
        let cell = OutcomeCell::new();
        let counter = Arc::new(CountingWaker(AtomicUsize::new(0)));
        let waker = Waker::from(Arc::clone(&counter));
        let mut cx = Context::from_waker(&waker);

        assert!(cell.poll_decision(&mut cx).is_pending());

        cell.decide(Decision::Fallback);
        cell.decide(Decision::Protocol(ProtocolName::SPDY_3_1));

        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert_eq!(cell.poll_decision(&mut cx), Poll::Ready(Decision::Fallback));
    }

    #[test]
    fn decision_is_visible_across_threads() {
        let cell = Arc::new(OutcomeCell::new());
        let writer = Arc::clone(&cell);

        std::thread::spawn(move || {
            writer.decide(Decision::Protocol(ProtocolName::SPDY_3_1));
        })
        .join()
        .unwrap();

        assert_eq!(
            cell.outcome().protocol(),
            Some(&ProtocolName::SPDY_3_1)
        );
    }

    #[tokio::test]
    async fn decided_resolves_after_decision() {
        let cell = Arc::new(OutcomeCell::new());
        let writer = Arc::clone(&cell);

        let waiter = tokio::spawn(async move { cell.decided().await });
        tokio::task::yield_now().await;
        writer.decide(Decision::Fallback);

        assert_eq!(waiter.await.unwrap(), Decision::Fallback);
    }
}
