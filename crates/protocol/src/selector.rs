//! Protocol selector installed into the transport handshake.

use std::sync::Arc;
use std::task::{Context, Poll};

use logging::{trace_fallback, trace_select};

use crate::name::ProtocolName;
use crate::outcome::{Decision, NegotiationOutcome, OutcomeCell};
use crate::priority::ProtocolPriorityList;

/// Callbacks the negotiation extension invokes during the handshake.
///
/// Implementations must be cheap and non-blocking: they run inside the
/// transport's handshake processing.
pub trait NextProtocolProvider {
    /// Whether this endpoint participates in protocol negotiation at all.
    fn supports(&self) -> bool;

    /// The peer does not support the negotiation extension.
    fn unsupported(&self);

    /// Chooses a protocol from the names the peer offered.
    ///
    /// Returns the name to announce back to the peer. When no modern protocol
    /// matches, the fallback protocol name is returned.
    fn select_protocol(&self, offered: &[&str]) -> ProtocolName;
}

/// Priority-driven [`NextProtocolProvider`] that records its decision in a
/// shared [`OutcomeCell`].
///
/// Clones share the same cell, so the extension can own one clone while the
/// engine keeps a [`SelectionHandle`].
#[derive(Clone, Debug)]
pub struct ProtocolSelector {
    priority: Arc<ProtocolPriorityList>,
    cell: Arc<OutcomeCell>,
}

impl ProtocolSelector {
    /// Creates an undecided selector for `priority`.
    #[must_use]
    pub fn new(priority: ProtocolPriorityList) -> Self {
        Self::with_shared(Arc::new(priority))
    }

    /// Creates an undecided selector that shares an existing priority list.
    #[must_use]
    pub fn with_shared(priority: Arc<ProtocolPriorityList>) -> Self {
        Self {
            priority,
            cell: Arc::new(OutcomeCell::new()),
        }
    }

    /// The priority list driving selection.
    #[must_use]
    pub fn priority(&self) -> &ProtocolPriorityList {
        &self.priority
    }

    /// Snapshot of the current outcome.
    #[must_use]
    pub fn outcome(&self) -> NegotiationOutcome {
        self.cell.outcome()
    }

    /// Read-only view of the outcome for the engine.
    #[must_use]
    pub fn handle(&self) -> SelectionHandle {
        SelectionHandle {
            cell: Arc::clone(&self.cell),
        }
    }

    fn announced_name(&self, decision: &Decision) -> ProtocolName {
        match decision {
            Decision::Protocol(name) => name.clone(),
            Decision::Fallback => self.priority.fallback().clone(),
        }
    }
}

impl NextProtocolProvider for ProtocolSelector {
    fn supports(&self) -> bool {
        true
    }

    fn unsupported(&self) {
        let effective = self.cell.decide(Decision::Fallback);
        if *effective == Decision::Fallback {
            trace_fallback!("peer does not support protocol negotiation");
        }
    }

    fn select_protocol(&self, offered: &[&str]) -> ProtocolName {
        trace_select!("peer offered {:?}", offered);

        if let Some(existing) = self.cell.decision() {
            return self.announced_name(existing);
        }

        let decision = self
            .priority
            .select(offered)
            .map_or(Decision::Fallback, |name| Decision::Protocol(name.clone()));
        let effective = self.cell.decide(decision);
        let announced = self.announced_name(effective);

        trace_select!("selected {}", announced);
        announced
    }
}

/// Shared read side of a [`ProtocolSelector`]'s outcome.
#[derive(Clone, Debug)]
pub struct SelectionHandle {
    cell: Arc<OutcomeCell>,
}

impl SelectionHandle {
    /// Snapshot of the current outcome.
    #[must_use]
    pub fn outcome(&self) -> NegotiationOutcome {
        self.cell.outcome()
    }

    /// Reports whether the selector has decided.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        self.cell.is_decided()
    }

    /// Polls for the decision.
    pub fn poll_decision(&self, cx: &mut Context<'_>) -> Poll<Decision> {
        self.cell.poll_decision(cx)
    }

    /// Waits for the decision.
    pub async fn decided(&self) -> Decision {
        self.cell.decided().await
    }
}
