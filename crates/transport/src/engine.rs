//! Negotiation-and-handoff engine.
//!
//! The engine reconciles two independent signals on one connection: the
//! selector callback fired from inside the handshake, and read-readiness
//! events that may already carry application bytes. It is driven by the
//! caller's event loop through [`HandoffEngine::on_readable`] and never
//! blocks.
//!
//! # Decision procedure
//!
//! On every readiness event:
//!
//! 1. If the selector has decided, resolve without reading.
//! 2. Otherwise perform exactly one bounded probe read. Captured bytes are
//!    pushed back into the connection's [`PushbackStream`] so the eventual
//!    owner reads them first.
//! 3. Re-read the outcome, since the selector may have fired meanwhile.
//! 4. Resolve with [`resolve`]: a decided outcome wins; captured bytes with
//!    the outcome still open mean fallback; nothing captured means wait.
//!
//! The completion callback is consumed on the first terminal decision, so
//! success, fallback and failure are each delivered at most once and later
//! events are no-ops.

use std::io;
use std::sync::Arc;

use logging::{trace_deliver, trace_fallback, trace_probe};
use protocol::{Decision, ProtocolSelector, SelectionHandle};

use crate::config::{FallbackPolicy, HandoffConfig};
use crate::connection::{NegotiationExtension, SecureConnection};
use crate::error::HandoffError;
use crate::outcome::{ConnectionOutcome, MultiplexedConnection, ProbeOutcome, Resolution, resolve};
use crate::pool::BufferPool;
use crate::probe::{Probe, probe_once};
use crate::pushback::PushbackStream;

/// Terminal value delivered to the completion callback.
pub type HandoffResult<C> = Result<ConnectionOutcome<C>, HandoffError>;

/// Engine state after an event has been processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStatus {
    /// Waiting for the next readiness event.
    AwaitingEvent,
    /// The result has been delivered; further events are ignored.
    Finished,
}

struct Negotiation<C> {
    stream: PushbackStream<C>,
    selection: SelectionHandle,
}

/// Event-driven negotiation state machine for one connection.
pub struct HandoffEngine<C, F> {
    negotiation: Option<Negotiation<C>>,
    completion: Option<F>,
    config: HandoffConfig,
    pool: Arc<BufferPool>,
}

impl<C, F> HandoffEngine<C, F>
where
    C: SecureConnection,
    F: FnOnce(HandoffResult<C>),
{
    /// Starts negotiating on `connection`.
    ///
    /// Preconditions are checked before any I/O: an invalid configuration or
    /// an unavailable extension completes immediately with an error. If the
    /// extension cannot attach the selector, the connection goes straight to
    /// the fallback path. If the handshake cannot be started the attempt
    /// fails with [`HandoffError::PeerRejectedEncryption`]. Otherwise reads
    /// are resumed and the engine waits for readiness events.
    pub fn begin<E>(mut connection: C, extension: &E, config: HandoffConfig, completion: F) -> Self
    where
        E: NegotiationExtension<C> + ?Sized,
    {
        let pool = Arc::new(config.pool.build());
        let mut engine = Self {
            negotiation: None,
            completion: Some(completion),
            config,
            pool,
        };

        if let Err(err) = engine.config.validate() {
            engine.finish(Err(err.into()));
            return engine;
        }

        if !extension.capability().is_available() {
            tracing::warn!(
                target: logging::TARGET_CONNECT,
                "protocol negotiation extension unavailable; refusing to negotiate"
            );
            engine.finish(Err(HandoffError::CapabilityUnavailable));
            return engine;
        }

        let selector = ProtocolSelector::new(engine.config.priority.clone());
        let selection = selector.handle();

        if let Err(err) = extension.attach(&mut connection, selector) {
            tracing::warn!(
                target: logging::TARGET_FALLBACK,
                "attaching protocol selector failed: {err}"
            );
            let result = hand_off(
                Decision::Fallback,
                PushbackStream::new(connection),
                &engine.pool,
                &engine.config,
            );
            engine.finish(result);
            return engine;
        }

        if let Err(err) = connection.start_handshake() {
            engine.finish(Err(HandoffError::PeerRejectedEncryption(err)));
            return engine;
        }

        let mut stream = PushbackStream::new(connection);
        stream.resume_reads();
        engine.negotiation = Some(Negotiation { stream, selection });
        engine
    }

    /// Handles one read-readiness event.
    pub fn on_readable(&mut self) -> EngineStatus {
        let Some(Negotiation {
            mut stream,
            selection,
        }) = self.negotiation.take()
        else {
            return EngineStatus::Finished;
        };

        let observed = if selection.is_decided() {
            ProbeOutcome::Skipped
        } else {
            match probe_once(stream.inner_mut(), &self.pool, self.config.probe_capacity) {
                Ok(Probe { outcome, bytes }) => {
                    if let Err(err) = stream.push_back(bytes) {
                        stream.suspend_reads();
                        self.finish(Err(HandoffError::Transport(io::Error::other(err))));
                        return EngineStatus::Finished;
                    }
                    outcome
                }
                Err(err) => {
                    stream.suspend_reads();
                    self.finish(Err(HandoffError::Transport(err)));
                    return EngineStatus::Finished;
                }
            }
        };

        let decision = match resolve(&selection.outcome(), observed) {
            Resolution::Wait => {
                self.negotiation = Some(Negotiation { stream, selection });
                return EngineStatus::AwaitingEvent;
            }
            Resolution::Closed => {
                trace_probe!("stream closed before a protocol was selected");
                stream.suspend_reads();
                self.finish(Err(HandoffError::ClosedBeforeSelection));
                return EngineStatus::Finished;
            }
            Resolution::Fallback => Decision::Fallback,
            Resolution::Protocol(name) => Decision::Protocol(name),
        };

        stream.suspend_reads();
        let result = hand_off(decision, stream, &self.pool, &self.config);
        self.finish(result);
        EngineStatus::Finished
    }

    /// Current engine state.
    #[must_use]
    pub fn status(&self) -> EngineStatus {
        if self.completion.is_some() {
            EngineStatus::AwaitingEvent
        } else {
            EngineStatus::Finished
        }
    }

    /// Reports whether the result has been delivered.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status() == EngineStatus::Finished
    }

    /// Creates an engine that has already delivered `error`.
    pub(crate) fn failed(error: HandoffError, config: HandoffConfig, completion: F) -> Self {
        let pool = Arc::new(config.pool.build());
        let mut engine = Self {
            negotiation: None,
            completion: Some(completion),
            config,
            pool,
        };
        engine.finish(Err(error));
        engine
    }

    fn finish(&mut self, result: HandoffResult<C>) {
        self.negotiation = None;
        if let Some(completion) = self.completion.take() {
            completion(result);
        }
    }
}

/// Turns a settled decision into the value handed to the caller.
pub(crate) fn hand_off<C>(
    decision: Decision,
    stream: PushbackStream<C>,
    pool: &Arc<BufferPool>,
    config: &HandoffConfig,
) -> HandoffResult<C> {
    match decision {
        Decision::Protocol(name) => {
            trace_deliver!(
                "handing connection to {} with {} replay bytes",
                name,
                stream.replay_remaining()
            );
            Ok(ConnectionOutcome::Protocol(MultiplexedConnection::new(
                name,
                stream,
                Arc::clone(pool),
            )))
        }
        Decision::Fallback => {
            let fallback = config.priority.fallback();
            match config.fallback_policy {
                FallbackPolicy::Allow => {
                    trace_fallback!(
                        "handing connection to {} with {} replay bytes",
                        fallback,
                        stream.replay_remaining()
                    );
                    Ok(ConnectionOutcome::Fallback(stream))
                }
                FallbackPolicy::Reject => {
                    trace_fallback!("fallback to {} rejected by policy", fallback);
                    Err(HandoffError::ModernProtocolUnsupported {
                        selected: fallback.clone(),
                    })
                }
            }
        }
    }
}
