//! Tokio driver for the negotiation-and-handoff engine.
//!
//! The async driver races the selector decision against a bounded read. The
//! decision branch is polled first, so an outcome reached before the peer's
//! first bytes is never mistaken for a non-negotiating peer.

use std::io;
use std::sync::Arc;

use logging::trace_probe;
use protocol::{Decision, ProtocolSelector};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::config::HandoffConfig;
use crate::connection::NegotiationExtension;
use crate::engine::{HandoffResult, hand_off};
use crate::error::HandoffError;
use crate::outcome::{ProbeOutcome, Resolution, resolve};
use crate::pool::BufferPool;
use crate::pushback::PushbackStream;

enum Event {
    Decided,
    Read(io::Result<usize>),
}

/// Negotiates on an async connection and returns the handoff result.
///
/// The connection's own handshake is expected to be in progress already;
/// `extension` attaches the selector exactly as in the event-driven engine.
pub async fn negotiate_async<C, E>(
    mut connection: C,
    extension: &E,
    config: HandoffConfig,
) -> HandoffResult<C>
where
    C: AsyncRead + Unpin,
    E: NegotiationExtension<C> + ?Sized,
{
    config.validate()?;
    if !extension.capability().is_available() {
        return Err(HandoffError::CapabilityUnavailable);
    }

    let pool = Arc::new(config.pool.build());
    let selector = ProtocolSelector::new(config.priority.clone());
    let selection = selector.handle();

    if let Err(err) = extension.attach(&mut connection, selector) {
        tracing::warn!(
            target: logging::TARGET_FALLBACK,
            "attaching protocol selector failed: {err}"
        );
        return hand_off(
            Decision::Fallback,
            PushbackStream::new(connection),
            &pool,
            &config,
        );
    }

    let mut buffer = BufferPool::acquire(&pool);
    let limit = config.probe_capacity.min(buffer.len());

    loop {
        let event = if selection.is_decided() {
            Event::Decided
        } else {
            tokio::select! {
                biased;
                _ = selection.decided() => Event::Decided,
                read = connection.read(&mut buffer[..limit]) => Event::Read(read),
            }
        };

        let observed = match event {
            Event::Decided => ProbeOutcome::Skipped,
            Event::Read(Ok(0)) => ProbeOutcome::Eof,
            Event::Read(Ok(read)) => {
                trace_probe!("probe captured {} bytes", read);
                ProbeOutcome::Captured(read)
            }
            Event::Read(Err(err)) if err.kind() == io::ErrorKind::Interrupted => continue,
            Event::Read(Err(err)) if err.kind() == io::ErrorKind::WouldBlock => {
                // Let other tasks run before polling the reader again.
                tokio::task::yield_now().await;
                ProbeOutcome::WouldBlock
            }
            Event::Read(Err(err)) => return Err(HandoffError::Transport(err)),
        };

        let decision = match resolve(&selection.outcome(), observed) {
            Resolution::Wait => continue,
            Resolution::Closed => {
                trace_probe!("stream closed before a protocol was selected");
                return Err(HandoffError::ClosedBeforeSelection);
            }
            Resolution::Fallback => Decision::Fallback,
            Resolution::Protocol(name) => Decision::Protocol(name),
        };

        let stream = match observed {
            ProbeOutcome::Captured(read) => {
                PushbackStream::with_pushback(connection, buffer.detach(read))
            }
            _ => PushbackStream::new(connection),
        };
        return hand_off(decision, stream, &pool, &config);
    }
}
