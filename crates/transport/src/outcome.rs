//! Handoff results and the decision rule shared by the sync and async drivers.

use std::io::{self, BufRead, IoSlice, IoSliceMut, Read, Write};
use std::sync::Arc;

use protocol::{NegotiationOutcome, ProtocolName};

use crate::pool::BufferPool;
use crate::pushback::PushbackStream;

/// A connection handed to the modern multiplexed protocol.
///
/// The connection owns the (possibly replaying) stream together with the
/// buffer pool the protocol implementation uses for its frames.
#[derive(Debug)]
pub struct MultiplexedConnection<C> {
    protocol: ProtocolName,
    stream: PushbackStream<C>,
    pool: Arc<BufferPool>,
}

impl<C> MultiplexedConnection<C> {
    /// Creates the protocol connection over `stream`.
    #[must_use]
    pub fn new(protocol: ProtocolName, stream: PushbackStream<C>, pool: Arc<BufferPool>) -> Self {
        Self {
            protocol,
            stream,
            pool,
        }
    }

    /// The negotiated protocol.
    #[must_use]
    pub const fn protocol(&self) -> &ProtocolName {
        &self.protocol
    }

    /// The underlying stream.
    #[must_use]
    pub const fn stream(&self) -> &PushbackStream<C> {
        &self.stream
    }

    /// Mutable access to the underlying stream.
    #[must_use]
    pub const fn stream_mut(&mut self) -> &mut PushbackStream<C> {
        &mut self.stream
    }

    /// The buffer pool handed to the protocol implementation.
    #[must_use]
    pub const fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }

    /// Releases the connection into its parts.
    #[must_use]
    pub fn into_parts(self) -> (ProtocolName, PushbackStream<C>, Arc<BufferPool>) {
        (self.protocol, self.stream, self.pool)
    }
}

impl<C: Read> Read for MultiplexedConnection<C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }

    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
        self.stream.read_vectored(bufs)
    }
}

impl<C: BufRead> BufRead for MultiplexedConnection<C> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.stream.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.stream.consume(amt);
    }
}

impl<C: Write> Write for MultiplexedConnection<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        self.stream.write_vectored(bufs)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// Successful result of a negotiation-and-handoff attempt.
#[derive(Debug)]
pub enum ConnectionOutcome<C> {
    /// A modern protocol was agreed and its connection constructed.
    Protocol(MultiplexedConnection<C>),
    /// The connection is handed, bytes intact, to the legacy fallback protocol.
    Fallback(PushbackStream<C>),
}

impl<C> ConnectionOutcome<C> {
    /// The negotiated modern protocol, or `None` for a fallback handoff.
    #[must_use]
    pub const fn protocol(&self) -> Option<&ProtocolName> {
        match self {
            Self::Protocol(connection) => Some(connection.protocol()),
            Self::Fallback(_) => None,
        }
    }

    /// Reports whether this is a fallback handoff.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// Returns the stream regardless of which protocol owns it.
    #[must_use]
    pub fn into_stream(self) -> PushbackStream<C> {
        match self {
            Self::Protocol(connection) => connection.stream,
            Self::Fallback(stream) => stream,
        }
    }
}

/// What a single readiness event observed on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The outcome was already decided, so no read was attempted.
    Skipped,
    /// The transport had nothing to deliver.
    WouldBlock,
    /// This many bytes were captured.
    Captured(usize),
    /// The peer closed the stream.
    Eof,
}

/// Decision taken at the end of a readiness event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Keep waiting for the next readiness event.
    Wait,
    /// Construct the modern protocol connection.
    Protocol(ProtocolName),
    /// Hand the connection to the fallback protocol.
    Fallback,
    /// The stream ended with the outcome still open.
    Closed,
}

/// Combines the re-checked negotiation outcome with what the probe observed.
///
/// A decided outcome always wins. While undecided, captured bytes mean the
/// peer is already speaking, which only happens when it is not negotiating,
/// so the connection falls back.
#[must_use]
pub fn resolve(outcome: &NegotiationOutcome, probe: ProbeOutcome) -> Resolution {
    match (outcome, probe) {
        (NegotiationOutcome::Fallback, _) => Resolution::Fallback,
        (NegotiationOutcome::Protocol(name), _) => Resolution::Protocol(name.clone()),
        (NegotiationOutcome::Undecided, ProbeOutcome::Captured(read)) if read > 0 => {
            Resolution::Fallback
        }
        (NegotiationOutcome::Undecided, ProbeOutcome::Eof) => Resolution::Closed,
        (NegotiationOutcome::Undecided, _) => Resolution::Wait,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decided_outcomes_ignore_the_probe() {
        let protocol = NegotiationOutcome::Protocol(ProtocolName::SPDY_3);
        for probe in [
            ProbeOutcome::Skipped,
            ProbeOutcome::WouldBlock,
            ProbeOutcome::Captured(37),
            ProbeOutcome::Eof,
        ] {
            assert_eq!(
                resolve(&protocol, probe),
                Resolution::Protocol(ProtocolName::SPDY_3)
            );
            assert_eq!(
                resolve(&NegotiationOutcome::Fallback, probe),
                Resolution::Fallback
            );
        }
    }

    #[test]
    fn undecided_with_bytes_falls_back() {
        assert_eq!(
            resolve(&NegotiationOutcome::Undecided, ProbeOutcome::Captured(1)),
            Resolution::Fallback
        );
    }

    #[test]
    fn undecided_without_bytes_waits() {
        assert_eq!(
            resolve(&NegotiationOutcome::Undecided, ProbeOutcome::WouldBlock),
            Resolution::Wait
        );
        assert_eq!(
            resolve(&NegotiationOutcome::Undecided, ProbeOutcome::Captured(0)),
            Resolution::Wait
        );
    }

    #[test]
    fn undecided_at_eof_is_closed() {
        assert_eq!(
            resolve(&NegotiationOutcome::Undecided, ProbeOutcome::Eof),
            Resolution::Closed
        );
    }

    #[test]
    fn outcome_accessors() {
        let pool = Arc::new(BufferPool::new(1, 8));
        let stream = PushbackStream::with_pushback(Cursor::new(vec![2]), vec![1]);
        let outcome =
            ConnectionOutcome::Protocol(MultiplexedConnection::new(ProtocolName::SPDY_3_1, stream, pool));

        assert_eq!(outcome.protocol(), Some(&ProtocolName::SPDY_3_1));
        assert!(!outcome.is_fallback());

        let mut stream = outcome.into_stream();
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, [1, 2]);
    }
}
