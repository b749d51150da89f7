#![deny(unsafe_code)]
#![deny(missing_docs)]

//! Protocol negotiation and connection handoff for encrypted transports.
//!
//! A client opening an encrypted connection advertises the protocols it
//! prefers. The peer's answer arrives through a callback fired from inside
//! the handshake, while the first application bytes may already be on the
//! wire. This crate reconciles the two signals without losing a byte and
//! hands the connection to the modern multiplexed protocol or to the legacy
//! fallback protocol.
//!
//! The workspace is split the same way the pieces are used:
//!
//! - [`protocol`]: priority lists, the selector callbacks and the shared
//!   outcome cell.
//! - [`transport`]: the handoff engine, the push-back stream, the buffer
//!   pool and the connector.
//! - [`logging`]: verbosity flags and the tracing bridge.
//!
//! # Examples
//!
//! Pick a protocol from a peer offer:
//!
//! ```
//! use npn_handoff::protocol::{NextProtocolProvider, ProtocolName, ProtocolSelector};
//! use npn_handoff::protocol::{NegotiationOutcome, ProtocolPriorityList};
//!
//! let selector = ProtocolSelector::new(ProtocolPriorityList::default());
//! let chosen = selector.select_protocol(&["http/1.1", "spdy/3"]);
//!
//! assert_eq!(chosen, ProtocolName::SPDY_3);
//! assert_eq!(
//!     selector.outcome(),
//!     NegotiationOutcome::Protocol(ProtocolName::SPDY_3)
//! );
//! ```

pub use logging;
pub use protocol;
pub use transport;

pub use protocol::{NegotiationOutcome, ProtocolName, ProtocolPriorityList, ProtocolSelector};
#[cfg(feature = "async")]
pub use transport::negotiate_async;
pub use transport::{
    ConnectTarget, ConnectionOutcome, FallbackPolicy, HandoffConfig, HandoffEngine, HandoffError,
    PushbackStream, connect,
};
