#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]

//! Application-layer protocol selection for negotiated connections.
//!
//! The crate holds the pieces of negotiation that do not touch I/O: the
//! ordered list of protocols this endpoint prefers, the selector the
//! negotiation extension calls during the handshake, and the write-once
//! outcome cell the handoff engine reads on every readiness event.
//!
//! # Examples
//!
//! The peer offers its protocols; the highest entry of *our* priority list
//! that appears in the offer wins.
//!
//! ```
//! use protocol::{NegotiationOutcome, NextProtocolProvider, ProtocolName, ProtocolPriorityList, ProtocolSelector};
//!
//! let selector = ProtocolSelector::new(ProtocolPriorityList::default());
//! let handle = selector.handle();
//!
//! let chosen = selector.select_protocol(&["http/1.1", "spdy/3"]);
//! assert_eq!(chosen, ProtocolName::SPDY_3);
//! assert_eq!(handle.outcome(), NegotiationOutcome::Protocol(ProtocolName::SPDY_3));
//! ```
//!
//! When nothing modern matches the selector falls back:
//!
//! ```
//! use protocol::{NegotiationOutcome, NextProtocolProvider, ProtocolPriorityList, ProtocolSelector};
//!
//! let selector = ProtocolSelector::new(ProtocolPriorityList::default());
//! selector.select_protocol(&["http/1.1"]);
//! assert_eq!(selector.outcome(), NegotiationOutcome::Fallback);
//! ```

pub mod capability;
mod error;
mod name;
mod outcome;
mod priority;
mod selector;

pub use capability::Capability;
pub use error::PriorityListError;
pub use name::ProtocolName;
pub use outcome::{Decision, NegotiationOutcome, OutcomeCell};
pub use priority::{MAX_PROTOCOL_NAME_LEN, ProtocolPriorityList};
pub use selector::{NextProtocolProvider, ProtocolSelector, SelectionHandle};
