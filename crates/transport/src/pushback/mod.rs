//! Push-back adapter for speculatively read bytes.
//!
//! Bytes read while the negotiation outcome is still open belong to whichever
//! protocol ends up owning the connection. [`PushbackStream`] places them in
//! front of the inner stream so the new owner observes them first, followed
//! by the untouched continuation.

#[cfg(feature = "async")]
mod async_io;
mod storage;
mod stream;

pub use stream::{PushbackError, PushbackStream};
