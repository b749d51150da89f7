#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]

//! # Overview
//!
//! `transport` drives protocol negotiation on a freshly encrypted connection
//! and hands the connection to whichever protocol won: the modern
//! multiplexed protocol agreed through the selector callback, or the legacy
//! fallback protocol when the peer does not negotiate.
//!
//! # Design
//!
//! - [`HandoffEngine`] is the event-driven state machine. The caller's event
//!   loop reports read-readiness through [`HandoffEngine::on_readable`].
//! - Bytes read speculatively while the outcome is open are pushed back into
//!   a [`PushbackStream`] so the new owner sees the stream from its first
//!   byte.
//! - [`BufferPool`] supplies probe buffers and is handed on to the modern
//!   protocol connection.
//! - [`connect`] opens a connection through a [`SecureTransport`] and starts
//!   the engine.
//! - With the `async` feature, `negotiate_async` performs the same
//!   negotiation on a tokio connection.
//!
//! # Invariants
//!
//! - Exactly one result is delivered per attempt.
//! - A decided outcome always wins over bytes observed on the wire.
//! - Pushed-back bytes are replayed once, in order, before any new read.
//!
//! # Errors
//!
//! Failures are reported as [`HandoffError`], which converts into
//! [`std::io::Error`] for callers that only deal in I/O errors.
//!
//! # Examples
//!
//! Replay captured bytes ahead of the live stream:
//!
//! ```
//! use std::io::{Cursor, Read};
//! use transport::PushbackStream;
//!
//! let mut stream = PushbackStream::new(Cursor::new(b" world".to_vec()));
//! stream.push_back(b"hello".to_vec()).unwrap();
//!
//! let mut text = String::new();
//! stream.read_to_string(&mut text).unwrap();
//! assert_eq!(text, "hello world");
//! ```

#[cfg(feature = "async")]
mod async_engine;
mod config;
mod connect;
mod connection;
mod engine;
mod error;
mod outcome;
mod pool;
mod probe;
mod pushback;

#[cfg(feature = "async")]
pub use async_engine::negotiate_async;
pub use config::{ConfigError, DEFAULT_PROBE_CAPACITY, FallbackPolicy, HandoffConfig, PoolConfig};
pub use connect::{ConnectTarget, DEFAULT_PORT, HANDLED_SCHEMES, SecureTransport, connect};
pub use connection::{NegotiationExtension, SecureConnection};
pub use engine::{EngineStatus, HandoffEngine, HandoffResult};
pub use error::HandoffError;
pub use outcome::{ConnectionOutcome, MultiplexedConnection, ProbeOutcome, Resolution, resolve};
pub use pool::{BufferPool, DEFAULT_POOL_BUFFER_SIZE, DEFAULT_POOL_BUFFERS, PooledBuffer};
pub use pushback::{PushbackError, PushbackStream};
