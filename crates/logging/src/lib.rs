#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` provides the verbosity flag system used by the protocol
//! negotiation crates. Diagnostics are emitted through the `tracing` crate
//! with fixed targets (see the `trace_*` macros) and filtered per category
//! by a [`VerbosityConfig`].
//!
//! # Design
//!
//! Info flags ([`InfoFlag`]) cover the user-facing milestones: connection
//! establishment, delivery of a negotiated protocol and fallback handoffs.
//! Debug flags ([`DebugFlag`]) cover engine internals: selector callbacks,
//! probe reads, push-back replay and buffer pool traffic.
//!
//! [`HandoffLayer`] bridges tracing events onto those flags. It filters with
//! the configuration it was built with and appends what passes to a
//! [`DiagnosticSink`] shared across threads, so selector callbacks fired on
//! a handshake thread are captured next to the engine's own events. Tests
//! drain the sink to assert on what the engine reported.
//!
//! [`init`], [`info_gte`] and [`debug_gte`] keep a per-thread copy of the
//! configuration for callers that check a flag before building a message.
//!
//! # Examples
//!
//! ```
//! use logging::{DebugFlag, InfoFlag, VerbosityConfig, debug_gte, info_gte, init};
//!
//! init(VerbosityConfig::from_verbose_level(2));
//!
//! assert!(info_gte(InfoFlag::Fallback, 1));
//! assert!(debug_gte(DebugFlag::Probe, 1));
//! assert!(!debug_gte(DebugFlag::Pool, 1));
//! ```

mod config;
mod levels;
mod sink;
mod thread_local;
mod tracing_bridge;
mod tracing_macros;

pub use config::VerbosityConfig;
pub use levels::{DebugFlag, DebugLevels, InfoFlag, InfoLevels};
pub use sink::{DiagnosticEvent, DiagnosticSink};
pub use thread_local::{apply_debug_flag, apply_info_flag, debug_gte, info_gte, init};
pub use tracing_bridge::{HandoffLayer, init_tracing, init_tracing_with_filter};
pub use tracing_macros::{
    TARGET_CONNECT, TARGET_DELIVER, TARGET_FALLBACK, TARGET_POOL, TARGET_PROBE, TARGET_PUSHBACK,
    TARGET_SELECT,
};
