//! crates/logging/src/tracing_macros.rs
//! Convenience macros for negotiation tracing.
//!
//! Each macro wraps a standard tracing macro with the fixed target that
//! [`HandoffLayer`](crate::HandoffLayer) maps onto an info or debug flag.
//! Calling crates must depend on `tracing` themselves.

/// Target used for selector callback events.
pub const TARGET_SELECT: &str = "handoff::select";
/// Target used for probe read events.
pub const TARGET_PROBE: &str = "handoff::probe";
/// Target used for push-back adapter events.
pub const TARGET_PUSHBACK: &str = "handoff::pushback";
/// Target used for buffer pool events.
pub const TARGET_POOL: &str = "handoff::pool";
/// Target used for connection establishment events.
pub const TARGET_CONNECT: &str = "handoff::connect";
/// Target used for protocol delivery events.
pub const TARGET_DELIVER: &str = "handoff::deliver";
/// Target used for fallback handoff events.
pub const TARGET_FALLBACK: &str = "handoff::fallback";

/// Emit a selector callback trace.
///
/// # Example
/// ```ignore
/// trace_select!("peer offered {} protocols", offered.len());
/// ```
#[macro_export]
macro_rules! trace_select {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "handoff::select", $($arg)*);
    };
}

/// Emit a probe read trace.
///
/// # Example
/// ```ignore
/// trace_probe!("probe read returned {} bytes", read);
/// ```
#[macro_export]
macro_rules! trace_probe {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "handoff::probe", $($arg)*);
    };
}

/// Emit a push-back adapter trace.
///
/// # Example
/// ```ignore
/// trace_pushback!("replaying {} speculative bytes", len);
/// ```
#[macro_export]
macro_rules! trace_pushback {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "handoff::pushback", $($arg)*);
    };
}

/// Emit a buffer pool trace.
///
/// # Example
/// ```ignore
/// trace_pool!("pool holds {} idle buffers", idle);
/// ```
#[macro_export]
macro_rules! trace_pool {
    ($($arg:tt)*) => {
        ::tracing::trace!(target: "handoff::pool", $($arg)*);
    };
}

/// Emit a connection establishment trace.
///
/// # Example
/// ```ignore
/// trace_connect!("opening secure transport to {}", target);
/// ```
#[macro_export]
macro_rules! trace_connect {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "handoff::connect", $($arg)*);
    };
}

/// Emit a protocol delivery trace.
///
/// # Example
/// ```ignore
/// trace_deliver!("handing connection to {}", protocol);
/// ```
#[macro_export]
macro_rules! trace_deliver {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "handoff::deliver", $($arg)*);
    };
}

/// Emit a fallback handoff trace.
///
/// # Example
/// ```ignore
/// trace_fallback!("peer did not select a modern protocol");
/// ```
#[macro_export]
macro_rules! trace_fallback {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "handoff::fallback", $($arg)*);
    };
}
