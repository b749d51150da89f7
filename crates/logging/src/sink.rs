//! crates/logging/src/sink.rs
//! Shared buffer for diagnostics captured by the tracing bridge.

use super::levels::{DebugFlag, InfoFlag};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Diagnostic event collected during execution.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagnosticEvent {
    /// Info-level diagnostic event.
    Info {
        /// The info flag category.
        flag: InfoFlag,
        /// The verbosity level.
        level: u8,
        /// The diagnostic message.
        message: String,
    },
    /// Debug-level diagnostic event.
    Debug {
        /// The debug flag category.
        flag: DebugFlag,
        /// The verbosity level.
        level: u8,
        /// The diagnostic message.
        message: String,
    },
}

impl DiagnosticEvent {
    /// Returns the rendered message regardless of category.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Info { message, .. } | Self::Debug { message, .. } => message,
        }
    }
}

/// Cloneable handle to the events recorded by a [`HandoffLayer`](crate::HandoffLayer).
///
/// Every clone appends to and drains from the same buffer, so events emitted
/// on a handshake thread are visible to whichever thread reads the sink.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticSink {
    events: Arc<Mutex<Vec<DiagnosticEvent>>>,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn push(&self, event: DiagnosticEvent) {
        self.lock().push(event);
    }

    /// Removes and returns every recorded event in arrival order.
    #[must_use]
    pub fn drain(&self) -> Vec<DiagnosticEvent> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of events waiting to be drained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when nothing has been recorded since the last drain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock leaves a valid Vec behind.
    fn lock(&self) -> MutexGuard<'_, Vec<DiagnosticEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback(message: &str) -> DiagnosticEvent {
        DiagnosticEvent::Info {
            flag: InfoFlag::Fallback,
            level: 1,
            message: message.to_string(),
        }
    }

    #[test]
    fn clones_share_one_buffer() {
        let sink = DiagnosticSink::new();
        let writer = sink.clone();

        writer.push(fallback("falling back"));
        writer.push(DiagnosticEvent::Debug {
            flag: DebugFlag::Probe,
            level: 2,
            message: "probed 37 bytes".to_string(),
        });

        assert_eq!(sink.len(), 2);
        let events = sink.drain();
        assert_eq!(events[0], fallback("falling back"));
        assert_eq!(events[1].message(), "probed 37 bytes");
        assert!(writer.is_empty());
    }

    #[test]
    fn events_pushed_from_another_thread_are_drained_here() {
        let sink = DiagnosticSink::new();
        let writer = sink.clone();

        std::thread::spawn(move || writer.push(fallback("from the handshake thread")))
            .join()
            .unwrap();

        assert_eq!(sink.drain(), vec![fallback("from the handshake thread")]);
    }

    #[test]
    fn poisoned_lock_still_records() {
        let sink = DiagnosticSink::new();
        let writer = sink.clone();

        let _ = std::thread::spawn(move || {
            let _guard = writer.lock();
            panic!("poison the sink");
        })
        .join();

        sink.push(fallback("after poison"));
        assert_eq!(sink.len(), 1);
    }
}
