//! Process-wide negotiation capability detection.
//!
//! Whether the transport stack in this process can run the negotiation
//! extension is a property of the build and runtime, not of a connection.
//! [`detect`] runs the supplied probe once and caches the answer for the
//! lifetime of the process; later calls return the cached value without
//! running their probe.

use std::sync::OnceLock;

static DETECTED: OnceLock<Capability> = OnceLock::new();

/// Availability of the protocol negotiation extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// The extension can be attached to handshakes.
    Available,
    /// The extension is missing; every negotiation fails up front.
    Unavailable,
}

impl Capability {
    /// Maps a probe result onto a capability.
    #[must_use]
    pub const fn from_probe(available: bool) -> Self {
        if available {
            Self::Available
        } else {
            Self::Unavailable
        }
    }

    /// Reports whether the extension can be used.
    #[must_use]
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Runs `probe` on the first call and returns the cached capability thereafter.
pub fn detect<F>(probe: F) -> Capability
where
    F: FnOnce() -> bool,
{
    *DETECTED.get_or_init(|| {
        let capability = Capability::from_probe(probe());
        if capability.is_available() {
            tracing::debug!(target: logging::TARGET_CONNECT, "protocol negotiation extension available");
        } else {
            tracing::warn!(
                target: logging::TARGET_CONNECT,
                "protocol negotiation extension not available; negotiated connections will fail"
            );
        }
        capability
    })
}

/// Returns the cached capability, or `None` before [`detect`] ran.
#[must_use]
pub fn current() -> Option<Capability> {
    DETECTED.get().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_probe_maps_booleans() {
        assert_eq!(Capability::from_probe(true), Capability::Available);
        assert_eq!(Capability::from_probe(false), Capability::Unavailable);
        assert!(Capability::Available.is_available());
        assert!(!Capability::Unavailable.is_available());
    }

    #[test]
    fn detect_runs_the_probe_only_once() {
        let first = detect(|| true);
        let mut ran_again = false;
        let second = detect(|| {
            ran_again = true;
            false
        });

        assert!(!ran_again);
        assert_eq!(first, second);
        assert_eq!(current(), Some(first));
    }
}
