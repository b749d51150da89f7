use std::io;

use protocol::ProtocolName;
use thiserror::Error;

use crate::config::ConfigError;

/// Failure delivered by a negotiation-and-handoff attempt.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// The protocol negotiation extension is not available in this process.
    #[error("protocol negotiation extension is not available")]
    CapabilityUnavailable,
    /// No secure transport was supplied.
    #[error("no secure transport configured")]
    NoEncryptionConfigured,
    /// Starting the encryption handshake failed.
    #[error("peer rejected encryption: {0}")]
    PeerRejectedEncryption(#[source] io::Error),
    /// Opening the transport or probing the connection failed.
    #[error("transport failure: {0}")]
    Transport(#[from] io::Error),
    /// The peer closed the stream before a protocol was selected.
    #[error("connection closed before a protocol was selected")]
    ClosedBeforeSelection,
    /// Negotiation settled on the fallback protocol while fallback is rejected.
    #[error("peer does not support a modern protocol (selected {selected})")]
    ModernProtocolUnsupported {
        /// The protocol the negotiation settled on.
        selected: ProtocolName,
    },
    /// The connection target could not be parsed or uses an unhandled scheme.
    #[error("invalid connection target: {0}")]
    InvalidTarget(String),
    /// The handoff configuration is invalid.
    #[error("invalid handoff configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl HandoffError {
    /// The [`io::ErrorKind`] this failure maps to.
    #[must_use]
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            Self::CapabilityUnavailable | Self::ModernProtocolUnsupported { .. } => {
                io::ErrorKind::Unsupported
            }
            Self::NoEncryptionConfigured | Self::InvalidTarget(_) | Self::InvalidConfig(_) => {
                io::ErrorKind::InvalidInput
            }
            Self::PeerRejectedEncryption(err) | Self::Transport(err) => err.kind(),
            Self::ClosedBeforeSelection => io::ErrorKind::UnexpectedEof,
        }
    }

    /// Returns the underlying I/O error for transport-level failures.
    #[must_use]
    pub const fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::PeerRejectedEncryption(err) | Self::Transport(err) => Some(err),
            _ => None,
        }
    }

    /// Reports whether the failure happened before any I/O was attempted.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::CapabilityUnavailable
                | Self::NoEncryptionConfigured
                | Self::InvalidTarget(_)
                | Self::InvalidConfig(_)
        )
    }
}

impl From<HandoffError> for io::Error {
    fn from(err: HandoffError) -> Self {
        match err {
            HandoffError::Transport(inner) => inner,
            other => io::Error::new(other.kind(), other),
        }
    }
}
