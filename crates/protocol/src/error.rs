use std::io;

use thiserror::Error;

use crate::name::ProtocolName;

/// Errors raised while building a [`ProtocolPriorityList`](crate::ProtocolPriorityList).
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PriorityListError {
    /// The list does not contain any modern protocol ahead of the fallback.
    #[error("priority list names no modern protocol")]
    NoModernProtocols,
    /// A protocol name was empty.
    #[error("protocol names must not be empty")]
    EmptyName,
    /// A protocol name does not fit the single length byte used on the wire.
    #[error("protocol name {name:?} is {len} bytes long (limit {limit})")]
    NameTooLong {
        /// The offending name.
        name: String,
        /// Its length in bytes.
        len: usize,
        /// The maximum accepted length.
        limit: usize,
    },
    /// The same modern protocol appears twice.
    #[error("protocol {0} is listed more than once")]
    Duplicate(ProtocolName),
    /// The fallback protocol also appears among the modern entries.
    #[error("fallback protocol {0} must not be listed as a modern protocol")]
    FallbackListedAsModern(ProtocolName),
}

impl PriorityListError {
    /// Returns the protocol name the error refers to, if any.
    #[must_use]
    pub fn protocol(&self) -> Option<&str> {
        match self {
            Self::NameTooLong { name, .. } => Some(name.as_str()),
            Self::Duplicate(name) | Self::FallbackListedAsModern(name) => Some(name.as_str()),
            Self::NoModernProtocols | Self::EmptyName => None,
        }
    }
}

impl From<PriorityListError> for io::Error {
    fn from(err: PriorityListError) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, err)
    }
}
