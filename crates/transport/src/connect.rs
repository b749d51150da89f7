//! Client-side connection establishment.
//!
//! [`connect`] checks the negotiation preconditions, opens a secure
//! connection through a [`SecureTransport`] and hands it to a fresh
//! [`HandoffEngine`]. Every failure, including the synchronous ones, is
//! delivered through the completion callback.

use std::fmt;
use std::io;
use std::str::FromStr;

use logging::trace_connect;
use url::Url;

use crate::config::HandoffConfig;
use crate::connection::{NegotiationExtension, SecureConnection};
use crate::engine::{HandoffEngine, HandoffResult};
use crate::error::HandoffError;

/// URI schemes this connector serves.
pub const HANDLED_SCHEMES: &[&str] = &["spdy"];

/// Port used when the target URI does not name one.
pub const DEFAULT_PORT: u16 = 443;

/// Host and port of a secure connection target.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConnectTarget {
    host: String,
    port: u16,
}

impl ConnectTarget {
    /// Creates a target from its parts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parses a `spdy://host[:port]` URI.
    ///
    /// The port defaults to [`DEFAULT_PORT`]. Schemes outside
    /// [`HANDLED_SCHEMES`] and URIs without a host are rejected.
    pub fn parse(uri: &str) -> Result<Self, HandoffError> {
        let url = Url::parse(uri)
            .map_err(|err| HandoffError::InvalidTarget(format!("{uri}: {err}")))?;

        if !HANDLED_SCHEMES.contains(&url.scheme()) {
            return Err(HandoffError::InvalidTarget(format!(
                "{uri}: unsupported scheme `{}`",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| HandoffError::InvalidTarget(format!("{uri}: missing host")))?;

        Ok(Self::new(host, url.port().unwrap_or(DEFAULT_PORT)))
    }

    /// Target host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Target port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for ConnectTarget {
    type Err = HandoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ConnectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Opens encrypted connections to a target.
pub trait SecureTransport {
    /// Connection type produced by this transport.
    type Connection: SecureConnection;

    /// Opens a connection without starting the handshake.
    fn open(&self, target: &ConnectTarget) -> io::Result<Self::Connection>;
}

impl<T: SecureTransport + ?Sized> SecureTransport for &T {
    type Connection = T::Connection;

    fn open(&self, target: &ConnectTarget) -> io::Result<Self::Connection> {
        (**self).open(target)
    }
}

/// Connects to `target` and starts negotiating.
///
/// Fails through `completion` with [`HandoffError::CapabilityUnavailable`]
/// when the extension is missing, [`HandoffError::NoEncryptionConfigured`]
/// when `transport` is `None`, and [`HandoffError::Transport`] when opening
/// fails. Precondition failures perform no I/O. The returned engine is
/// already finished in those cases.
pub fn connect<T, E, F>(
    target: &ConnectTarget,
    transport: Option<&T>,
    extension: &E,
    config: HandoffConfig,
    completion: F,
) -> HandoffEngine<T::Connection, F>
where
    T: SecureTransport + ?Sized,
    E: NegotiationExtension<T::Connection> + ?Sized,
    F: FnOnce(HandoffResult<T::Connection>),
{
    if !extension.capability().is_available() {
        tracing::warn!(
            target: logging::TARGET_CONNECT,
            "cannot connect to {target}: protocol negotiation extension unavailable"
        );
        return HandoffEngine::failed(HandoffError::CapabilityUnavailable, config, completion);
    }

    let Some(transport) = transport else {
        return HandoffEngine::failed(HandoffError::NoEncryptionConfigured, config, completion);
    };

    trace_connect!("opening secure connection to {}", target);
    match transport.open(target) {
        Ok(connection) => HandoffEngine::begin(connection, extension, config, completion),
        Err(err) => {
            trace_connect!("connecting to {} failed: {}", target, err);
            HandoffEngine::failed(HandoffError::Transport(err), config, completion)
        }
    }
}
