use std::borrow::Cow;
use std::fmt;

/// Application-layer protocol identifier exchanged during negotiation.
///
/// Names are compared byte-exactly. The well-known identifiers used by the
/// default priority list are available as associated constants so they can be
/// used in `const` contexts without allocating.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ProtocolName(Cow<'static, str>);

impl ProtocolName {
    /// SPDY draft 3.1, the preferred modern protocol.
    pub const SPDY_3_1: Self = Self::from_static("spdy/3.1");
    /// SPDY draft 3.
    pub const SPDY_3: Self = Self::from_static("spdy/3");
    /// HTTP/1.1, the legacy fallback protocol.
    pub const HTTP_1_1: Self = Self::from_static("http/1.1");

    /// Wraps a static string without allocating.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Creates a protocol name from an owned or borrowed string.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the number of bytes the name occupies on the wire.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Reports whether the name is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ProtocolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProtocolName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for ProtocolName {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for ProtocolName {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl PartialEq<str> for ProtocolName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ProtocolName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
