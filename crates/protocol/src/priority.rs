//! Ordered protocol preferences.
//!
//! A [`ProtocolPriorityList`] names the modern protocols this endpoint is
//! willing to speak, highest preference first, followed implicitly by the
//! legacy fallback protocol. The list is validated once at construction and
//! immutable afterwards, so selection never has to re-check it.

use crate::error::PriorityListError;
use crate::name::ProtocolName;

/// Longest protocol name accepted by the negotiation extension.
///
/// Each offered name is prefixed by a single length byte on the wire.
pub const MAX_PROTOCOL_NAME_LEN: usize = 255;

/// Highest-first list of modern protocols terminated by a fallback protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "PriorityListRepr")
)]
pub struct ProtocolPriorityList {
    modern: Vec<ProtocolName>,
    fallback: ProtocolName,
}

impl ProtocolPriorityList {
    /// Builds a validated priority list.
    pub fn new<I>(modern: I, fallback: ProtocolName) -> Result<Self, PriorityListError>
    where
        I: IntoIterator<Item = ProtocolName>,
    {
        let modern: Vec<ProtocolName> = modern.into_iter().collect();
        if modern.is_empty() {
            return Err(PriorityListError::NoModernProtocols);
        }

        validate_name(&fallback)?;
        for (index, name) in modern.iter().enumerate() {
            validate_name(name)?;
            if *name == fallback {
                return Err(PriorityListError::FallbackListedAsModern(name.clone()));
            }
            if modern[..index].contains(name) {
                return Err(PriorityListError::Duplicate(name.clone()));
            }
        }

        Ok(Self { modern, fallback })
    }

    /// Modern protocols, highest preference first.
    #[must_use]
    pub fn modern(&self) -> &[ProtocolName] {
        &self.modern
    }

    /// The legacy protocol used when no modern protocol is agreed.
    #[must_use]
    pub const fn fallback(&self) -> &ProtocolName {
        &self.fallback
    }

    /// Iterates every entry in preference order, ending with the fallback.
    pub fn iter(&self) -> impl Iterator<Item = &ProtocolName> {
        self.modern.iter().chain(std::iter::once(&self.fallback))
    }

    /// Returns the highest-preference modern protocol present in `offered`.
    ///
    /// `None` means the peer offered no modern protocol we accept, which the
    /// selector turns into a fallback decision.
    #[must_use]
    pub fn select<S: AsRef<str>>(&self, offered: &[S]) -> Option<&ProtocolName> {
        self.modern
            .iter()
            .find(|candidate| offered.iter().any(|name| *candidate == name.as_ref()))
    }

    /// Reports whether `name` is one of the modern entries.
    #[must_use]
    pub fn is_modern(&self, name: &str) -> bool {
        self.modern.iter().any(|candidate| *candidate == name)
    }
}

impl Default for ProtocolPriorityList {
    fn default() -> Self {
        Self {
            modern: vec![ProtocolName::SPDY_3_1, ProtocolName::SPDY_3],
            fallback: ProtocolName::HTTP_1_1,
        }
    }
}

fn validate_name(name: &ProtocolName) -> Result<(), PriorityListError> {
    if name.is_empty() {
        return Err(PriorityListError::EmptyName);
    }
    if name.len() > MAX_PROTOCOL_NAME_LEN {
        return Err(PriorityListError::NameTooLong {
            name: name.to_string(),
            len: name.len(),
            limit: MAX_PROTOCOL_NAME_LEN,
        });
    }
    Ok(())
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct PriorityListRepr {
    modern: Vec<ProtocolName>,
    fallback: ProtocolName,
}

#[cfg(feature = "serde")]
impl TryFrom<PriorityListRepr> for ProtocolPriorityList {
    type Error = PriorityListError;

    fn try_from(repr: PriorityListRepr) -> Result<Self, Self::Error> {
        Self::new(repr.modern, repr.fallback)
    }
}
