//! Capabilities granted to an identity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A named permission checked before privileged real-time actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Any authenticated forum user.
    Member,
    /// Forum administrator (rulebook editing, moderation feed).
    Admin,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Member => write!(f, "member"),
            Capability::Admin => write!(f, "admin"),
        }
    }
}

/// Set of capabilities held by an identity.
///
/// Ordered so that logs and serialized payloads are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    /// The empty set held by guests.
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// `{member}`.
    pub fn member() -> Self {
        Self::from_iter([Capability::Member])
    }

    /// `{member, admin}`.
    pub fn admin() -> Self {
        Self::from_iter([Capability::Member, Capability::Admin])
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
