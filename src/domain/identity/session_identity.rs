//! Identity bound to a live connection.

use crate::domain::foundation::{AuthenticatedUser, UserId, ADMIN_ROLE};

use super::{Capability, CapabilitySet};

/// The authenticated principal behind a connection.
///
/// Immutable once bound; a connection never re-authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    user_id: UserId,
    display_name: String,
    capabilities: CapabilitySet,
}

impl Identity {
    pub fn new(user_id: UserId, display_name: impl Into<String>, capabilities: CapabilitySet) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            capabilities,
        }
    }

    /// Derives the identity from a validated user.
    ///
    /// Every authenticated user is a member; the `admin` role adds admin.
    pub fn from_user(user: &AuthenticatedUser) -> Self {
        let capabilities = if user.has_role(ADMIN_ROLE) {
            CapabilitySet::admin()
        } else {
            CapabilitySet::member()
        };
        Self::new(user.id.clone(), user.username.clone(), capabilities)
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }
}

/// Identity as seen by the real-time layer: authenticated or guest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionIdentity {
    /// Unauthenticated connection; holds no capabilities.
    #[default]
    Guest,
    Authenticated(Identity),
}

impl SessionIdentity {
    pub fn from_user(user: &AuthenticatedUser) -> Self {
        SessionIdentity::Authenticated(Identity::from_user(user))
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, SessionIdentity::Guest)
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionIdentity::Guest => None,
            SessionIdentity::Authenticated(identity) => Some(identity),
        }
    }

    /// Pure capability check. Guests hold nothing.
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.identity()
            .map(|i| i.capabilities().contains(capability))
            .unwrap_or(false)
    }

    /// Name shown next to rolls and edits.
    pub fn display_name(&self) -> &str {
        self.identity().map(Identity::display_name).unwrap_or("Guest")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser::new(
            UserId::new("9").unwrap(),
            "mira",
            "mira@example.com",
            roles.iter().map(|r| r.to_string()).collect(),
        )
    }

    #[test]
    fn plain_user_is_member_only() {
        let identity = SessionIdentity::from_user(&user(&[]));
        assert!(identity.has_capability(Capability::Member));
        assert!(!identity.has_capability(Capability::Admin));
    }

    #[test]
    fn admin_role_grants_member_and_admin() {
        let identity = SessionIdentity::from_user(&user(&["editor", "admin"]));
        assert!(identity.has_capability(Capability::Member));
        assert!(identity.has_capability(Capability::Admin));
    }

    #[test]
    fn guest_has_no_capability() {
        let guest = SessionIdentity::Guest;
        assert!(guest.is_guest());
        assert!(!guest.has_capability(Capability::Member));
        assert!(!guest.has_capability(Capability::Admin));
        assert_eq!(guest.display_name(), "Guest");
    }

    #[test]
    fn display_name_comes_from_username() {
        let identity = SessionIdentity::from_user(&user(&[]));
        assert_eq!(identity.display_name(), "mira");
        assert_eq!(identity.identity().unwrap().user_id().as_str(), "9");
    }
}
