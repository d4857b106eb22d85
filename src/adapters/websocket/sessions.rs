//! Connection → identity binding.
//!
//! The identity is resolved once, at upgrade time, and stays fixed for the
//! lifetime of the connection. Unbound connections read as guests.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::foundation::ConnectionId;
use crate::domain::identity::{Capability, SessionIdentity};

/// Identities of live connections.
#[derive(Default)]
pub struct SessionBindings {
    bindings: RwLock<HashMap<ConnectionId, SessionIdentity>>,
}

impl SessionBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds an identity to a connection.
    ///
    /// Returns `false` and keeps the existing identity if the connection is
    /// already bound.
    pub async fn bind(&self, connection_id: ConnectionId, identity: SessionIdentity) -> bool {
        let mut bindings = self.bindings.write().await;
        if bindings.contains_key(&connection_id) {
            tracing::warn!(connection_id = %connection_id, "connection already bound, ignoring rebind");
            return false;
        }
        bindings.insert(connection_id, identity);
        true
    }

    /// Identity of the connection, or `Guest` when unbound. Never fails.
    pub async fn current_identity(&self, connection_id: ConnectionId) -> SessionIdentity {
        self.bindings
            .read()
            .await
            .get(&connection_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Pure capability check.
    ///
    /// Callers are responsible for telling the connection why it was refused.
    pub async fn require_capability(&self, connection_id: ConnectionId, capability: Capability) -> bool {
        self.bindings
            .read()
            .await
            .get(&connection_id)
            .map(|identity| identity.has_capability(capability))
            .unwrap_or(false)
    }

    /// Removes the binding at disconnect.
    pub async fn unbind(&self, connection_id: ConnectionId) -> Option<SessionIdentity> {
        self.bindings.write().await.remove(&connection_id)
    }

    /// Number of bound connections.
    pub async fn len(&self) -> usize {
        self.bindings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bindings.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{AuthenticatedUser, UserId};

    fn identity(roles: &[&str]) -> SessionIdentity {
        SessionIdentity::from_user(&AuthenticatedUser::new(
            UserId::new("3").unwrap(),
            "ash",
            "ash@example.com",
            roles.iter().map(|r| r.to_string()).collect(),
        ))
    }

    #[tokio::test]
    async fn unbound_connection_is_guest() {
        let bindings = SessionBindings::new();
        let id = ConnectionId::new();

        assert!(bindings.current_identity(id).await.is_guest());
        assert!(!bindings.require_capability(id, Capability::Member).await);
    }

    #[tokio::test]
    async fn guest_binding_holds_no_capabilities() {
        let bindings = SessionBindings::new();
        let id = ConnectionId::new();
        bindings.bind(id, SessionIdentity::Guest).await;

        assert!(!bindings.require_capability(id, Capability::Member).await);
        assert!(!bindings.require_capability(id, Capability::Admin).await);
    }

    #[tokio::test]
    async fn admin_passes_member_and_admin_checks() {
        let bindings = SessionBindings::new();
        let id = ConnectionId::new();
        bindings.bind(id, identity(&["admin"])).await;

        assert!(bindings.require_capability(id, Capability::Member).await);
        assert!(bindings.require_capability(id, Capability::Admin).await);
    }

    #[tokio::test]
    async fn member_fails_admin_check() {
        let bindings = SessionBindings::new();
        let id = ConnectionId::new();
        bindings.bind(id, identity(&[])).await;

        assert!(bindings.require_capability(id, Capability::Member).await);
        assert!(!bindings.require_capability(id, Capability::Admin).await);
    }

    #[tokio::test]
    async fn identity_is_fixed_after_first_bind() {
        let bindings = SessionBindings::new();
        let id = ConnectionId::new();

        assert!(bindings.bind(id, identity(&[])).await);
        assert!(!bindings.bind(id, identity(&["admin"])).await);
        assert!(!bindings.require_capability(id, Capability::Admin).await);
    }

    #[tokio::test]
    async fn unbind_reverts_to_guest() {
        let bindings = SessionBindings::new();
        let id = ConnectionId::new();
        bindings.bind(id, identity(&[])).await;

        assert!(bindings.unbind(id).await.is_some());
        assert!(bindings.current_identity(id).await.is_guest());
        assert!(bindings.is_empty().await);
    }
}
