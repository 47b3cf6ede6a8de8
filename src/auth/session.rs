//! Role Session
//! Mission: Resolve the current admin's role once per authenticated lifetime

use crate::auth::gateway::{ApiGateway, GatewayError};
use crate::auth::models::{AdminRole, MyRoleResponse};
use crate::auth::signal::SessionObserver;
use crate::auth::store::TokenStore;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

pub const MY_ROLE_PATH: &str = "/admin/auth/my-role";

/// Role resolution states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleState {
    /// Role fetch not yet settled (loading)
    Unresolved,
    /// No authenticated admin
    Anonymous,
    /// Role fetch succeeded
    Resolved(AdminRole),
}

/// Holds the resolved role for the rendering surface.
///
/// Owned by the application root and shared read-only; callers mutate it
/// only through [`refresh`](Self::refresh) and [`invalidate`](Self::invalidate).
/// Subscribed to the session signal as a weak observer, so gateway-detected
/// expiry converges it to `Anonymous` without a round trip.
pub struct RoleSession {
    state: RwLock<RoleState>,
    store: Arc<TokenStore>,
    gateway: ApiGateway,
}

impl RoleSession {
    pub fn new(store: Arc<TokenStore>, gateway: ApiGateway) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(RoleState::Unresolved),
            store,
            gateway,
        })
    }

    pub fn state(&self) -> RoleState {
        *self.state.read()
    }

    pub fn role(&self) -> Option<AdminRole> {
        match self.state() {
            RoleState::Resolved(role) => Some(role),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state() == RoleState::Unresolved
    }

    /// Re-resolves the role through the gateway. Runs once at startup and
    /// explicitly after login; never per navigation.
    ///
    /// A 401/403 lands in `Anonymous` (the gateway already tore the
    /// credentials down). Any other failure leaves an already-resolved role
    /// in place and only settles the loading flag.
    pub async fn refresh(&self) {
        if !self.store.is_authenticated() {
            *self.state.write() = RoleState::Anonymous;
            return;
        }

        match self.gateway.get_json::<MyRoleResponse>(MY_ROLE_PATH).await {
            Ok(payload) => {
                debug!("Resolved admin role: {}", payload.role.as_str());
                *self.state.write() = RoleState::Resolved(payload.role);
            }
            Err(GatewayError::SessionExpired) => {
                *self.state.write() = RoleState::Anonymous;
            }
            Err(e) => {
                warn!("Role fetch failed, keeping previous role: {}", e);
                let mut state = self.state.write();
                if *state == RoleState::Unresolved {
                    *state = RoleState::Anonymous;
                }
            }
        }
    }

    /// Forces `Anonymous` without a network round trip. Used by logout and
    /// by the session signal; safe to call repeatedly.
    pub fn invalidate(&self) {
        *self.state.write() = RoleState::Anonymous;
    }

    #[cfg(test)]
    pub(crate) fn force_state(&self, state: RoleState) {
        *self.state.write() = state;
    }
}

impl SessionObserver for RoleSession {
    fn on_session_expired(&self) {
        debug!("Role session received expiry signal");
        self.invalidate();
    }
}
