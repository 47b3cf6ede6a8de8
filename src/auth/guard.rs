//! Route Guard
//! Mission: Decide, per navigation, whether a protected surface may render

use crate::auth::models::AdminRole;
use crate::auth::session::{RoleSession, RoleState};
use crate::auth::store::TokenStore;
use std::sync::Arc;

/// Outcome of one guard evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// No credentials held; send the user to the login entry point
    RedirectToLogin,
    /// Role still in flight; show a placeholder, neither redirect nor render
    Pending,
    /// Authenticated but not allowed here; send to the default page
    RedirectToDefault,
    /// Allowed through
    Render,
}

/// Gates a protected subtree on authentication and an optional role
/// allow-list. Stateless between evaluations; reads the store and session
/// fresh every time.
pub struct RouteGuard {
    store: Arc<TokenStore>,
    session: Arc<RoleSession>,
}

impl RouteGuard {
    pub fn new(store: Arc<TokenStore>, session: Arc<RoleSession>) -> Self {
        Self { store, session }
    }

    /// An empty allow-list means the route only requires authentication,
    /// not a specific role. The role is never consulted while
    /// unauthenticated, so a stale session cannot mask a missing login.
    pub fn evaluate(&self, allowed_roles: &[AdminRole]) -> RouteDecision {
        if !self.store.is_authenticated() {
            return RouteDecision::RedirectToLogin;
        }

        match self.session.state() {
            RoleState::Unresolved => RouteDecision::Pending,
            RoleState::Anonymous => {
                if allowed_roles.is_empty() {
                    RouteDecision::Render
                } else {
                    RouteDecision::RedirectToDefault
                }
            }
            RoleState::Resolved(role) => {
                if allowed_roles.is_empty() || allowed_roles.contains(&role) {
                    RouteDecision::Render
                } else {
                    RouteDecision::RedirectToDefault
                }
            }
        }
    }
}
