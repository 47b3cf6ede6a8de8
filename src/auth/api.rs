//! Auth API Flows
//! Mission: Drive the admin auth endpoints and keep store and session in step

use crate::auth::gateway::{ApiGateway, GatewayError};
use crate::auth::models::{AdminRole, CredentialPair, LoginRequest, SignupRequest};
use crate::auth::session::RoleSession;
use crate::auth::store::TokenStore;
use std::sync::Arc;
use tracing::info;

pub const LOGIN_PATH: &str = "/admin/auth/login";
pub const SIGNUP_REQUESTS_PATH: &str = "/admin/auth/signup-requests";

const MIN_PASSWORD_LEN: usize = 8;

/// Input failures caught before any network call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    PasswordMismatch,
    PasswordTooShort,
    PasswordTooSimple,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::PasswordMismatch => write!(f, "Passwords do not match"),
            ValidationError::PasswordTooShort => {
                write!(f, "Password must be at least {} characters", MIN_PASSWORD_LEN)
            }
            ValidationError::PasswordTooSimple => {
                write!(f, "Password must contain at least one letter and one digit")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Flow failure modes
#[derive(Debug)]
pub enum AuthFlowError {
    Validation(ValidationError),
    Gateway(GatewayError),
    Storage(anyhow::Error),
}

impl std::fmt::Display for AuthFlowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthFlowError::Validation(e) => write!(f, "{}", e),
            AuthFlowError::Gateway(e) => write!(f, "{}", e),
            AuthFlowError::Storage(e) => write!(f, "Credential storage failed: {:#}", e),
        }
    }
}

impl std::error::Error for AuthFlowError {}

impl From<ValidationError> for AuthFlowError {
    fn from(e: ValidationError) -> Self {
        AuthFlowError::Validation(e)
    }
}

impl From<GatewayError> for AuthFlowError {
    fn from(e: GatewayError) -> Self {
        AuthFlowError::Gateway(e)
    }
}

/// Unvalidated signup form input
#[derive(Debug, Clone)]
pub struct SignupDraft {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub name: String,
    pub requested_role: AdminRole,
    pub reason: String,
}

/// Password confirmation and complexity, checked before the request body
/// even exists. A violation mutates nothing and issues nothing.
pub fn validate_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(ValidationError::PasswordTooSimple);
    }
    Ok(())
}

/// Typed client for the admin auth surface
pub struct AuthApi {
    gateway: ApiGateway,
    store: Arc<TokenStore>,
    session: Arc<RoleSession>,
}

impl AuthApi {
    pub fn new(gateway: ApiGateway, store: Arc<TokenStore>, session: Arc<RoleSession>) -> Self {
        Self {
            gateway,
            store,
            session,
        }
    }

    /// Logs in, persists the returned pair, and resolves the role for the
    /// new session. A rejected login surfaces the backend's message; a
    /// transport failure leaves any stored session untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthFlowError> {
        info!("🔐 Login attempt: {}", email);

        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let pair: CredentialPair = self.gateway.post_json_public(LOGIN_PATH, &body).await?;

        self.store
            .set_tokens(&pair)
            .map_err(AuthFlowError::Storage)?;
        self.session.refresh().await;

        info!("✅ Login successful: {}", email);
        Ok(())
    }

    /// Local teardown only; the backend holds no client session to revoke.
    pub fn logout(&self) -> Result<(), AuthFlowError> {
        self.store.clear_tokens().map_err(AuthFlowError::Storage)?;
        self.session.invalidate();
        info!("Logged out");
        Ok(())
    }

    /// Submits a signup request for a new admin account after local
    /// validation passes.
    pub async fn submit_signup_request(&self, draft: &SignupDraft) -> Result<(), AuthFlowError> {
        validate_password(&draft.password, &draft.password_confirm)?;

        let body = SignupRequest {
            email: draft.email.clone(),
            password: draft.password.clone(),
            name: draft.name.clone(),
            requested_role: draft.requested_role,
            reason: draft.reason.clone(),
        };
        self.gateway
            .post_public(SIGNUP_REQUESTS_PATH, &body)
            .await?;

        info!("Signup request submitted for {}", draft.email);
        Ok(())
    }

    pub async fn approve_signup(&self, id: u64) -> Result<(), AuthFlowError> {
        self.gateway
            .post_empty(&format!("{}/{}/approve", SIGNUP_REQUESTS_PATH, id))
            .await?;
        info!("✅ Approved signup request {}", id);
        Ok(())
    }

    pub async fn reject_signup(&self, id: u64) -> Result<(), AuthFlowError> {
        self.gateway
            .post_empty(&format!("{}/{}/reject", SIGNUP_REQUESTS_PATH, id))
            .await?;
        info!("Rejected signup request {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_validation_accepts_reasonable_input() {
        assert_eq!(validate_password("winter2026", "winter2026"), Ok(()));
    }

    #[test]
    fn test_password_mismatch_rejected() {
        assert_eq!(
            validate_password("winter2026", "winter2027"),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn test_short_password_rejected() {
        assert_eq!(
            validate_password("abc1", "abc1"),
            Err(ValidationError::PasswordTooShort)
        );
    }

    #[test]
    fn test_simple_password_rejected() {
        assert_eq!(
            validate_password("onlyletters", "onlyletters"),
            Err(ValidationError::PasswordTooSimple)
        );
        assert_eq!(
            validate_password("12345678", "12345678"),
            Err(ValidationError::PasswordTooSimple)
        );
    }

    #[test]
    fn test_mismatch_reported_before_complexity() {
        // The user fixes one problem at a time; mismatch comes first
        assert_eq!(
            validate_password("short1", "short2"),
            Err(ValidationError::PasswordMismatch)
        );
    }
}
