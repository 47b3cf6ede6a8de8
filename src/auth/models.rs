//! Session Models
//! Mission: Define the credential and role structures shared across the session core

use serde::{Deserialize, Serialize};

/// Administrative privilege levels, as the backend spells them
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AdminRole {
    #[serde(rename = "SUPER_ADMIN")]
    SuperAdmin, // Full platform control, including admin approval
    #[serde(rename = "ADMIN")]
    Admin, // Event and store management
    #[serde(rename = "MANAGER")]
    Manager, // Day-of-event operations
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "SUPER_ADMIN",
            AdminRole::Admin => "ADMIN",
            AdminRole::Manager => "MANAGER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SUPER_ADMIN" => Some(AdminRole::SuperAdmin),
            "ADMIN" => Some(AdminRole::Admin),
            "MANAGER" => Some(AdminRole::Manager),
            _ => None,
        }
    }
}

/// Credential pair returned by a successful login.
///
/// Replaces any prior pair as a unit; destroyed on logout or when the
/// backend rejects the access token. `expires_in` is informational only,
/// no client-side timer enforces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Login request body
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Role payload from the my-role endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct MyRoleResponse {
    pub role: AdminRole,
}

/// Signup request body for a new admin account
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub requested_role: AdminRole,
    pub reason: String,
}

/// Error payload shape the backend uses for rejected requests
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_role_serialization() {
        let super_admin = AdminRole::SuperAdmin;
        let json = serde_json::to_string(&super_admin).unwrap();
        assert_eq!(json, r#""SUPER_ADMIN""#);

        let manager: AdminRole = serde_json::from_str(r#""MANAGER""#).unwrap();
        assert_eq!(manager, AdminRole::Manager);
    }

    #[test]
    fn test_admin_role_string_conversion() {
        assert_eq!(AdminRole::SuperAdmin.as_str(), "SUPER_ADMIN");
        assert_eq!(AdminRole::Admin.as_str(), "ADMIN");
        assert_eq!(AdminRole::Manager.as_str(), "MANAGER");

        assert_eq!(AdminRole::from_str("ADMIN"), Some(AdminRole::Admin));
        assert_eq!(AdminRole::from_str("manager"), Some(AdminRole::Manager));
        assert_eq!(AdminRole::from_str("ROOT"), None);
    }

    #[test]
    fn test_credential_pair_defaults() {
        // tokenType and expiresIn are optional on the wire
        let pair: CredentialPair =
            serde_json::from_str(r#"{"accessToken":"a1","refreshToken":"r1"}"#).unwrap();
        assert_eq!(pair.access_token, "a1");
        assert_eq!(pair.refresh_token, "r1");
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, None);
    }

    #[test]
    fn test_signup_request_wire_shape() {
        let req = SignupRequest {
            email: "new.admin@rewear.kr".to_string(),
            password: "pass1234".to_string(),
            name: "New Admin".to_string(),
            requested_role: AdminRole::Manager,
            reason: "Seasonal event staff".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["requestedRole"], "MANAGER");
        assert_eq!(json["email"], "new.admin@rewear.kr");
    }
}
