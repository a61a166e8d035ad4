//! Authentication requests and token responses.

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, Role};

/// Registration request. The backend emails a verification link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Login request. Admin sign-in sends `Role::Admin`; everyone else logs in
/// as a consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Access/refresh token pair issued by login, refresh and verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    /// Absent on some refresh responses; keep the previous one then.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Body for `/auth/refresh-token` and `/auth/logout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Completes a password reset with the code the backend emailed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyForgotPasswordRequest {
    pub code: String,
    pub new_password: String,
}

/// The signed-in account's profile summary from `/auth/info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub id: Option<AccountId>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}
