//! Account records.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::{AccountId, Role};

use super::FarmerResponse;

/// A marketplace account as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: AccountId,
    pub email: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub roles: Vec<Role>,
    pub created_at: Option<NaiveDateTime>,
}

impl AccountResponse {
    /// Whether the account holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Account profile fields. Used for both full (PUT) and partial (PATCH)
/// updates; unset fields are omitted from the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
}

/// Request body for deleting an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAccountRequest {
    pub id: AccountId,
}

/// Request to open a farm on the current account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeToFarmerRequest {
    pub name: String,
    pub description: String,
}

/// Result of upgrading to a farmer account. Newer backends re-issue the
/// token pair so the farmer role takes effect immediately; older ones send
/// only the farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeToFarmerResponse {
    #[serde(default)]
    pub farmer_response: Option<FarmerResponse>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_account_response_decodes_backend_shape() {
        let json = r#"{
            "id": "a1",
            "email": "lan@nongsan.vn",
            "displayName": "Lan",
            "phone": null,
            "avatar": null,
            "dob": "1995-04-30",
            "roles": ["CONSUMER", "FARMER"],
            "createdAt": "2024-06-01T08:30:00"
        }"#;
        let account: AccountResponse = serde_json::from_str(json).unwrap();
        assert!(account.has_role(Role::Farmer));
        assert!(!account.has_role(Role::Admin));
        assert_eq!(account.dob.unwrap().to_string(), "1995-04-30");
    }

    #[test]
    fn test_patch_request_omits_unset_fields() {
        let request = AccountRequest {
            display_name: Some("Hùng".to_string()),
            ..AccountRequest::default()
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"displayName":"Hùng"}"#
        );
    }
}
