//! Delivery addresses.

use serde::{Deserialize, Serialize};

use crate::types::AddressId;

/// Address fields sent when creating or updating an address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub receiver_name: String,
    pub receiver_phone: String,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub id: AddressId,
    pub receiver_name: Option<String>,
    pub receiver_phone: Option<String>,
    pub province: Option<String>,
    /// Not every backend version returns the district.
    #[serde(default)]
    pub district: Option<String>,
    pub ward: Option<String>,
    pub detail: Option<String>,
    #[serde(default)]
    pub is_default: Option<bool>,
}

impl AddressResponse {
    /// One-line form: detail, ward, district, province.
    #[must_use]
    pub fn one_line(&self) -> String {
        [&self.detail, &self.ward, &self.district, &self.province]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_line_skips_missing_parts() {
        let address = AddressResponse {
            id: AddressId::new("ad1"),
            receiver_name: Some("Mai".to_string()),
            receiver_phone: None,
            province: Some("Lâm Đồng".to_string()),
            district: None,
            ward: Some("Phường 1".to_string()),
            detail: Some("12 Trần Phú".to_string()),
            is_default: Some(true),
        };
        assert_eq!(address.one_line(), "12 Trần Phú, Phường 1, Lâm Đồng");
    }
}
