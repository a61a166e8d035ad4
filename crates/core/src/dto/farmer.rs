//! Farm (farmer) records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::{FarmerId, FarmerStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerResponse {
    pub id: FarmerId,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
    pub rating: Option<f64>,
    pub description: Option<String>,
    #[serde(default)]
    pub status: FarmerStatus,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Full replacement of the farm profile (PUT).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerUpdateRequest {
    pub name: String,
    pub avatar: String,
    pub cover_image: String,
    pub description: String,
}

/// Partial farm profile update (PATCH).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerPatchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeFarmerStatusRequest {
    pub status: FarmerStatus,
}
