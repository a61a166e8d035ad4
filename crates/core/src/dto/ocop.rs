//! OCOP ("One Commune One Product") certification records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::{ImageId, OcopId, OcopStatus};

/// Image attached to an OCOP certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcopImage {
    pub id: Option<ImageId>,
    pub path: String,
}

/// OCOP certificate attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcopProductResponse {
    pub id: OcopId,
    pub star: Option<u8>,
    pub certificate_number: Option<String>,
    pub issued_year: Option<i32>,
    pub issuer: Option<String>,
    #[serde(default)]
    pub status: OcopStatus,
    pub verified_by: Option<String>,
    pub verified_at: Option<NaiveDateTime>,
    /// Rejection reason, set when `status` is `Rejected`.
    pub reason: Option<String>,
    #[serde(default)]
    pub images: Vec<OcopImage>,
}

/// OCOP certificate details submitted by a farmer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcopRequest {
    /// Star rating, 3 to 5.
    pub star: u8,
    pub certificate_number: String,
    pub issued_year: i32,
    pub issuer: String,
    pub image_paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcopRejectRequest {
    pub reason: String,
}
