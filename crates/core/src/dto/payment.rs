//! Payment records.

use serde::{Deserialize, Serialize};

/// A VNPay checkout link for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreation {
    pub payment_url: String,
}
