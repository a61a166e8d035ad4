//! Status enums for various entities.
//!
//! All statuses travel as `SCREAMING_SNAKE_CASE` strings, matching the
//! backend's Java enums.

use serde::{Deserialize, Serialize};

/// Generates `as_str`, `Display` and `FromStr` for a wire enum.
macro_rules! wire_enum {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The value used on the wire.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_uppercase().as_str() {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(format!(
                        concat!("invalid ", stringify!($name), ": {}"),
                        s
                    )),
                }
            }
        }
    };
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Moderates users, farms, products and orders.
    Admin,
    /// Browses and buys products.
    Consumer,
    /// Sells products and fulfils orders.
    Farmer,
    /// Agricultural specialist.
    Specialist,
}

wire_enum!(Role {
    Admin => "ADMIN",
    Consumer => "CONSUMER",
    Farmer => "FARMER",
    Specialist => "SPECIALIST",
});

/// Who is asking for an order status change.
///
/// Consumers and farmers hit different endpoints and may only move an
/// order along their own edges of the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderActor {
    Consumer,
    Farmer,
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Delivering,
    Delivered,
    Received,
    Canceled,
}

wire_enum!(OrderStatus {
    Pending => "PENDING",
    Confirmed => "CONFIRMED",
    Delivering => "DELIVERING",
    Delivered => "DELIVERED",
    Received => "RECEIVED",
    Canceled => "CANCELED",
});

impl OrderStatus {
    /// Whether `actor` may move an order from `self` to `next`.
    ///
    /// Mirrors the rules the backend enforces, so a client can refuse a
    /// change that would only come back as a 403.
    #[must_use]
    pub const fn can_transition(self, actor: OrderActor, next: Self) -> bool {
        match (actor, next) {
            (_, Self::Canceled) => !matches!(self, Self::Received),
            (OrderActor::Consumer, Self::Received) => matches!(self, Self::Delivered),
            (OrderActor::Farmer, Self::Confirmed) => matches!(self, Self::Pending),
            (OrderActor::Farmer, Self::Delivering) => matches!(self, Self::Confirmed),
            (OrderActor::Farmer, Self::Delivered) => matches!(self, Self::Delivering),
            _ => false,
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Received | Self::Canceled)
    }
}

/// Product listing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    /// Listed and purchasable.
    Active,
    /// Blocked by an admin.
    Blocked,
    /// Deleted by its farmer.
    Deleted,
    /// Awaiting admin review.
    #[default]
    Pending,
    /// Rejected by an admin.
    Rejected,
}

wire_enum!(ProductStatus {
    Active => "ACTIVE",
    Blocked => "BLOCKED",
    Deleted => "DELETED",
    Pending => "PENDING",
    Rejected => "REJECTED",
});

/// Farm status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FarmerStatus {
    #[default]
    Active,
    /// Paused by the farmer.
    SelfBlock,
    /// Blocked by an admin.
    AdminBlock,
}

wire_enum!(FarmerStatus {
    Active => "ACTIVE",
    SelfBlock => "SELF_BLOCK",
    AdminBlock => "ADMIN_BLOCK",
});

/// OCOP certificate verification status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OcopStatus {
    #[default]
    PendingVerify,
    Verified,
    Rejected,
}

wire_enum!(OcopStatus {
    PendingVerify => "PENDING_VERIFY",
    Verified => "VERIFIED",
    Rejected => "REJECTED",
});

/// Order payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
    Canceled,
}

wire_enum!(PaymentStatus {
    Pending => "PENDING",
    Paid => "PAID",
    Failed => "FAILED",
    Refunded => "REFUNDED",
    Canceled => "CANCELED",
});

/// How an order is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    /// Online payment through VNPay.
    Vnpay,
}

wire_enum!(PaymentMethod {
    Cod => "COD",
    Vnpay => "VNPAY",
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&FarmerStatus::SelfBlock).unwrap(),
            "\"SELF_BLOCK\""
        );
        assert_eq!(
            serde_json::from_str::<OcopStatus>("\"PENDING_VERIFY\"").unwrap(),
            OcopStatus::PendingVerify
        );
        assert_eq!(PaymentMethod::Vnpay.to_string(), "VNPAY");
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("farmer".parse::<Role>().unwrap(), Role::Farmer);
        assert_eq!(
            "Delivering".parse::<OrderStatus>().unwrap(),
            OrderStatus::Delivering
        );
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_consumer_transitions() {
        use OrderActor::Consumer;
        assert!(OrderStatus::Pending.can_transition(Consumer, OrderStatus::Canceled));
        assert!(OrderStatus::Delivered.can_transition(Consumer, OrderStatus::Received));
        assert!(!OrderStatus::Delivering.can_transition(Consumer, OrderStatus::Received));
        assert!(!OrderStatus::Received.can_transition(Consumer, OrderStatus::Canceled));
        assert!(!OrderStatus::Pending.can_transition(Consumer, OrderStatus::Confirmed));
    }

    #[test]
    fn test_farmer_transitions() {
        use OrderActor::Farmer;
        assert!(OrderStatus::Pending.can_transition(Farmer, OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition(Farmer, OrderStatus::Delivering));
        assert!(OrderStatus::Delivering.can_transition(Farmer, OrderStatus::Delivered));
        assert!(!OrderStatus::Pending.can_transition(Farmer, OrderStatus::Delivered));
        assert!(!OrderStatus::Delivered.can_transition(Farmer, OrderStatus::Received));
        assert!(OrderStatus::Delivered.can_transition(Farmer, OrderStatus::Canceled));
    }

    #[test]
    fn test_final_statuses() {
        assert!(OrderStatus::Received.is_final());
        assert!(OrderStatus::Canceled.is_final());
        assert!(!OrderStatus::Delivered.is_final());
    }
}
