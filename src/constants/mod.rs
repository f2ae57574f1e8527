use serde::{Deserialize, Serialize};

/// Payment method tags as they appear on the wire and in the database
pub mod payment_methods {
    pub const CASH: &str = "cash";
    pub const CARD: &str = "card";
    pub const WALLET: &str = "wallet";
    pub const UPI: &str = "upi";

    pub const ALL: &[&str] = &[CASH, CARD, WALLET, UPI];
}

/// User-facing messages for each vendor status
pub mod vendor_messages {
    pub const PENDING: &str = "Your vendor account is pending approval";
    pub const ACTIVE: &str = "Your vendor account is active";
    pub const SUSPENDED: &str = "Your vendor account has been suspended. Please contact support";
    pub const REJECTED: &str = "Your vendor application was rejected. Please review your documents and resubmit";
    pub const NOT_FOUND: &str = "Vendor not found";
    pub const DOCUMENT_APPROVED: &str = "Document approved";
    pub const DOCUMENT_REJECTED: &str = "Document rejected";
}

/// Defaults applied to newly onboarded vendors
pub mod vendor_defaults {
    pub const COMMISSION_RATE_PERCENT: f64 = 15.0;
    pub const DELIVERY_RADIUS_KM: f64 = 5.0;
    pub const MIN_ORDER_AMOUNT: f64 = 0.0;
    pub const PREPARATION_TIME_MINUTES: i32 = 30;
    pub const STARTING_RATING: f64 = 0.0;
    pub const CURRENCY: &str = "USD";

    /// Seed row for the vendor_types table
    #[derive(Debug, Clone, Copy)]
    pub struct VendorTypeSeed {
        pub name: &'static str,
        pub slug: &'static str,
        pub description: &'static str,
    }

    pub const VENDOR_TYPES: &[VendorTypeSeed] = &[
        VendorTypeSeed {
            name: "Restaurant",
            slug: "restaurant",
            description: "Cooked meals prepared to order",
        },
        VendorTypeSeed {
            name: "Grocery",
            slug: "grocery",
            description: "Fresh produce and household staples",
        },
        VendorTypeSeed {
            name: "Pharmacy",
            slug: "pharmacy",
            description: "Medicines and personal care",
        },
        VendorTypeSeed {
            name: "Bakery",
            slug: "bakery",
            description: "Bread, cakes and pastries",
        },
        VendorTypeSeed {
            name: "Convenience Store",
            slug: "convenience-store",
            description: "Snacks, drinks and everyday essentials",
        },
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Wallet,
    Upi,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => payment_methods::CASH,
            PaymentMethod::Card => payment_methods::CARD,
            PaymentMethod::Wallet => payment_methods::WALLET,
            PaymentMethod::Upi => payment_methods::UPI,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            payment_methods::CASH => Some(PaymentMethod::Cash),
            payment_methods::CARD => Some(PaymentMethod::Card),
            payment_methods::WALLET => Some(PaymentMethod::Wallet),
            payment_methods::UPI => Some(PaymentMethod::Upi),
            _ => None,
        }
    }

    /// Settled inside the platform, without an external gateway
    pub fn is_internal(&self) -> bool {
        matches!(self, PaymentMethod::Cash | PaymentMethod::Wallet)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentGateway {
    Stripe,
    Razorpay,
    Paypal,
    Internal,
}

impl PaymentGateway {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentGateway::Stripe => "stripe",
            PaymentGateway::Razorpay => "razorpay",
            PaymentGateway::Paypal => "paypal",
            PaymentGateway::Internal => "internal",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "stripe" => PaymentGateway::Stripe,
            "razorpay" => PaymentGateway::Razorpay,
            "paypal" => PaymentGateway::Paypal,
            _ => PaymentGateway::Internal,
        }
    }
}

/// Review state of an uploaded vendor document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "approved" => DocumentStatus::Approved,
            "rejected" => DocumentStatus::Rejected,
            _ => DocumentStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VendorStatus {
    Pending,
    Active,
    Suspended,
    Rejected,
}

impl VendorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorStatus::Pending => "pending",
            VendorStatus::Active => "active",
            VendorStatus::Suspended => "suspended",
            VendorStatus::Rejected => "rejected",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "active" => VendorStatus::Active,
            "suspended" => VendorStatus::Suspended,
            "rejected" => VendorStatus::Rejected,
            _ => VendorStatus::Pending,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            VendorStatus::Pending => vendor_messages::PENDING,
            VendorStatus::Active => vendor_messages::ACTIVE,
            VendorStatus::Suspended => vendor_messages::SUSPENDED,
            VendorStatus::Rejected => vendor_messages::REJECTED,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    ReadyForPickup,
    PickedUp,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::ReadyForPickup => "ready_for_pickup",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "confirmed" => OrderStatus::Confirmed,
            "preparing" => OrderStatus::Preparing,
            "ready_for_pickup" => OrderStatus::ReadyForPickup,
            "picked_up" => OrderStatus::PickedUp,
            "delivered" => OrderStatus::Delivered,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Vendor,
    Driver,
    Admin,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [
        UserRole::Customer,
        UserRole::Vendor,
        UserRole::Driver,
        UserRole::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Vendor => "vendor",
            UserRole::Driver => "driver",
            UserRole::Admin => "admin",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "vendor" => UserRole::Vendor,
            "driver" => UserRole::Driver,
            "admin" => UserRole::Admin,
            _ => UserRole::Customer,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "credit",
            TransactionType::Debit => "debit",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "credit" => TransactionType::Credit,
            _ => TransactionType::Debit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_tags_match_constants() {
        for tag in payment_methods::ALL {
            let method = PaymentMethod::from_tag(tag).expect("known tag");
            assert_eq!(method.as_str(), *tag);
        }
        assert_eq!(PaymentMethod::from_tag("bitcoin"), None);
    }

    #[test]
    fn payment_method_serializes_as_tag() {
        let json = serde_json::to_string(&PaymentMethod::Upi).unwrap();
        assert_eq!(json, "\"upi\"");
        let parsed: PaymentMethod = serde_json::from_str("\"wallet\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Wallet);
    }

    #[test]
    fn unknown_db_values_fall_back_conservatively() {
        assert_eq!(VendorStatus::from_db("bogus"), VendorStatus::Pending);
        assert_eq!(DocumentStatus::from_db(""), DocumentStatus::Pending);
        assert_eq!(UserRole::from_db("root"), UserRole::Customer);
        assert_eq!(OrderStatus::from_db("lost"), OrderStatus::Pending);
    }

    #[test]
    fn vendor_status_messages() {
        assert_eq!(VendorStatus::Pending.message(), vendor_messages::PENDING);
        assert_eq!(VendorStatus::Suspended.message(), vendor_messages::SUSPENDED);
        assert_eq!(VendorStatus::from_db("active").message(), vendor_messages::ACTIVE);
    }

    #[test]
    fn order_status_uses_snake_case() {
        let json = serde_json::to_string(&OrderStatus::ReadyForPickup).unwrap();
        assert_eq!(json, "\"ready_for_pickup\"");
        assert_eq!(OrderStatus::from_db("picked_up"), OrderStatus::PickedUp);
    }

    #[test]
    fn vendor_type_seeds_have_unique_slugs() {
        let mut slugs: Vec<&str> = vendor_defaults::VENDOR_TYPES.iter().map(|s| s.slug).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), vendor_defaults::VENDOR_TYPES.len());
    }
}
