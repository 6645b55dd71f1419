//! Orders
//!
//! An order is created once, when checkout is finalised with a payment proof,
//! and afterwards only its status changes.

use std::fmt;

use jiff::civil::{Date, Time};
use serde::{Deserialize, Serialize};

use crate::{cart::CartLine, regions::Region};

pub mod store;

pub use store::{ORDERS_KEY, OrderStore};

/// Payment method label recorded on every order.
pub const BANK_TRANSFER: &str = "Transfer Bank";

/// Short time-derived order code, e.g. `ORD-482913`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Builds an id from the last six digits of a millisecond timestamp.
    pub fn from_millis(millis: i64) -> Self {
        Self(format!("ORD-{:06}", millis.rem_euclid(1_000_000)))
    }

    /// The id as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Status of a persisted order, stored as its display label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    /// Proof attached, waiting for an admin to check the transfer
    AwaitingVerification,

    /// Transfer verified
    Paid,

    /// Status written by earlier versions, treated as pending
    New,

    /// Any other stored label
    Other(String),
}

impl OrderStatus {
    /// Stored and displayed label.
    pub fn label(&self) -> &str {
        match self {
            OrderStatus::AwaitingVerification => "Menunggu Verifikasi Admin",
            OrderStatus::Paid => "LUNAS",
            OrderStatus::New => "Baru",
            OrderStatus::Other(label) => label,
        }
    }

    /// Pending orders wait in the admin review queue.
    pub fn is_pending(&self) -> bool {
        matches!(self, OrderStatus::AwaitingVerification | OrderStatus::New)
    }

    /// Whether documents for this status render as a paid invoice.
    pub fn is_paid(&self) -> bool {
        self.label().to_lowercase().contains("lunas")
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for OrderStatus {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Menunggu Verifikasi Admin" => OrderStatus::AwaitingVerification,
            "LUNAS" => OrderStatus::Paid,
            "Baru" => OrderStatus::New,
            _ => OrderStatus::Other(label),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(label) => label,
            status => status.label().to_string(),
        }
    }
}

/// A finalised checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order code
    pub id: OrderId,

    /// Purchaser display name
    pub purchaser: String,

    /// Purchaser phone
    pub phone: String,

    /// Purchaser region, absent on older records
    #[serde(default)]
    pub region: Option<Region>,

    /// Cart total at submission, in whole Rupiah
    pub total: i64,

    /// Current status
    pub status: OrderStatus,

    /// Line names, for quick display
    pub items: Vec<String>,

    /// Cart lines at submission, used to regenerate documents
    #[serde(default)]
    pub cart_items: Option<Vec<CartLine>>,

    /// Submission date
    pub date: Date,

    /// Requested ceremony date
    pub event_date: Date,

    /// Requested ceremony time
    pub event_time: Time,

    /// Payment method label
    #[serde(default = "default_payment_method")]
    pub payment_method: String,

    /// Whether a payment proof was attached
    #[serde(default)]
    pub has_proof: bool,
}

fn default_payment_method() -> String {
    BANK_TRANSFER.to_string()
}

impl Order {
    /// The embedded cart lines, if present and non-empty.
    pub fn snapshot(&self) -> Option<&[CartLine]> {
        self.cart_items
            .as_deref()
            .filter(|lines| !lines.is_empty())
    }

    /// Whether the order was placed by this purchaser, matching phone or name.
    pub fn placed_by(&self, name: &str, phone: &str) -> bool {
        self.phone == phone || self.purchaser == name
    }

    /// Copy of the order under a new status.
    #[must_use]
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }
}
