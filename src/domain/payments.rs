//! Payments domain models and types

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::document::Document;

const GATEWAY_PAYMENT_ID_PATTERN: &str = r"^[0-9A-Za-z_-]{1,64}$";

/// Payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
    Rejected,
    Cancelled,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Overdue => "OVERDUE",
            PaymentStatus::Rejected => "REJECTED",
            PaymentStatus::Cancelled => "CANCELLED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }

    /// Map a gateway status string onto the local status.
    ///
    /// Returns `None` for statuses the gateway may add in the future.
    pub fn from_gateway(status: &str) -> Option<Self> {
        match status {
            "approved" => Some(PaymentStatus::Paid),
            "pending" | "authorized" | "in_process" | "in_mediation" => Some(PaymentStatus::Pending),
            "rejected" => Some(PaymentStatus::Rejected),
            "cancelled" => Some(PaymentStatus::Cancelled),
            "refunded" | "charged_back" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

/// A payment made by a client, recorded manually or through the gateway
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: String,
    pub client_id: String,
    pub method: String,
    pub date: DateTime<Utc>,
    pub amount: f64,
    pub status: PaymentStatus,
    /// Correlation ID handed to the gateway; equal to `id` for checkouts
    pub external_reference: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// Apply the authoritative gateway state. Returns whether any field
    /// changed, so redelivered notifications converge without a write.
    pub fn apply_gateway_state(&mut self, state: &GatewayPayment) -> bool {
        let before = self.clone();

        if let Some(status) = PaymentStatus::from_gateway(&state.status) {
            self.status = status;
        }
        self.gateway_payment_id = Some(state.id.clone());
        if let Some(method) = state.method() {
            self.method = method.to_string();
        }
        if let Some(settled_at) = state.settled_at() {
            self.settled_at = Some(settled_at);
        }

        *self != before
    }
}

impl Document for Payment {
    const COLLECTION: &'static str = "payments";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Payment state as reported by the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayPayment {
    pub id: String,
    pub status: String,
    pub payment_method_id: Option<String>,
    pub payment_type_id: Option<String>,
    pub date_approved: Option<DateTime<Utc>>,
    pub date_last_updated: Option<DateTime<Utc>>,
    pub external_reference: Option<String>,
    pub transaction_amount: Option<f64>,
}

impl GatewayPayment {
    pub fn method(&self) -> Option<&str> {
        self.payment_method_id
            .as_deref()
            .or(self.payment_type_id.as_deref())
            .filter(|m| !m.is_empty())
    }

    /// Settlement date, taken from the gateway rather than the local clock.
    /// Only paid payments have one.
    pub fn settled_at(&self) -> Option<DateTime<Utc>> {
        match PaymentStatus::from_gateway(&self.status) {
            Some(PaymentStatus::Paid) => self.date_approved.or(self.date_last_updated),
            _ => None,
        }
    }
}

/// Gateway payment IDs are opaque tokens of letters, digits, `_` and `-`.
/// Anything else is refused before it reaches a gateway URL.
pub fn is_valid_gateway_payment_id(id: &str) -> bool {
    match Regex::new(GATEWAY_PAYMENT_ID_PATTERN) {
        Ok(pattern) => pattern.is_match(id),
        Err(_) => false,
    }
}

/// Result of processing one gateway notification
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationOutcome {
    Updated { payment_id: String, status: PaymentStatus },
    Unchanged { payment_id: String },
    /// The gateway payment does not correlate to a local record
    Unmatched { gateway_payment_id: String },
}

impl NotificationOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationOutcome::Updated { .. } => "updated",
            NotificationOutcome::Unchanged { .. } => "unchanged",
            NotificationOutcome::Unmatched { .. } => "unmatched",
        }
    }
}

/// Line item of a checkout, in the gateway's wire shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutItem {
    pub title: String,
    pub quantity: u32,
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payer details forwarded to the gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CheckoutPayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
}

/// Everything the gateway needs to create a checkout preference
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceRequest {
    pub items: Vec<CheckoutItem>,
    pub payer: CheckoutPayer,
    pub external_reference: String,
}

pub fn checkout_total(items: &[CheckoutItem]) -> f64 {
    items.iter().map(|item| item.unit_price * item.quantity as f64).sum()
}
