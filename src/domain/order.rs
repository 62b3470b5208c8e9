use super::account::Amount;
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Currency every order is placed in.
pub const CURRENCY: &str = "INR";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Completed,
}

/// One purchase attempt, keyed by the gateway-assigned order id.
///
/// An order moves from `Created` to `Completed` exactly once and is never
/// deleted, so it doubles as the audit record of the purchase.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub user_id: String,
    pub amount: Amount,
    pub credits: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
}

impl Order {
    pub fn new(
        order_id: impl Into<String>,
        user_id: impl Into<String>,
        amount: Amount,
        credits: u32,
        package_id: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            user_id: user_id.into(),
            amount,
            credits,
            package_id,
            status: OrderStatus::Created,
            created_at,
            completed_at: None,
            payment_id: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }

    /// Marks the order as paid. Fails if it was already completed.
    pub fn complete(&mut self, payment_id: &str, at: DateTime<Utc>) -> Result<()> {
        if self.is_completed() {
            return Err(PaymentError::ValidationError(format!(
                "Order {} is already completed",
                self.order_id
            )));
        }
        self.status = OrderStatus::Completed;
        self.payment_id = Some(payment_id.to_string());
        self.completed_at = Some(at);
        Ok(())
    }
}
