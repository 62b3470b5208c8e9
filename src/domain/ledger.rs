use super::account::Amount;
use super::order::Order;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryType {
    CreditPurchase,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryStatus {
    Success,
}

/// Immutable audit record written once per settled order.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: String,
    pub r#type: LedgerEntryType,
    /// Credits granted.
    pub amount: u32,
    pub order_id: String,
    pub payment_id: String,
    pub amount_paid: Amount,
    pub status: LedgerEntryStatus,
    pub timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn credit_purchase(order: &Order, payment_id: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: order.user_id.clone(),
            r#type: LedgerEntryType::CreditPurchase,
            amount: order.credits,
            order_id: order.order_id.clone(),
            payment_id: payment_id.to_string(),
            amount_paid: order.amount,
            status: LedgerEntryStatus::Success,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_credit_purchase_entry() {
        let order = Order::new(
            "order_1",
            "user_1",
            Amount::new(dec!(99)).unwrap(),
            10,
            None,
            Utc::now(),
        );
        let entry = LedgerEntry::credit_purchase(&order, "pay_1", Utc::now());
        let other = LedgerEntry::credit_purchase(&order, "pay_1", Utc::now());

        assert_ne!(entry.id, other.id);
        assert_eq!(entry.amount, 10);
        assert_eq!(entry.amount_paid.value(), dec!(99));

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "credit_purchase");
        assert_eq!(json["status"], "success");
        assert_eq!(json["paymentId"], "pay_1");
    }
}
