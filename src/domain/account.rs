use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Represents a positive purchase amount in major currency units.
///
/// This is a wrapper around `rust_decimal::Decimal` so amounts never go through
/// floating point before being converted to the gateway's minor units.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Converts to minor units (paise), rejecting fractions of a minor unit.
    pub fn to_minor_units(&self) -> Result<u64> {
        let minor = self.0 * Decimal::ONE_HUNDRED;
        if !minor.fract().is_zero() {
            return Err(PaymentError::ValidationError(
                "Amount has more than two decimal places".to_string(),
            ));
        }
        minor
            .to_u64()
            .ok_or_else(|| PaymentError::ValidationError("Amount is too large".to_string()))
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Aggregate credit balance of a single user.
///
/// `total_credits` only ever grows through settlement. A user without a
/// stored record is treated as holding zero credits.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserBalance {
    pub user_id: String,
    pub total_credits: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_purchase_date: Option<DateTime<Utc>>,
}

impl UserBalance {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            total_credits: 0,
            last_purchase_date: None,
        }
    }

    /// Adds purchased credits and stamps the purchase date.
    pub fn credit(&mut self, credits: u32, at: DateTime<Utc>) -> Result<()> {
        self.total_credits = self
            .total_credits
            .checked_add(u64::from(credits))
            .ok_or_else(|| {
                PaymentError::ValidationError("Credit balance overflow".to_string())
            })?;
        self.last_purchase_date = Some(at);
        Ok(())
    }
}
