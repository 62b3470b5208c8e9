//! Request payloads and their validated forms.
//!
//! Payloads keep every field optional so a missing field surfaces as a
//! `ValidationError` naming it, rather than as a deserialization failure.

use crate::domain::account::Amount;
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub amount: Option<Decimal>,
    pub credits: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_package_id")]
    pub package_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
    pub user_id: Option<String>,
}

/// Package ids arrive either as strings or as bare numbers.
fn deserialize_package_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::Text(text) => text,
            StringOrNumber::Number(number) => number.to_string(),
        }),
    )
}

/// A purchase request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOrder {
    pub amount: Amount,
    /// `amount` in minor currency units, as sent to the gateway.
    pub amount_minor: u64,
    pub credits: u32,
    pub package_id: Option<String>,
    pub user_id: String,
}

impl TryFrom<CreateOrderRequest> for CreateOrder {
    type Error = PaymentError;

    fn try_from(request: CreateOrderRequest) -> Result<Self> {
        match (
            request.amount.filter(|a| !a.is_zero()),
            request.credits.filter(|c| *c > 0),
            present(request.user_id),
        ) {
            (Some(amount), Some(credits), Some(user_id)) => {
                let amount = Amount::new(amount)?;
                let amount_minor = amount.to_minor_units()?;
                Ok(Self {
                    amount,
                    amount_minor,
                    credits,
                    package_id: present(request.package_id),
                    user_id,
                })
            }
            (amount, credits, user_id) => Err(missing_fields(&[
                ("amount", amount.is_some()),
                ("credits", credits.is_some()),
                ("userId", user_id.is_some()),
            ])),
        }
    }
}

/// A verification request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyPayment {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub user_id: String,
}

impl TryFrom<VerifyPaymentRequest> for VerifyPayment {
    type Error = PaymentError;

    fn try_from(request: VerifyPaymentRequest) -> Result<Self> {
        match (
            present(request.order_id),
            present(request.payment_id),
            present(request.signature),
            present(request.user_id),
        ) {
            (Some(order_id), Some(payment_id), Some(signature), Some(user_id)) => Ok(Self {
                order_id,
                payment_id,
                signature,
                user_id,
            }),
            (order_id, payment_id, signature, user_id) => Err(missing_fields(&[
                ("orderId", order_id.is_some()),
                ("paymentId", payment_id.is_some()),
                ("signature", signature.is_some()),
                ("userId", user_id.is_some()),
            ])),
        }
    }
}

/// Treats blank strings like absent ones. Values are kept verbatim since ids
/// feed into the signature.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn missing_fields(fields: &[(&str, bool)]) -> PaymentError {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, ok)| !ok)
        .map(|(name, _)| *name)
        .collect();
    PaymentError::ValidationError(format!("Missing required fields: {}", missing.join(", ")))
}
