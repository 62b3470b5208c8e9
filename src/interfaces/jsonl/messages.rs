use crate::application::order_initiator::OrderCreated;
use crate::application::payment_verifier::VerificationOutcome;
use crate::application::requests::{CreateOrderRequest, VerifyPaymentRequest};
use crate::error::PaymentError;
use serde::{Deserialize, Serialize};

/// One input line, tagged by operation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    CreateOrder(CreateOrderRequest),
    VerifyPayment(VerifyPaymentRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedResponse {
    pub success: bool,
    pub order_id: String,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentVerifiedResponse {
    pub success: bool,
    pub credits: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// HTTP-equivalent status: 4xx for caller mistakes, 5xx for downstream failures.
    pub status: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    OrderCreated(OrderCreatedResponse),
    PaymentVerified(PaymentVerifiedResponse),
    Error(ErrorResponse),
}

impl From<OrderCreated> for Response {
    fn from(created: OrderCreated) -> Self {
        Self::OrderCreated(OrderCreatedResponse {
            success: true,
            order_id: created.order_id,
            amount: created.amount,
        })
    }
}

impl From<VerificationOutcome> for Response {
    fn from(outcome: VerificationOutcome) -> Self {
        Self::PaymentVerified(PaymentVerifiedResponse {
            success: true,
            credits: outcome.credits(),
            message: outcome.message().to_string(),
        })
    }
}

impl From<&PaymentError> for Response {
    fn from(error: &PaymentError) -> Self {
        Self::Error(ErrorResponse {
            error: error.public_message(),
            status: error.status_code(),
        })
    }
}
