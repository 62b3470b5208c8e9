use super::order_initiator::{OrderCreated, OrderInitiator};
use super::payment_verifier::{PaymentVerifier, VerificationOutcome};
use super::requests::{CreateOrderRequest, VerifyPaymentRequest};
use crate::config::KeySecret;
use crate::domain::ports::{LedgerStoreRef, PaymentGatewayRef};
use crate::error::Result;

/// The main entry point for the credit purchase flow.
///
/// `CreditEngine` wires the order initiator and the payment verifier to the
/// same store. It holds no mutable state of its own; all consistency comes
/// from the store's transactions, so one engine can serve concurrent callers.
pub struct CreditEngine {
    initiator: OrderInitiator,
    verifier: PaymentVerifier,
}

impl CreditEngine {
    /// Creates a new `CreditEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `store` - The store for orders, balances and ledger entries.
    /// * `gateway` - The payment gateway that mints orders.
    /// * `key_secret` - The gateway secret payment signatures are checked against.
    pub fn new(store: LedgerStoreRef, gateway: PaymentGatewayRef, key_secret: KeySecret) -> Self {
        Self {
            initiator: OrderInitiator::new(store.clone(), gateway),
            verifier: PaymentVerifier::new(store, key_secret),
        }
    }

    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<OrderCreated> {
        self.initiator.create_order(request).await
    }

    pub async fn verify_payment(&self, request: VerifyPaymentRequest) -> Result<VerificationOutcome> {
        self.verifier.verify_payment(request).await
    }
}
