//! Application layer containing the purchase flow orchestration.
//!
//! `CreditEngine` is the entry point. It delegates to the `OrderInitiator`
//! (gateway order + pending record) and the `PaymentVerifier` (signature check
//! + atomic settlement).

pub mod engine;
pub mod order_initiator;
pub mod payment_verifier;
pub mod requests;
