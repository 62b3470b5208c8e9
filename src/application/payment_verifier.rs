use super::requests::{VerifyPayment, VerifyPaymentRequest};
use crate::config::KeySecret;
use crate::domain::account::UserBalance;
use crate::domain::ledger::LedgerEntry;
use crate::domain::ports::LedgerStoreRef;
use crate::domain::signature;
use crate::domain::transaction::{ReadSet, Snapshot, WriteSet};
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

pub const MESSAGE_SETTLED: &str = "Payment successful";
pub const MESSAGE_ALREADY_PROCESSED: &str = "Already processed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// This call credited the user.
    Settled { credits: u32 },
    /// The order had been settled before; nothing was written.
    AlreadyProcessed { credits: u32 },
}

impl VerificationOutcome {
    pub fn credits(&self) -> u32 {
        match self {
            Self::Settled { credits } | Self::AlreadyProcessed { credits } => *credits,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Settled { .. } => MESSAGE_SETTLED,
            Self::AlreadyProcessed { .. } => MESSAGE_ALREADY_PROCESSED,
        }
    }
}

/// Verifies client-submitted payment proofs and settles orders.
///
/// Settlement credits the user, completes the order and appends a ledger entry
/// in one store transaction. The order status is re-read inside that
/// transaction, so concurrent calls for the same order credit it once.
pub struct PaymentVerifier {
    store: LedgerStoreRef,
    key_secret: KeySecret,
}

impl PaymentVerifier {
    pub fn new(store: LedgerStoreRef, key_secret: KeySecret) -> Self {
        Self { store, key_secret }
    }

    pub async fn verify_payment(&self, request: VerifyPaymentRequest) -> Result<VerificationOutcome> {
        let command = VerifyPayment::try_from(request).inspect_err(|e| {
            warn!(error = %e, "Rejected verification request");
        })?;

        signature::verify(
            self.key_secret.expose(),
            &command.order_id,
            &command.payment_id,
            &command.signature,
        )
        .inspect_err(|_| {
            warn!(order_id = %command.order_id, "Invalid payment signature");
        })?;

        self.settle(&command).await.inspect_err(|e| {
            if e.is_client_error() {
                warn!(order_id = %command.order_id, error = %e, "Verification rejected");
            } else {
                error!(order_id = %command.order_id, error = %e, "Settlement failed");
            }
        })
    }

    async fn settle(&self, command: &VerifyPayment) -> Result<VerificationOutcome> {
        let order = self
            .store
            .get_order(&command.order_id)
            .await
            .map_err(|e| PaymentError::SettlementError(Box::new(e)))?
            .ok_or_else(|| PaymentError::OrderNotFound(command.order_id.clone()))?;

        // A replay of a settled order is answered before ownership is checked
        if order.is_completed() {
            info!(order_id = %order.order_id, "Order already processed");
            return Ok(VerificationOutcome::AlreadyProcessed {
                credits: order.credits,
            });
        }

        if order.user_id != command.user_id {
            return Err(PaymentError::ValidationError(
                "Order does not belong to user".to_string(),
            ));
        }

        let read_set = ReadSet::new()
            .order(&order.order_id)
            .balance(&order.user_id);
        let write_fn = |snapshot: &Snapshot| {
            settlement_writes(snapshot, &order.order_id, &command.payment_id, Utc::now())
        };
        let committed = self
            .store
            .atomic_update(&read_set, &write_fn)
            .await
            .map_err(|e| PaymentError::SettlementError(Box::new(e)))?;

        if committed.is_empty() {
            // A concurrent call settled the order between our lookup and commit
            info!(order_id = %order.order_id, "Order settled concurrently");
            return Ok(VerificationOutcome::AlreadyProcessed {
                credits: order.credits,
            });
        }

        info!(
            order_id = %order.order_id,
            user_id = %order.user_id,
            payment_id = %command.payment_id,
            credits = order.credits,
            "Payment settled"
        );
        Ok(VerificationOutcome::Settled {
            credits: order.credits,
        })
    }
}

/// Computes the settlement of `order_id` against a transaction snapshot.
///
/// Returns an empty write set when the snapshot already shows the order as
/// completed.
pub fn settlement_writes(
    snapshot: &Snapshot,
    order_id: &str,
    payment_id: &str,
    now: DateTime<Utc>,
) -> Result<WriteSet> {
    let order = snapshot
        .order(order_id)
        .ok_or_else(|| PaymentError::OrderNotFound(order_id.to_string()))?;
    if order.is_completed() {
        return Ok(WriteSet::new());
    }

    let mut balance = snapshot
        .balance(&order.user_id)
        .cloned()
        .unwrap_or_else(|| UserBalance::new(&order.user_id));
    balance.credit(order.credits, now)?;

    let mut completed = order.clone();
    completed.complete(payment_id, now)?;
    let entry = LedgerEntry::credit_purchase(&completed, payment_id, now);

    Ok(WriteSet::new()
        .put_balance(balance)
        .put_order(completed)
        .insert_ledger_entry(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::Amount;
    use crate::domain::order::{Order, OrderStatus};
    use crate::domain::ports::LedgerStore;
    use crate::domain::transaction::Mutation;
    use crate::infrastructure::in_memory::InMemoryStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    const SECRET: &str = "testsecret";

    fn order(order_id: &str, user_id: &str, credits: u32) -> Order {
        Order::new(
            order_id,
            user_id,
            Amount::new(dec!(199)).unwrap(),
            credits,
            None,
            Utc::now(),
        )
    }

    fn request(order_id: &str, payment_id: &str, user_id: &str) -> VerifyPaymentRequest {
        VerifyPaymentRequest {
            order_id: Some(order_id.to_string()),
            payment_id: Some(payment_id.to_string()),
            signature: Some(signature::sign(SECRET, order_id, payment_id).unwrap()),
            user_id: Some(user_id.to_string()),
        }
    }

    async fn verifier_with(orders: Vec<Order>) -> (Arc<InMemoryStore>, PaymentVerifier) {
        let store = Arc::new(InMemoryStore::new());
        for order in orders {
            store.insert_order(order).await.unwrap();
        }
        let verifier = PaymentVerifier::new(store.clone(), KeySecret::new(SECRET));
        (store, verifier)
    }

    #[test]
    fn test_settlement_writes_fresh_order() {
        let mut snapshot = Snapshot::default();
        snapshot.insert_order(order("order_1", "user_1", 20));
        let mut balance = UserBalance::new("user_1");
        balance.total_credits = 50;
        snapshot.insert_balance(balance);

        let writes = settlement_writes(&snapshot, "order_1", "pay_1", Utc::now()).unwrap();
        let mutations = writes.mutations();
        assert_eq!(mutations.len(), 3);
        assert!(matches!(&mutations[0], Mutation::PutBalance(b) if b.total_credits == 70));
        assert!(matches!(
            &mutations[1],
            Mutation::PutOrder(o) if o.status == OrderStatus::Completed
                && o.payment_id.as_deref() == Some("pay_1")
        ));
        assert!(matches!(
            &mutations[2],
            Mutation::InsertLedgerEntry(e) if e.order_id == "order_1" && e.amount == 20
        ));
    }

    #[test]
    fn test_settlement_writes_absent_balance_starts_at_zero() {
        let mut snapshot = Snapshot::default();
        snapshot.insert_order(order("order_1", "user_1", 20));

        let writes = settlement_writes(&snapshot, "order_1", "pay_1", Utc::now()).unwrap();
        assert!(matches!(&writes.mutations()[0], Mutation::PutBalance(b) if b.total_credits == 20));
    }

    #[test]
    fn test_settlement_writes_completed_order_is_noop() {
        let mut completed = order("order_1", "user_1", 20);
        completed.complete("pay_1", Utc::now()).unwrap();
        let mut snapshot = Snapshot::default();
        snapshot.insert_order(completed);

        let writes = settlement_writes(&snapshot, "order_1", "pay_2", Utc::now()).unwrap();
        assert!(writes.is_empty());
    }

    #[tokio::test]
    async fn test_verify_settles_once() {
        let (store, verifier) = verifier_with(vec![order("order_1", "user_1", 20)]).await;

        let first = verifier
            .verify_payment(request("order_1", "pay_1", "user_1"))
            .await
            .unwrap();
        assert_eq!(first, VerificationOutcome::Settled { credits: 20 });
        assert_eq!(first.message(), "Payment successful");

        let second = verifier
            .verify_payment(request("order_1", "pay_1", "user_1"))
            .await
            .unwrap();
        assert_eq!(second, VerificationOutcome::AlreadyProcessed { credits: 20 });
        assert_eq!(second.message(), "Already processed");

        let balance = store.get_balance("user_1").await.unwrap().unwrap();
        assert_eq!(balance.total_credits, 20);
        assert_eq!(store.ledger_entries("order_1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_signature_touches_nothing() {
        let (store, verifier) = verifier_with(vec![order("order_1", "user_1", 20)]).await;
        let mut bad = request("order_1", "pay_1", "user_1");
        bad.signature = Some(signature::sign("wrongsecret", "order_1", "pay_1").unwrap());

        let result = verifier.verify_payment(bad).await;
        assert!(matches!(result, Err(PaymentError::InvalidSignature)));
        assert!(!store.get_order("order_1").await.unwrap().unwrap().is_completed());
        assert!(store.get_balance("user_1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let (_store, verifier) = verifier_with(vec![]).await;

        let result = verifier
            .verify_payment(request("order_missing", "pay_1", "user_1"))
            .await;
        assert!(matches!(result, Err(PaymentError::OrderNotFound(_))));
    }

    #[tokio::test]
    async fn test_foreign_order_is_rejected() {
        let (store, verifier) = verifier_with(vec![order("order_1", "user_1", 20)]).await;

        let result = verifier
            .verify_payment(request("order_1", "pay_1", "user_2"))
            .await;
        assert!(matches!(result, Err(PaymentError::ValidationError(_))));
        assert!(store.get_balance("user_2").await.unwrap().is_none());
        assert!(store.get_balance("user_1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replay_by_other_user_is_already_processed() {
        let (store, verifier) = verifier_with(vec![order("order_1", "user_1", 20)]).await;
        verifier
            .verify_payment(request("order_1", "pay_1", "user_1"))
            .await
            .unwrap();

        let replay = verifier
            .verify_payment(request("order_1", "pay_1", "user_2"))
            .await
            .unwrap();
        assert_eq!(replay, VerificationOutcome::AlreadyProcessed { credits: 20 });

        assert_eq!(
            store.get_balance("user_1").await.unwrap().unwrap().total_credits,
            20
        );
        assert!(store.get_balance("user_2").await.unwrap().is_none());
        assert_eq!(store.ledger_entries("order_1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_fields_are_validation_errors() {
        let (_store, verifier) = verifier_with(vec![]).await;
        let mut incomplete = request("order_1", "pay_1", "user_1");
        incomplete.signature = None;

        let result = verifier.verify_payment(incomplete).await;
        assert!(matches!(result, Err(PaymentError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_store_refusal_leaves_order_created() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_order(order("order_2", "user_1", 5)).await.unwrap();
        // A stray ledger entry for the order makes the store refuse the commit
        let stray =
            LedgerEntry::credit_purchase(&order("order_2", "user_1", 5), "pay_0", Utc::now());
        store
            .atomic_update(&ReadSet::new(), &|_: &Snapshot| {
                Ok(WriteSet::new().insert_ledger_entry(stray.clone()))
            })
            .await
            .unwrap();
        let verifier = PaymentVerifier::new(store.clone(), KeySecret::new(SECRET));

        let result = verifier
            .verify_payment(request("order_2", "pay_2", "user_1"))
            .await;
        assert!(matches!(result, Err(PaymentError::SettlementError(_))));
        assert_eq!(result.unwrap_err().status_code(), 500);
        assert!(!store.get_order("order_2").await.unwrap().unwrap().is_completed());
        assert!(store.get_balance("user_1").await.unwrap().is_none());
    }
}
