#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use credit_ledger::application::engine::CreditEngine;
use credit_ledger::application::requests::{CreateOrderRequest, VerifyPaymentRequest};
use credit_ledger::config::KeySecret;
use credit_ledger::domain::account::{Amount, UserBalance};
use credit_ledger::domain::ledger::LedgerEntry;
use credit_ledger::domain::order::Order;
use credit_ledger::domain::ports::{
    GatewayOrder, GatewayOrderRequest, LedgerStore, LedgerStoreRef, PaymentGateway,
    PaymentGatewayRef, TransactionFn,
};
use credit_ledger::domain::signature;
use credit_ledger::domain::transaction::{ReadSet, Snapshot, WriteSet};
use credit_ledger::error::{PaymentError, Result};
use credit_ledger::infrastructure::in_memory::InMemoryStore;
use credit_ledger::infrastructure::local_gateway::LocalGateway;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const SECRET: &str = "testsecret";

pub fn sign(order_id: &str, payment_id: &str) -> String {
    signature::sign(SECRET, order_id, payment_id).unwrap()
}

pub fn engine(store: LedgerStoreRef, gateway: PaymentGatewayRef) -> CreditEngine {
    CreditEngine::new(store, gateway, KeySecret::new(SECRET))
}

pub fn create_request(user_id: &str, credits: u32) -> CreateOrderRequest {
    CreateOrderRequest {
        amount: Some(dec!(499)),
        credits: Some(credits),
        package_id: Some("pkg_basic".to_string()),
        user_id: Some(user_id.to_string()),
    }
}

pub fn verify_request(order_id: &str, payment_id: &str, user_id: &str) -> VerifyPaymentRequest {
    VerifyPaymentRequest {
        order_id: Some(order_id.to_string()),
        payment_id: Some(payment_id.to_string()),
        signature: Some(sign(order_id, payment_id)),
        user_id: Some(user_id.to_string()),
    }
}

/// Stores a created order directly, skipping the gateway.
pub async fn seed_order(store: &dyn LedgerStore, order_id: &str, user_id: &str, credits: u32) {
    let order = Order::new(
        order_id,
        user_id,
        Amount::new(dec!(499)).unwrap(),
        credits,
        None,
        Utc::now(),
    );
    store.insert_order(order).await.unwrap();
}

pub async fn seed_balance(store: &dyn LedgerStore, user_id: &str, credits: u64) {
    let mut balance = UserBalance::new(user_id);
    balance.total_credits = credits;
    let writes =
        move |_: &Snapshot| -> Result<WriteSet> { Ok(WriteSet::new().put_balance(balance.clone())) };
    store
        .atomic_update(&ReadSet::new().balance(user_id), &writes)
        .await
        .unwrap();
}

/// Counts gateway calls and mints ids like the local gateway.
#[derive(Default)]
pub struct RecordingGateway {
    inner: LocalGateway,
    calls: AtomicUsize,
}

impl RecordingGateway {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.create_order(request).await
    }
}

pub struct DownGateway;

#[async_trait]
impl PaymentGateway for DownGateway {
    async fn create_order(&self, _request: &GatewayOrderRequest) -> Result<GatewayOrder> {
        Err(PaymentError::GatewayError("connection refused".to_string()))
    }
}

/// Store whose commits fail whenever they would append a ledger entry.
#[derive(Default)]
pub struct FailingLedgerWrites {
    pub inner: InMemoryStore,
}

#[async_trait]
impl LedgerStore for FailingLedgerWrites {
    async fn insert_order(&self, order: Order) -> Result<()> {
        self.inner.insert_order(order).await
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<Order>> {
        self.inner.get_order(order_id).await
    }

    async fn get_balance(&self, user_id: &str) -> Result<Option<UserBalance>> {
        self.inner.get_balance(user_id).await
    }

    async fn ledger_entries(&self, order_id: &str) -> Result<Vec<LedgerEntry>> {
        self.inner.ledger_entries(order_id).await
    }

    async fn atomic_update(
        &self,
        read_set: &ReadSet,
        write_fn: &TransactionFn<'_>,
    ) -> Result<WriteSet> {
        let failing = |snapshot: &Snapshot| -> Result<WriteSet> {
            let writes = write_fn(snapshot)?;
            if writes.ledger_entries().next().is_some() {
                return Err(PaymentError::StorageError(
                    "ledger collection unavailable".to_string(),
                ));
            }
            Ok(writes)
        };
        self.inner.atomic_update(read_set, &failing).await
    }
}
