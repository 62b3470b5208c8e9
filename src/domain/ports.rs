use super::account::UserBalance;
use super::ledger::LedgerEntry;
use super::order::Order;
use super::transaction::{ReadSet, Snapshot, WriteSet};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Closure run inside an atomic update. It may be invoked several times, once
/// per attempt, and must derive its writes from the snapshot alone.
pub type TransactionFn<'a> = dyn Fn(&Snapshot) -> Result<WriteSet> + Send + Sync + 'a;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Stores a new order. Fails with `DuplicateRecord` if the id is taken.
    async fn insert_order(&self, order: Order) -> Result<()>;
    async fn get_order(&self, order_id: &str) -> Result<Option<Order>>;
    async fn get_balance(&self, user_id: &str) -> Result<Option<UserBalance>>;
    async fn ledger_entries(&self, order_id: &str) -> Result<Vec<LedgerEntry>>;

    /// Reads `read_set`, applies `write_fn` and commits the returned writes
    /// atomically. Conflicting commits are retried with a fresh snapshot.
    ///
    /// Returns the write set that was committed, which is empty when
    /// `write_fn` decided there was nothing to do.
    async fn atomic_update(
        &self,
        read_set: &ReadSet,
        write_fn: &TransactionFn<'_>,
    ) -> Result<WriteSet>;
}

pub type LedgerStoreRef = Arc<dyn LedgerStore>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotes {
    pub user_id: String,
    pub credits: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
}

/// Order as submitted to the payment gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayOrderRequest {
    /// Amount in minor currency units.
    pub amount: u64,
    pub currency: String,
    pub receipt: String,
    pub notes: OrderNotes,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in minor currency units.
    pub amount: u64,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder>;
}

pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
