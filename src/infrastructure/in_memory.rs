use crate::domain::account::UserBalance;
use crate::domain::ledger::LedgerEntry;
use crate::domain::order::Order;
use crate::domain::ports::{LedgerStore, TransactionFn};
use crate::domain::transaction::{Mutation, ReadSet, RecordKey, Snapshot, WriteSet};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    orders: HashMap<String, Order>,
    balances: HashMap<String, UserBalance>,
    ledger: HashMap<Uuid, LedgerEntry>,
    ledger_by_order: HashMap<String, Uuid>,
}

impl Tables {
    fn snapshot(&self, read_set: &ReadSet) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for key in read_set.keys() {
            match key {
                RecordKey::Order(id) => {
                    if let Some(order) = self.orders.get(id) {
                        snapshot.insert_order(order.clone());
                    }
                }
                RecordKey::Balance(id) => {
                    if let Some(balance) = self.balances.get(id) {
                        snapshot.insert_balance(balance.clone());
                    }
                }
            }
        }
        snapshot
    }

    /// Checks every mutation before any is applied.
    fn validate(&self, writes: &WriteSet) -> Result<()> {
        let mut batch_orders = HashSet::new();
        for entry in writes.ledger_entries() {
            if self.ledger.contains_key(&entry.id)
                || self.ledger_by_order.contains_key(&entry.order_id)
                || !batch_orders.insert(entry.order_id.as_str())
            {
                return Err(PaymentError::DuplicateRecord(format!(
                    "ledger entry for order {}",
                    entry.order_id
                )));
            }
        }
        Ok(())
    }

    fn apply(&mut self, writes: WriteSet) {
        for mutation in writes.into_mutations() {
            match mutation {
                Mutation::PutOrder(order) => {
                    self.orders.insert(order.order_id.clone(), order);
                }
                Mutation::PutBalance(balance) => {
                    self.balances.insert(balance.user_id.clone(), balance);
                }
                Mutation::InsertLedgerEntry(entry) => {
                    self.ledger_by_order.insert(entry.order_id.clone(), entry.id);
                    self.ledger.insert(entry.id, entry);
                }
            }
        }
    }
}

/// A thread-safe in-memory ledger store.
///
/// `atomic_update` holds the write lock from snapshot to commit, so updates
/// are serialized and never conflict. The caller's closure is synchronous and
/// runs exactly once per call.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn insert_order(&self, order: Order) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.orders.contains_key(&order.order_id) {
            return Err(PaymentError::DuplicateRecord(format!(
                "order {}",
                order.order_id
            )));
        }
        tables.orders.insert(order.order_id.clone(), order);
        Ok(())
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.get(order_id).cloned())
    }

    async fn get_balance(&self, user_id: &str) -> Result<Option<UserBalance>> {
        let tables = self.tables.read().await;
        Ok(tables.balances.get(user_id).cloned())
    }

    async fn ledger_entries(&self, order_id: &str) -> Result<Vec<LedgerEntry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .ledger_by_order
            .get(order_id)
            .and_then(|id| tables.ledger.get(id))
            .cloned()
            .into_iter()
            .collect())
    }

    async fn atomic_update(
        &self,
        read_set: &ReadSet,
        write_fn: &TransactionFn<'_>,
    ) -> Result<WriteSet> {
        let mut tables = self.tables.write().await;
        let writes = write_fn(&tables.snapshot(read_set))?;
        tables.validate(&writes)?;
        tables.apply(writes.clone());
        Ok(writes)
    }
}
