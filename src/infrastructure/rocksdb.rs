use crate::domain::account::UserBalance;
use crate::domain::ledger::LedgerEntry;
use crate::domain::order::Order;
use crate::domain::ports::{LedgerStore, TransactionFn};
use crate::domain::transaction::{
    DEFAULT_MAX_ATTEMPTS, Mutation, ReadSet, RecordKey, Snapshot, WriteSet,
};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, ErrorKind, OptimisticTransactionDB, Options,
};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Column Family for storing orders, keyed by gateway order id.
pub const CF_ORDERS: &str = "orders";
/// Column Family for storing user balances, keyed by user id.
pub const CF_BALANCES: &str = "balances";
/// Column Family for storing ledger entries, keyed by entry id.
pub const CF_LEDGER: &str = "ledger";
/// Column Family mapping order id to its ledger entry id.
pub const CF_LEDGER_BY_ORDER: &str = "ledger_by_order";

/// A persistent store implementation using RocksDB optimistic transactions.
///
/// Records read inside `atomic_update` are tracked with `get_for_update`, so a
/// concurrent commit touching any of them makes our commit fail with `Busy`
/// and the attempt is replayed on a fresh snapshot.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc`).
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<OptimisticTransactionDB>,
    max_attempts: u32,
}

impl RocksDbStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that all required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = [CF_ORDERS, CF_BALANCES, CF_LEDGER, CF_LEDGER_BY_ORDER]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = OptimisticTransactionDB::open_cf_descriptors(&opts, path, cfs)?;

        Ok(Self {
            db: Arc::new(db),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| PaymentError::StorageError(format!("{} column family not found", name)))
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_new_order(&self, order: &Order) -> Result<()> {
        let cf = self.cf(CF_ORDERS)?;
        let txn = self.db.transaction();
        if txn
            .get_for_update_cf(cf, order.order_id.as_bytes(), true)?
            .is_some()
        {
            return Err(PaymentError::DuplicateRecord(format!(
                "order {}",
                order.order_id
            )));
        }
        txn.put_cf(cf, order.order_id.as_bytes(), serde_json::to_vec(order)?)?;
        txn.commit()?;
        Ok(())
    }

    /// One optimistic attempt. `Ok(None)` means the commit lost a race.
    fn try_commit(
        &self,
        read_set: &ReadSet,
        write_fn: &TransactionFn<'_>,
    ) -> Result<Option<WriteSet>> {
        let orders = self.cf(CF_ORDERS)?;
        let balances = self.cf(CF_BALANCES)?;
        let ledger = self.cf(CF_LEDGER)?;
        let ledger_by_order = self.cf(CF_LEDGER_BY_ORDER)?;

        let txn = self.db.transaction();
        let mut snapshot = Snapshot::default();
        for key in read_set.keys() {
            match key {
                RecordKey::Order(id) => {
                    if let Some(bytes) = txn.get_for_update_cf(orders, id.as_bytes(), true)? {
                        snapshot.insert_order(serde_json::from_slice(&bytes)?);
                    }
                }
                RecordKey::Balance(id) => {
                    if let Some(bytes) = txn.get_for_update_cf(balances, id.as_bytes(), true)? {
                        snapshot.insert_balance(serde_json::from_slice(&bytes)?);
                    }
                }
            }
        }

        let writes = write_fn(&snapshot)?;
        for mutation in writes.mutations() {
            match mutation {
                Mutation::PutOrder(order) => {
                    txn.put_cf(orders, order.order_id.as_bytes(), serde_json::to_vec(order)?)?;
                }
                Mutation::PutBalance(balance) => {
                    txn.put_cf(
                        balances,
                        balance.user_id.as_bytes(),
                        serde_json::to_vec(balance)?,
                    )?;
                }
                Mutation::InsertLedgerEntry(entry) => {
                    if txn
                        .get_for_update_cf(ledger_by_order, entry.order_id.as_bytes(), true)?
                        .is_some()
                    {
                        return Err(PaymentError::DuplicateRecord(format!(
                            "ledger entry for order {}",
                            entry.order_id
                        )));
                    }
                    txn.put_cf(ledger, entry.id.as_bytes(), serde_json::to_vec(entry)?)?;
                    txn.put_cf(
                        ledger_by_order,
                        entry.order_id.as_bytes(),
                        entry.id.as_bytes(),
                    )?;
                }
            }
        }

        match txn.commit() {
            Ok(()) => Ok(Some(writes)),
            Err(e) if matches!(e.kind(), ErrorKind::Busy | ErrorKind::TryAgain) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl LedgerStore for RocksDbStore {
    async fn insert_order(&self, order: Order) -> Result<()> {
        self.put_new_order(&order)
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<Order>> {
        self.get_json(CF_ORDERS, order_id.as_bytes())
    }

    async fn get_balance(&self, user_id: &str) -> Result<Option<UserBalance>> {
        self.get_json(CF_BALANCES, user_id.as_bytes())
    }

    async fn ledger_entries(&self, order_id: &str) -> Result<Vec<LedgerEntry>> {
        let index = self.cf(CF_LEDGER_BY_ORDER)?;
        let Some(entry_id) = self.db.get_cf(index, order_id.as_bytes())? else {
            return Ok(Vec::new());
        };
        Ok(self
            .get_json::<LedgerEntry>(CF_LEDGER, &entry_id)?
            .into_iter()
            .collect())
    }

    async fn atomic_update(
        &self,
        read_set: &ReadSet,
        write_fn: &TransactionFn<'_>,
    ) -> Result<WriteSet> {
        for attempt in 1..=self.max_attempts {
            if let Some(writes) = self.try_commit(read_set, write_fn)? {
                return Ok(writes);
            }
            debug!(attempt, "Transaction conflict, retrying");
        }
        Err(PaymentError::TransactionAborted {
            attempts: self.max_attempts,
        })
    }
}
