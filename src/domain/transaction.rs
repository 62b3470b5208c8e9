//! Building blocks of the store's atomic read-modify-write primitive.
//!
//! A caller names the records it depends on in a [`ReadSet`], receives a
//! consistent [`Snapshot`] of them and returns the [`WriteSet`] to commit.
//! Stores re-run the closure whenever a record of the read set changed between
//! the snapshot and the commit.

use super::account::UserBalance;
use super::ledger::LedgerEntry;
use super::order::Order;
use std::collections::HashMap;

/// Attempts a store makes before giving up on a contended transaction.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Order(String),
    Balance(String),
}

#[derive(Debug, Clone, Default)]
pub struct ReadSet {
    keys: Vec<RecordKey>,
}

impl ReadSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(mut self, order_id: impl Into<String>) -> Self {
        self.keys.push(RecordKey::Order(order_id.into()));
        self
    }

    pub fn balance(mut self, user_id: impl Into<String>) -> Self {
        self.keys.push(RecordKey::Balance(user_id.into()));
        self
    }

    pub fn keys(&self) -> &[RecordKey] {
        &self.keys
    }
}

/// Records of a read set as seen at the start of one attempt. Absent records
/// are simply missing.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    orders: HashMap<String, Order>,
    balances: HashMap<String, UserBalance>,
}

impl Snapshot {
    pub fn insert_order(&mut self, order: Order) {
        self.orders.insert(order.order_id.clone(), order);
    }

    pub fn insert_balance(&mut self, balance: UserBalance) {
        self.balances.insert(balance.user_id.clone(), balance);
    }

    pub fn order(&self, order_id: &str) -> Option<&Order> {
        self.orders.get(order_id)
    }

    pub fn balance(&self, user_id: &str) -> Option<&UserBalance> {
        self.balances.get(user_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    PutOrder(Order),
    PutBalance(UserBalance),
    InsertLedgerEntry(LedgerEntry),
}

/// Mutations committed together or not at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteSet {
    mutations: Vec<Mutation>,
}

impl WriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_order(mut self, order: Order) -> Self {
        self.mutations.push(Mutation::PutOrder(order));
        self
    }

    pub fn put_balance(mut self, balance: UserBalance) -> Self {
        self.mutations.push(Mutation::PutBalance(balance));
        self
    }

    pub fn insert_ledger_entry(mut self, entry: LedgerEntry) -> Self {
        self.mutations.push(Mutation::InsertLedgerEntry(entry));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }

    pub fn ledger_entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.mutations.iter().filter_map(|m| match m {
            Mutation::InsertLedgerEntry(entry) => Some(entry),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_set_keeps_order() {
        let read_set = ReadSet::new().order("order_1").balance("user_1");
        assert_eq!(
            read_set.keys(),
            &[
                RecordKey::Order("order_1".to_string()),
                RecordKey::Balance("user_1".to_string())
            ]
        );
    }

    #[test]
    fn test_snapshot_lookup() {
        let mut snapshot = Snapshot::default();
        snapshot.insert_balance(UserBalance::new("user_1"));

        assert!(snapshot.balance("user_1").is_some());
        assert!(snapshot.balance("user_2").is_none());
        assert!(snapshot.order("order_1").is_none());
    }

    #[test]
    fn test_write_set_builder() {
        let writes = WriteSet::new();
        assert!(writes.is_empty());

        let writes = writes.put_balance(UserBalance::new("user_1"));
        assert_eq!(writes.mutations().len(), 1);
        assert_eq!(writes.ledger_entries().count(), 0);
    }
}
