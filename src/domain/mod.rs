//! Domain model: orders, user balances, ledger entries and the ports the
//! application layer talks to.

pub mod account;
pub mod ledger;
pub mod order;
pub mod ports;
pub mod signature;
pub mod transaction;
