//! Adapters for the domain ports: ledger stores and payment gateways.

pub mod in_memory;
pub mod local_gateway;
pub mod razorpay;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
