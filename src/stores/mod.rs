//! Contains the trait and implementation for objects that store [transactions](crate::Transaction).

mod transaction;

pub mod sqlite;

pub use transaction::TransactionStore;
