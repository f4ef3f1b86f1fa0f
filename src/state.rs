//! Implements a struct that holds the state of the REST server.

use std::marker::{Send, Sync};

use crate::stores::TransactionStore;

/// The state of the REST server.
///
/// The store is constructed once at startup and handed to the router; axum
/// clones it per request, with the clones sharing the single underlying
/// database connection.
#[derive(Debug, Clone)]
pub struct AppState<T>
where
    T: TransactionStore + Send + Sync,
{
    /// The store for managing [transactions](crate::Transaction).
    pub transaction_store: T,
}

impl<T> AppState<T>
where
    T: TransactionStore + Send + Sync,
{
    /// Create a new [AppState].
    pub fn new(transaction_store: T) -> Self {
        Self { transaction_store }
    }
}
