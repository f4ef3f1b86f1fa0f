//! Defines the transaction store trait.

use crate::{
    DatabaseID, Error,
    transaction::{Transaction, TransactionBuilder},
};

/// Handles the persistence of transactions.
///
/// Route handlers work against this trait so they can be tested without a
/// real database.
pub trait TransactionStore {
    /// Create a new transaction in the store and return it with its assigned
    /// ID.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Retrieve all transactions, ordered by date descending.
    ///
    /// Transactions with equal dates may appear in any order.
    fn get_all(&self) -> Result<Vec<Transaction>, Error>;

    /// Remove the transaction with `id` and return the number of rows
    /// removed (0 or 1).
    ///
    /// Deleting an ID that does not exist is not an error.
    fn delete(&mut self, id: DatabaseID) -> Result<usize, Error>;

    /// Get the total number of transactions in the store.
    fn count(&self) -> Result<usize, Error>;
}
