//! The API endpoint URIs.

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for the aggregate views (balance, totals, category sums).
pub const SUMMARY: &str = "/api/summary";
/// The liveness probe route.
pub const HEALTH: &str = "/health";
