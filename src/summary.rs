//! Aggregate views computed from the full transaction list.
//!
//! Nothing in this module is ever persisted: the summary is recomputed from
//! the freshly fetched list on every request, so the client never holds
//! authoritative totals that could drift from the stored rows.

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    stores::TransactionStore,
    transaction::{Transaction, TransactionType},
};

/// The aggregate values derived from the transaction list.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    /// Total income minus total expenses.
    pub balance: f64,
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of all expense amounts.
    pub total_expenses: f64,
    /// The sum of amounts per category, restricted to expenses.
    pub category_expense_totals: BTreeMap<String, f64>,
}

impl TransactionSummary {
    /// Compute the summary of `transactions`.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut summary = Self::default();

        for transaction in transactions {
            match transaction.transaction_type {
                TransactionType::Income => summary.total_income += transaction.amount,
                TransactionType::Expense => {
                    summary.total_expenses += transaction.amount;
                    *summary
                        .category_expense_totals
                        .entry(transaction.category.clone())
                        .or_default() += transaction.amount;
                }
            }
        }

        summary.balance = summary.total_income - summary.total_expenses;

        summary
    }
}

/// A route handler for the aggregate views the client charts.
pub async fn get_summary_endpoint<T>(
    State(state): State<AppState<T>>,
) -> Result<Json<TransactionSummary>, Error>
where
    T: TransactionStore + Send + Sync,
{
    let transactions = state.transaction_store.get_all()?;

    Ok(Json(TransactionSummary::from_transactions(&transactions)))
}
