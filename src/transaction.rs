//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionType` enum
//! - The `NewTransaction` request data and its field validation
//! - Route handlers for listing, creating, and deleting transactions

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};

use crate::{AppState, DatabaseID, Error, stores::TransactionStore};

/// Whether a transaction records money earned or money spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money flowing in, e.g. a salary payment.
    Income,
    /// Money flowing out, e.g. a grocery shop.
    Expense,
}

impl TransactionType {
    /// The string stored in the database and used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

/// The error returned when parsing a string that is neither "income" nor "expense".
#[derive(Debug, PartialEq, Eq)]
pub struct ParseTransactionTypeError;

impl FromStr for TransactionType {
    type Err = ParseTransactionTypeError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(ParseTransactionTypeError),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction, assigned by the database and never reused.
    pub id: DatabaseID,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// A free-form label that groups similar transactions.
    pub category: String,
    /// Whether the transaction is an income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// When the transaction happened, as an RFC 3339 timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

/// The validated data for a transaction that has not been stored yet.
///
/// Produced by [NewTransaction::validate] and consumed by
/// [TransactionStore::create](crate::stores::TransactionStore::create), which
/// assigns the ID.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    /// The amount of money spent or earned, always positive and finite.
    pub amount: f64,
    /// A non-empty description with surrounding whitespace removed.
    pub description: String,
    /// The non-empty category label.
    pub category: String,
    /// Whether the transaction is an income or an expense.
    pub transaction_type: TransactionType,
    /// When the transaction happened, normalized to UTC.
    pub date: OffsetDateTime,
}

/// The JSON request body for creating a transaction.
///
/// All fields are optional at the deserialization stage so that missing and
/// invalid fields can be reported together with a 400 response instead of a
/// generic deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct NewTransaction {
    /// The value of the transaction. Must be a positive, finite number.
    pub amount: Option<f64>,
    /// Text detailing the transaction. Must be non-empty after trimming.
    pub description: Option<String>,
    /// The category label. Any non-empty string is accepted, the server does
    /// not restrict categories to the set suggested by the client.
    pub category: Option<String>,
    /// Either "income" or "expense".
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// When the transaction happened, as an RFC 3339 timestamp. Defaults to
    /// the current time when omitted.
    pub date: Option<String>,
}

impl NewTransaction {
    /// Check the field constraints and produce a [TransactionBuilder] ready
    /// for insertion.
    ///
    /// # Errors
    /// Returns an [Error::Validation] naming every missing or invalid field
    /// if any constraint is violated.
    pub fn validate(self) -> Result<TransactionBuilder, Error> {
        let mut invalid_fields = Vec::new();

        let amount = match self.amount {
            Some(amount) if amount.is_finite() && amount > 0.0 => Some(amount),
            _ => {
                invalid_fields.push("amount");
                None
            }
        };

        let description = match self.description {
            Some(description) if !description.trim().is_empty() => {
                Some(description.trim().to_owned())
            }
            _ => {
                invalid_fields.push("description");
                None
            }
        };

        let category = match self.category {
            Some(category) if !category.is_empty() => Some(category),
            _ => {
                invalid_fields.push("category");
                None
            }
        };

        let transaction_type = match self.transaction_type.as_deref().map(TransactionType::from_str) {
            Some(Ok(transaction_type)) => Some(transaction_type),
            _ => {
                invalid_fields.push("type");
                None
            }
        };

        let date = match self.date {
            None => Some(OffsetDateTime::now_utc()),
            // Normalizing to UTC keeps the stored text lexicographically
            // ordered by instant, which the list query relies on.
            Some(date) => match OffsetDateTime::parse(&date, &Rfc3339) {
                Ok(date) => Some(date.to_offset(UtcOffset::UTC)),
                Err(_) => {
                    invalid_fields.push("date");
                    None
                }
            },
        };

        match (amount, description, category, transaction_type, date) {
            (
                Some(amount),
                Some(description),
                Some(category),
                Some(transaction_type),
                Some(date),
            ) => Ok(TransactionBuilder {
                amount,
                description,
                category,
                transaction_type,
                date,
            }),
            _ => Err(Error::Validation(format!(
                "missing or invalid fields: {}",
                invalid_fields.join(", ")
            ))),
        }
    }
}

/// The JSON response for a successfully created transaction.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionResponse {
    /// The ID assigned to the new transaction.
    pub id: DatabaseID,
    /// A human-readable confirmation message.
    pub message: String,
}

/// The JSON response for a delete request.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct DeleteTransactionResponse {
    /// A human-readable confirmation message.
    pub message: String,
    /// The number of rows removed, zero when the ID did not match a
    /// transaction.
    pub changes: usize,
}

/// A route handler for listing all transactions, ordered by date descending.
pub async fn get_transactions_endpoint<T>(
    State(state): State<AppState<T>>,
) -> Result<Json<Vec<Transaction>>, Error>
where
    T: TransactionStore + Send + Sync,
{
    state.transaction_store.get_all().map(Json)
}

/// A route handler for creating a new transaction.
///
/// Responds with 400 and a message naming the offending fields if the request
/// data fails validation. No row is written in that case.
pub async fn create_transaction_endpoint<T>(
    State(mut state): State<AppState<T>>,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<Json<CreateTransactionResponse>, Error>
where
    T: TransactionStore + Send + Sync,
{
    let builder = new_transaction.validate()?;
    let transaction = state.transaction_store.create(builder)?;

    Ok(Json(CreateTransactionResponse {
        id: transaction.id,
        message: "Transaction added successfully".to_owned(),
    }))
}

/// A route handler for deleting a transaction by its database ID.
///
/// Deleting an ID with no matching row is not an error: the response reports
/// zero changes and the store is left untouched.
pub async fn delete_transaction_endpoint<T>(
    State(mut state): State<AppState<T>>,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<Json<DeleteTransactionResponse>, Error>
where
    T: TransactionStore + Send + Sync,
{
    let changes = state.transaction_store.delete(transaction_id)?;

    Ok(Json(DeleteTransactionResponse {
        message: "Transaction deleted".to_owned(),
        changes,
    }))
}

#[cfg(test)]
mod new_transaction_tests {
    use time::{OffsetDateTime, UtcOffset, macros::datetime};

    use crate::Error;

    use super::{NewTransaction, TransactionType};

    fn valid_new_transaction() -> NewTransaction {
        NewTransaction {
            amount: Some(50.0),
            description: Some("Groceries".to_owned()),
            category: Some("Food".to_owned()),
            transaction_type: Some("expense".to_owned()),
            date: Some("2025-01-15T12:00:00Z".to_owned()),
        }
    }

    #[test]
    fn validate_succeeds_with_all_fields() {
        let builder = valid_new_transaction().validate().unwrap();

        assert_eq!(builder.amount, 50.0);
        assert_eq!(builder.description, "Groceries");
        assert_eq!(builder.category, "Food");
        assert_eq!(builder.transaction_type, TransactionType::Expense);
        assert_eq!(builder.date, datetime!(2025-01-15 12:00 UTC));
    }

    #[test]
    fn validate_trims_description() {
        let new_transaction = NewTransaction {
            description: Some("  Groceries \n".to_owned()),
            ..valid_new_transaction()
        };

        let builder = new_transaction.validate().unwrap();

        assert_eq!(builder.description, "Groceries");
    }

    #[test]
    fn validate_defaults_date_to_now() {
        let new_transaction = NewTransaction {
            date: None,
            ..valid_new_transaction()
        };

        let builder = new_transaction.validate().unwrap();

        let age = OffsetDateTime::now_utc() - builder.date;
        assert!(
            age.whole_seconds().abs() < 5,
            "want a date close to now, got {}",
            builder.date
        );
    }

    #[test]
    fn validate_normalizes_date_to_utc() {
        let new_transaction = NewTransaction {
            date: Some("2025-01-15T12:00:00+02:00".to_owned()),
            ..valid_new_transaction()
        };

        let builder = new_transaction.validate().unwrap();

        assert_eq!(builder.date.offset(), UtcOffset::UTC);
        assert_eq!(builder.date, datetime!(2025-01-15 10:00 UTC));
    }

    #[test]
    fn validate_fails_on_missing_amount() {
        let new_transaction = NewTransaction {
            amount: None,
            ..valid_new_transaction()
        };

        assert_eq!(
            new_transaction.validate(),
            Err(Error::Validation(
                "missing or invalid fields: amount".to_owned()
            ))
        );
    }

    #[test]
    fn validate_fails_on_non_positive_amount() {
        for amount in [0.0, -42.5, f64::NAN, f64::INFINITY] {
            let new_transaction = NewTransaction {
                amount: Some(amount),
                ..valid_new_transaction()
            };

            assert_eq!(
                new_transaction.validate(),
                Err(Error::Validation(
                    "missing or invalid fields: amount".to_owned()
                )),
                "amount {amount} should fail validation"
            );
        }
    }

    #[test]
    fn validate_fails_on_blank_description() {
        for description in [None, Some("".to_owned()), Some(" \t ".to_owned())] {
            let new_transaction = NewTransaction {
                description,
                ..valid_new_transaction()
            };

            assert_eq!(
                new_transaction.validate(),
                Err(Error::Validation(
                    "missing or invalid fields: description".to_owned()
                ))
            );
        }
    }

    #[test]
    fn validate_fails_on_missing_category() {
        let new_transaction = NewTransaction {
            category: None,
            ..valid_new_transaction()
        };

        assert_eq!(
            new_transaction.validate(),
            Err(Error::Validation(
                "missing or invalid fields: category".to_owned()
            ))
        );
    }

    #[test]
    fn validate_fails_on_invalid_type() {
        for transaction_type in [None, Some("transfer".to_owned()), Some("Income".to_owned())] {
            let new_transaction = NewTransaction {
                transaction_type,
                ..valid_new_transaction()
            };

            assert_eq!(
                new_transaction.validate(),
                Err(Error::Validation(
                    "missing or invalid fields: type".to_owned()
                ))
            );
        }
    }

    #[test]
    fn validate_fails_on_unparseable_date() {
        let new_transaction = NewTransaction {
            date: Some("yesterday".to_owned()),
            ..valid_new_transaction()
        };

        assert_eq!(
            new_transaction.validate(),
            Err(Error::Validation(
                "missing or invalid fields: date".to_owned()
            ))
        );
    }

    #[test]
    fn validate_names_every_invalid_field() {
        let result = NewTransaction::default().validate();

        assert_eq!(
            result,
            Err(Error::Validation(
                "missing or invalid fields: amount, description, category, type".to_owned()
            ))
        );
    }
}
