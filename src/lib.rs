//! Fintrack is a small web app for tracking personal income and expenses.
//!
//! This library provides a JSON REST API over a single SQLite table of
//! transactions and serves the static files for the browser client. The
//! client records transactions against the API and charts the aggregate
//! views (balance, totals by type, per-category expense sums) the API
//! computes from them.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod database_id;
mod db;
mod endpoints;
mod routing;
mod state;
pub mod stores;
mod summary;
mod transaction;

pub use database_id::DatabaseID;
pub use routing::build_router;
pub use state::AppState;
pub use summary::TransactionSummary;
pub use transaction::{NewTransaction, Transaction, TransactionType};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The caller supplied transaction data that failed a field constraint.
    ///
    /// The message names every missing or invalid field so the client can
    /// correct its input and retry.
    #[error("{0}")]
    Validation(String),

    /// An unhandled/unexpected SQL error.
    ///
    /// The underlying cause should only be logged on the server, never sent
    /// to the client verbatim.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {value}");
        Error::SqlError(value)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::Validation(message) => (StatusCode::BAD_REQUEST, message),
            // The real cause has already been logged, the client only gets a
            // generic message.
            Error::SqlError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong!".to_owned(),
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    #[tokio::test]
    async fn validation_error_maps_to_bad_request() {
        let response =
            Error::Validation("missing or invalid fields: amount".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "missing or invalid fields: amount");
    }

    #[tokio::test]
    async fn sql_error_maps_to_internal_server_error_without_leaking_cause() {
        let response = Error::SqlError(rusqlite::Error::QueryReturnedNoRows).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Something went wrong!");
    }
}
