//! Application router configuration.

use axum::{
    Json, Router,
    handler::HandlerWithoutStateExt,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::{
    AppState, endpoints,
    stores::TransactionStore,
    summary::get_summary_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Requests that match no API route fall back to the static files of the
/// browser client, and finally to a JSON 404.
pub fn build_router<T>(state: AppState<T>) -> Router
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint::<T>).post(create_transaction_endpoint::<T>),
        )
        .route(
            endpoints::TRANSACTION,
            delete(delete_transaction_endpoint::<T>),
        )
        .route(endpoints::SUMMARY, get(get_summary_endpoint::<T>))
        .route(endpoints::HEALTH, get(get_health))
        .fallback_service(
            ServeDir::new("public/").not_found_service(get_404_not_found.into_service()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The JSON body of the liveness probe response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "OK" when the server is able to respond.
    pub status: String,
    /// The current server time, as an RFC 3339 timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// A route handler reporting that the server is alive.
///
/// Deliberately does not touch the database so that the probe reflects only
/// the process itself.
async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_owned(),
        timestamp: OffsetDateTime::now_utc(),
    })
}

/// The response for requests that match neither an API route nor a static
/// file.
async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "The requested resource could not be found." })),
    )
        .into_response()
}
