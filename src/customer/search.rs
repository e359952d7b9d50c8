//! Customer name autocomplete endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, UserId, customer::CustomerId};

use super::search_customers;

/// The maximum number of rows a search returns when the client does not ask
/// for fewer.
const DEFAULT_SEARCH_LIMIT: u64 = 25;

/// The state needed for customer searches.
#[derive(Debug, Clone)]
pub struct SearchCustomersState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SearchCustomersState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters accepted by the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// The (partial) customer name to search for.
    #[serde(default)]
    pub query: String,
    /// The maximum number of rows to return.
    pub limit: Option<u64>,
}

/// One search result, as consumed by the autocomplete widget.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CustomerSearchResult {
    pub id: CustomerId,
    pub name: String,
}

/// Search the user's customers by name, case-insensitively.
///
/// Returns a JSON array of id/name pairs, capped at the requested limit.
pub async fn search_customers_endpoint(
    State(state): State<SearchCustomersState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

    match search_customers(user_id, &query.query, limit, &connection) {
        Ok(customers) => {
            let results: Vec<CustomerSearchResult> = customers
                .into_iter()
                .map(|customer| CustomerSearchResult {
                    id: customer.id,
                    name: customer.name.to_string(),
                })
                .collect();

            Json(results).into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while searching customers: {error}");
            error.into_response()
        }
    }
}
