//! Clientele is a web app for tracking the people and businesses behind your
//! personal finances.
//!
//! Transactions in the ledger can be tagged with a customer, and the app
//! provides CRUD pages for customers plus reports that break down income,
//! expenses and transfers per currency and per customer.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod amount;
mod app_state;
mod attachment;
mod auth;
mod customer;
mod database_id;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod journal;
mod log_in;
mod log_out;
mod logging;
mod navigation;
mod not_found;
mod note;
mod pagination;
mod password;
mod register_user;
mod report;
mod routing;
#[cfg(test)]
mod test_utils;
mod timezone;
mod user;

pub use app_state::AppState;
pub use customer::{
    Customer, CustomerData, CustomerId, CustomerName, destroy_all_customers, destroy_customer,
    find_customer, find_customer_by_name, find_customer_with_fallback, find_or_create_customer,
    first_use_date, get_customers, get_customers_by_ids, last_use_date,
    link_customer_to_journal, link_customer_to_transaction, search_customers, store_customer,
    update_customer,
};
pub use db::initialize as initialize_db;
pub use journal::{
    Currency, JournalQuery, JournalRow, TransactionType, collect_journals, create_account,
    create_currency, create_transaction_journal,
};
pub use logging::logging_middleware;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use user::{User, UserId, create_user, get_user_by_id};

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

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
    /// The user provided an invalid password.
    #[error("invalid password")]
    InvalidCredentials,

    /// Either the user ID or expiry cookie is missing from the cookie jar in
    /// the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email address is already registered to another user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// An empty string was used to create a customer name.
    #[error("Customer name cannot be empty")]
    EmptyCustomerName,

    /// A customer name longer than the maximum of 100 characters was
    /// submitted.
    #[error("Customer name must be at most 100 characters")]
    CustomerNameTooLong,

    /// The specified customer name already exists for this user.
    #[error("the customer \"{0}\" already exists")]
    DuplicateCustomerName(String),

    /// A new customer row could not be inserted, most likely because another
    /// request created the same name first and the unique index rejected the
    /// insert.
    ///
    /// The underlying driver message is logged where the error is raised.
    #[error("error 400003: could not store new customer")]
    CouldNotStoreCustomer,

    /// Tried to update a customer that does not exist.
    #[error("tried to update a customer that is not in the database")]
    UpdateMissingCustomer,

    /// Tried to delete a customer that does not exist.
    #[error("tried to delete a customer that is not in the database")]
    DeleteMissingCustomer,

    /// An amount column could not be parsed as a decimal number.
    #[error("could not parse amount \"{0}\" as a decimal")]
    InvalidAmount(String),

    /// A transaction journal carried an unknown transaction type.
    #[error("unknown transaction type \"{0}\"")]
    InvalidTransactionType(String),

    /// The multipart form for an attachment upload could not be parsed.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// An attachment's contents could not be written to the upload directory.
    #[error("could not write attachment to disk: {0}")]
    AttachmentWriteError(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTML fragment that HTMX can swap into the
    /// page's alert container.
    fn into_alert_response(self) -> Response {
        match self {
            Error::DuplicateCustomerName(name) => Alert::error(
                StatusCode::BAD_REQUEST,
                "Duplicate Customer Name",
                &format!(
                    "The customer {name} already exists. Choose a different name, \
                    or edit or delete the existing customer.",
                ),
            )
            .into_response(),
            Error::CouldNotStoreCustomer => Alert::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not store customer",
                "The customer could not be saved. It may have been created by \
                another request at the same time. Refresh the page and try again.",
            )
            .into_response(),
            Error::UpdateMissingCustomer => Alert::error(
                StatusCode::NOT_FOUND,
                "Could not update customer",
                "The customer could not be found.",
            )
            .into_response(),
            Error::DeleteMissingCustomer => Alert::error(
                StatusCode::NOT_FOUND,
                "Could not delete customer",
                "The customer could not be found. \
                Try refreshing the page to see if the customer has already been deleted.",
            )
            .into_response(),
            Error::MultipartError(details) => Alert::error(
                StatusCode::BAD_REQUEST,
                "Could not read the uploaded file",
                &details,
            )
            .into_response(),
            _ => Alert::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong",
                "An unexpected error occurred, check the server logs for more details.",
            )
            .into_response(),
        }
    }
}
