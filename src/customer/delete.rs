//! Customer deletion confirmation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserId,
    alert::Alert,
    customer::{Customer, CustomerId, destroy_customer, find_customer},
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, FORM_CONTAINER_STYLE, LINK_STYLE, base,
    },
    navigation::NavBar,
};

/// The state needed for deleting a customer.
#[derive(Debug, Clone)]
pub struct DeleteCustomerEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCustomerEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the deletion confirmation page for a customer.
pub async fn get_delete_customer_page(
    Path(customer_id): Path<CustomerId>,
    State(state): State<DeleteCustomerEndpointState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    match find_customer(user_id, customer_id, &connection)? {
        Some(customer) => Ok(delete_customer_view(&customer).into_response()),
        None => Err(Error::NotFound),
    }
}

/// Handle customer deletion. Returns a success alert or an error.
pub async fn delete_customer_endpoint(
    Path(customer_id): Path<CustomerId>,
    State(state): State<DeleteCustomerEndpointState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let customer = match find_customer(user_id, customer_id, &connection) {
        Ok(Some(customer)) => customer,
        Ok(None) => return Error::DeleteMissingCustomer.into_alert_response(),
        Err(error) => {
            tracing::error!("Failed to retrieve customer {customer_id}: {error}");
            return error.into_alert_response();
        }
    };

    match destroy_customer(&customer, &connection) {
        Ok(_) => {
            tracing::info!("Deleted customer \"{}\"", customer.name);

            Alert::SuccessSimple {
                message: format!("Deleted customer \"{}\"", customer.name),
            }
            .into_response()
        }
        Err(Error::DeleteMissingCustomer) => Error::DeleteMissingCustomer.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting customer {customer_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn delete_customer_view(customer: &Customer) -> Markup {
    let nav_bar = NavBar::new(endpoints::CUSTOMERS_VIEW).into_html();
    let delete_endpoint = endpoints::format_endpoint(endpoints::DELETE_CUSTOMER, customer.id);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            section class="w-full space-y-4 md:space-y-6"
            {
                h1 class="text-xl font-bold" { "Delete \"" (customer.name) "\"?" }

                p
                {
                    "This removes the customer from every transaction it is \
                    tagged on. The transactions themselves are kept."
                }

                button
                    type="button"
                    hx-delete=(delete_endpoint)
                    hx-target="#alert-container"
                    hx-swap="innerHTML"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete Customer"
                }

                a href=(endpoints::CUSTOMERS_VIEW) class=(LINK_STYLE) { "Cancel" }
            }
        }
    };

    base("Delete Customer", &[], &content)
}

#[cfg(test)]
mod delete_customer_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use scraper::Html;

    use crate::{
        PasswordHash, UserId,
        customer::{
            delete_customer_endpoint, find_customer, find_or_create_customer,
            get_delete_customer_page,
        },
        db::initialize,
        test_utils::{assert_valid_html, get_header, parse_html_document, parse_html_fragment},
        user::create_user,
    };

    use super::DeleteCustomerEndpointState;

    fn get_delete_state() -> (DeleteCustomerEndpointState, UserId) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
        let user = create_user(
            "foo@bar.baz",
            PasswordHash::new_unchecked("hash"),
            false,
            &connection,
        )
        .expect("Could not create test user");

        (
            DeleteCustomerEndpointState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn confirmation_page_names_the_customer() {
        let (state, user_id) = get_delete_state();
        let customer = find_or_create_customer(
            user_id,
            None,
            "Acme",
            &state.db_connection.lock().unwrap(),
        )
        .unwrap()
        .unwrap();

        let response =
            get_delete_customer_page(Path(customer.id), State(state), Extension(user_id))
                .await
                .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert!(html.html().contains("Acme"));
    }

    #[tokio::test]
    async fn delete_customer_endpoint_succeeds() {
        let (state, user_id) = get_delete_state();
        let customer = find_or_create_customer(
            user_id,
            None,
            "Acme",
            &state.db_connection.lock().unwrap(),
        )
        .unwrap()
        .unwrap();

        let response =
            delete_customer_endpoint(Path(customer.id), State(state.clone()), Extension(user_id))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            find_customer(user_id, customer.id, &state.db_connection.lock().unwrap()).unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn delete_customer_endpoint_with_invalid_id_returns_error_html() {
        let (state, user_id) = get_delete_state();

        let response = delete_customer_endpoint(Path(999999), State(state), Extension(user_id))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get_header(&response, "content-type"),
            "text/html; charset=utf-8"
        );

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_error_content(&html, "Could not delete customer");
    }

    #[track_caller]
    fn assert_error_content(html: &Html, want_error_message: &str) {
        let span = scraper::Selector::parse("span").unwrap();
        let error_message = html
            .select(&span)
            .next()
            .expect("No error message found")
            .text()
            .collect::<Vec<_>>()
            .join("");
        let got_error_message = error_message.trim();

        assert_eq!(want_error_message, got_error_message);
    }
}
