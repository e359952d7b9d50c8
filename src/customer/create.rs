//! Customer creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserId,
    customer::{
        CustomerData, CustomerName, domain::CustomerFormData, find_customer_by_name,
        store_customer,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CHECKBOX_LABEL_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
};

/// The state needed for creating a customer.
#[derive(Debug, Clone)]
pub struct CreateCustomerEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCustomerEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the customer creation page.
pub async fn get_new_customer_page() -> Response {
    new_customer_view().into_response()
}

/// Handle customer creation form submissions.
///
/// On success the client is redirected to the customers page, or back to the
/// creation form when "save and create another" was ticked.
pub async fn create_customer_endpoint(
    State(state): State<CreateCustomerEndpointState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<CustomerFormData>,
) -> Response {
    let name = match CustomerName::new(&form.name) {
        Ok(name) => name,
        Err(error) => {
            return new_customer_form_view(&form.name, &form.notes, &format!("Error: {error}"))
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    // Reject duplicate names up front so the user gets a form error instead
    // of silently being handed the existing customer.
    match find_customer_by_name(user_id, name.as_ref(), &connection) {
        Ok(None) => {}
        Ok(Some(_)) => {
            let error = Error::DuplicateCustomerName(name.to_string());
            return new_customer_form_view(&form.name, &form.notes, &format!("Error: {error}"))
                .into_response();
        }
        Err(error) => {
            tracing::error!("Failed to check for an existing customer: {error}");
            return error.into_alert_response();
        }
    }

    let data = CustomerData {
        name,
        notes: Some(form.notes.clone()),
    };

    match store_customer(user_id, &data, &connection) {
        Ok(customer) => {
            tracing::info!("Stored customer \"{}\"", customer.name);

            let redirect_target = if form.create_another.is_some() {
                endpoints::NEW_CUSTOMER_VIEW
            } else {
                endpoints::CUSTOMERS_VIEW
            };

            (
                HxRedirect(redirect_target.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a customer: {error}");

            error.into_alert_response()
        }
    }
}

fn new_customer_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_CUSTOMER_VIEW).into_html();
    let form = new_customer_form_view("", "", "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Create Customer", &[], &content)
}

fn new_customer_form_view(customer_name: &str, notes: &str, error_message: &str) -> Markup {
    let create_customer_endpoint = endpoints::POST_CUSTOMER;

    html! {
        form
            hx-post=(create_customer_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Customer Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Customer Name"
                    value=(customer_name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="notes" class=(FORM_LABEL_STYLE) { "Notes" }

                textarea
                    id="notes"
                    name="notes"
                    rows="4"
                    placeholder="Anything worth remembering about this customer"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (notes)
                }
            }

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="create_another"
                    id="create_another"
                    class="rounded-xs";

                label for="create_another" class=(FORM_CHECKBOX_LABEL_STYLE)
                {
                    "Save and create another"
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Customer" }
        }
    }
}

#[cfg(test)]
mod new_customer_page_tests {
    use axum::http::StatusCode;

    use crate::{
        customer::get_new_customer_page,
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    #[tokio::test]
    async fn render_page() {
        let response = get_new_customer_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .expect("content-type header missing"),
            "text/html; charset=utf-8"
        );

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_CUSTOMER, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_submit_button(&form);
    }
}
