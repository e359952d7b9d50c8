//! Customer editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserId,
    customer::{
        CustomerData, CustomerId, CustomerName, domain::CustomerFormData, find_customer,
        get_customer_note, update_customer,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CHECKBOX_LABEL_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
};

/// The state needed for the edit customer page.
#[derive(Debug, Clone)]
pub struct EditCustomerPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCustomerPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for updating a customer.
#[derive(Debug, Clone)]
pub struct UpdateCustomerEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateCustomerEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the customer editing page, prefilled with the customer's current
/// name and note.
pub async fn get_edit_customer_page(
    Path(customer_id): Path<CustomerId>,
    State(state): State<EditCustomerPageState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_CUSTOMER_VIEW, customer_id);
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_CUSTOMER, customer_id);

    match find_customer(user_id, customer_id, &connection)? {
        Some(customer) => {
            let notes = get_customer_note(customer.id, &connection)?.unwrap_or_default();

            Ok(edit_customer_view(
                &edit_endpoint,
                &update_endpoint,
                customer.name.as_ref(),
                &notes,
                "",
            )
            .into_response())
        }
        None => Ok(edit_customer_view(
            &edit_endpoint,
            &update_endpoint,
            "",
            "",
            "Customer not found",
        )
        .into_response()),
    }
}

/// Handle customer update form submissions.
///
/// On success the client is redirected to the customers page, or back to the
/// edit form when "save and keep editing" was ticked.
pub async fn update_customer_endpoint(
    Path(customer_id): Path<CustomerId>,
    State(state): State<UpdateCustomerEndpointState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<CustomerFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_CUSTOMER, customer_id);

    let name = match CustomerName::new(&form.name) {
        Ok(name) => name,
        Err(error) => {
            return edit_customer_form_view(
                &update_endpoint,
                &form.name,
                &form.notes,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    let customer = match find_customer(user_id, customer_id, &connection) {
        Ok(Some(customer)) => customer,
        Ok(None) => return Error::UpdateMissingCustomer.into_alert_response(),
        Err(error) => {
            tracing::error!("Failed to retrieve customer {customer_id}: {error}");
            return error.into_alert_response();
        }
    };

    let data = CustomerData {
        name,
        notes: Some(form.notes.clone()),
    };

    match update_customer(&customer, &data, &connection) {
        Ok(updated) => {
            tracing::info!("Updated customer \"{}\"", updated.name);

            let redirect_target = if form.return_to_edit.is_some() {
                endpoints::format_endpoint(endpoints::EDIT_CUSTOMER_VIEW, customer_id)
            } else {
                endpoints::CUSTOMERS_VIEW.to_owned()
            };

            (HxRedirect(redirect_target), StatusCode::SEE_OTHER).into_response()
        }
        Err(error @ Error::DuplicateCustomerName(_)) => edit_customer_form_view(
            &update_endpoint,
            &form.name,
            &form.notes,
            &format!("Error: {error}"),
        )
        .into_response(),
        Err(Error::UpdateMissingCustomer) => Error::UpdateMissingCustomer.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating customer {customer_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_customer_view(
    edit_endpoint: &str,
    update_endpoint: &str,
    customer_name: &str,
    notes: &str,
    error_message: &str,
) -> Markup {
    let nav_bar = NavBar::new(edit_endpoint).into_html();
    let form = edit_customer_form_view(update_endpoint, customer_name, notes, error_message);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Customer", &[], &content)
}

fn edit_customer_form_view(
    update_customer_endpoint: &str,
    customer_name: &str,
    notes: &str,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(update_customer_endpoint)
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
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (notes)
                }
            }

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="return_to_edit"
                    id="return_to_edit"
                    class="rounded-xs";

                label for="return_to_edit" class=(FORM_CHECKBOX_LABEL_STYLE)
                {
                    "Save and keep editing"
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Customer" }
        }
    }
}
