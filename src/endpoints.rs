//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/customers/{customer_id}', use [format_endpoint].

/// The root route which redirects to the customers page or log in page.
pub const ROOT: &str = "/";
/// The page for listing all customers.
pub const CUSTOMERS_VIEW: &str = "/customers";
/// The page for creating a new customer.
pub const NEW_CUSTOMER_VIEW: &str = "/customers/new";
/// The page for showing a single customer and its transactions for a period.
pub const CUSTOMER_VIEW: &str = "/customers/{customer_id}";
/// The page for showing a single customer and its full transaction history.
pub const CUSTOMER_ALL_VIEW: &str = "/customers/{customer_id}/all";
/// The page for editing an existing customer.
pub const EDIT_CUSTOMER_VIEW: &str = "/customers/{customer_id}/edit";
/// The confirmation page for deleting a customer.
pub const DELETE_CUSTOMER_VIEW: &str = "/customers/{customer_id}/delete";
/// The page showing income and expenses per currency and customer.
pub const REPORT_VIEW: &str = "/report";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register a user.
pub const USERS: &str = "/api/users";
/// The route to create a customer.
pub const POST_CUSTOMER: &str = "/api/customers";
/// The route to update a customer.
pub const PUT_CUSTOMER: &str = "/api/customers/{customer_id}";
/// The route to delete a customer.
pub const DELETE_CUSTOMER: &str = "/api/customers/{customer_id}";
/// The route for customer name autocomplete searches.
pub const SEARCH_CUSTOMERS: &str = "/api/customers/search";
/// The route to upload an attachment for a customer.
pub const POST_CUSTOMER_ATTACHMENT: &str = "/api/customers/{customer_id}/attachments";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/customers/{customer_id}',
/// '{customer_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
