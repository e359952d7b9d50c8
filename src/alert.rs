//! Alert fragments for displaying success and error messages to users.
//!
//! Alerts are rendered as HTML fragments that HTMX swaps into the page's
//! alert container or into the element that triggered the request.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

const SUCCESS_ALERT_STYLE: &str = "p-4 mb-4 text-sm text-green-800 rounded-lg \
    bg-green-50 dark:bg-gray-800 dark:text-green-400";
const ERROR_ALERT_STYLE: &str = "p-4 mb-4 text-sm text-red-800 rounded-lg \
    bg-red-50 dark:bg-gray-800 dark:text-red-400";
const INFO_ALERT_STYLE: &str = "p-4 mb-4 text-sm text-blue-800 rounded-lg \
    bg-blue-50 dark:bg-gray-800 dark:text-blue-400";

/// An alert message with a status code that controls where HTMX swaps it.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message without further detail.
    SuccessSimple {
        message: String,
    },
    /// An informational message, e.g. an action that was skipped.
    Info {
        message: String,
    },
    Error {
        status_code: StatusCode,
        message: String,
        details: String,
    },
}

impl Alert {
    /// Create an error alert with a message and details.
    pub fn error(status_code: StatusCode, message: &str, details: &str) -> Self {
        Self::Error {
            status_code,
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    fn into_html(self) -> Markup {
        match self {
            Alert::SuccessSimple { message } => html! {
                div class=(SUCCESS_ALERT_STYLE) role="alert"
                {
                    span class="font-medium" { (message) }
                }
            },
            Alert::Info { message } => html! {
                div class=(INFO_ALERT_STYLE) role="alert"
                {
                    span class="font-medium" { (message) }
                }
            },
            Alert::Error {
                message, details, ..
            } => html! {
                div class=(ERROR_ALERT_STYLE) role="alert"
                {
                    p { span class="font-medium" { (message) } " " (details) }
                }
            },
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        let status_code = match &self {
            Alert::SuccessSimple { .. } | Alert::Info { .. } => StatusCode::OK,
            Alert::Error { status_code, .. } => *status_code,
        };

        (status_code, self.into_html()).into_response()
    }
}
