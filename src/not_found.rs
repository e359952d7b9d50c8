//! Defines the template and route handler for the 404 page.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    let page = error_view(
        "Not Found",
        "404",
        "The page you are looking for does not exist.",
        "Check the URL for typos, or go back to the customers page.",
    );

    (StatusCode::NOT_FOUND, Html(page.into_string())).into_response()
}
