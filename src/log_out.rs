//! Defines the route handler for logging out.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::invalidate_auth_cookie, endpoints};

/// Invalidate the auth cookie and redirect to the log-in page.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use axum_extra::extract::PrivateCookieJar;

    use crate::{app_state::create_cookie_key, endpoints};

    use super::get_log_out;

    #[tokio::test]
    async fn log_out_redirects_to_log_in_page() {
        let jar = PrivateCookieJar::new(create_cookie_key("42"));

        let response = get_log_out(jar).await.into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::LOG_IN_VIEW
        );
    }
}
