//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{auth_guard, auth_guard_hx},
    customer::{
        create_customer_endpoint, delete_customer_endpoint, get_customer_all_page,
        get_customer_page, get_customers_page, get_delete_customer_page, get_edit_customer_page,
        get_new_customer_page, search_customers_endpoint, update_customer_endpoint,
        upload_customer_attachment,
    },
    endpoints,
    internal_server_error::get_internal_server_error_page,
    log_in::{get_log_in_page, post_log_in},
    log_out::get_log_out,
    not_found::get_404_not_found,
    register_user::{get_register_page, register_user},
    report::get_report_page,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::CUSTOMERS_VIEW, get(get_customers_page))
        .route(endpoints::NEW_CUSTOMER_VIEW, get(get_new_customer_page))
        .route(endpoints::CUSTOMER_VIEW, get(get_customer_page))
        .route(endpoints::CUSTOMER_ALL_VIEW, get(get_customer_all_page))
        .route(endpoints::EDIT_CUSTOMER_VIEW, get(get_edit_customer_page))
        .route(
            endpoints::DELETE_CUSTOMER_VIEW,
            get(get_delete_customer_page),
        )
        .route(endpoints::REPORT_VIEW, get(get_report_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST/PUT/DELETE routes need to use the HX-Redirect header for auth
    // redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::SEARCH_CUSTOMERS, get(search_customers_endpoint))
            .route(endpoints::POST_CUSTOMER, post(create_customer_endpoint))
            .route(endpoints::PUT_CUSTOMER, put(update_customer_endpoint))
            .route(endpoints::DELETE_CUSTOMER, delete(delete_customer_endpoint))
            .route(
                endpoints::POST_CUSTOMER_ATTACHMENT,
                post(upload_customer_attachment),
            )
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the customers page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::CUSTOMERS_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_customers() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::CUSTOMERS_VIEW);
    }
}

#[cfg(test)]
mod router_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, endpoints, pagination::PaginationConfig};

    use super::build_router;

    fn get_test_server() -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let state = AppState::new(
            connection,
            "42",
            "Pacific/Auckland",
            "uploads/",
            PaginationConfig::default(),
        )
        .expect("Could not create app state");

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn log_in_page_is_reachable_without_auth() {
        let server = get_test_server();

        let response = server.get(endpoints::LOG_IN_VIEW).await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn customers_page_requires_auth() {
        let server = get_test_server();

        let response = server.get(endpoints::CUSTOMERS_VIEW).await;

        response.assert_status_see_other();
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let server = get_test_server();

        let response = server.get("/no/such/page").await;

        response.assert_status_not_found();
    }
}
