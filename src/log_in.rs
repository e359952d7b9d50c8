//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The auth module handles the lower level authentication and cookie logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{normalize_redirect_url, set_auth_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CHECKBOX_LABEL_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        base, loading_spinner, log_in_register,
    },
    user::get_user_by_email,
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";

/// The state needed to perform a log-in.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The form data for a log-in request.
#[derive(Debug, Deserialize)]
pub struct LogInData {
    /// The user's email address.
    pub email: String,
    /// The user's plain text password.
    pub password: String,
    /// Whether to keep the user logged in for longer than the default.
    #[serde(default)]
    pub remember_me: Option<String>,
    /// Where to send the user after a successful log-in.
    pub redirect_url: Option<String>,
}

/// The query parameters accepted by the log-in page.
#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    /// Where to send the user after a successful log-in.
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = query
        .redirect_url
        .as_deref()
        .and_then(normalize_redirect_url);
    let form = log_in_form("", None, redirect_url.as_deref());
    let content = log_in_register("Log in to your account", &form);

    base("Log In", &[], &content).into_response()
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie is set and the client is
/// redirected to the customers page (or the requested redirect URL).
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = user_data
        .redirect_url
        .as_deref()
        .and_then(normalize_redirect_url);
    let redirect_url = redirect_url.as_deref();

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let user = match get_user_by_email(user_data.email.trim(), &connection) {
        Ok(user) => user,
        Err(Error::NotFound) => {
            return log_in_form(
                &user_data.email,
                Some(INVALID_CREDENTIALS_ERROR_MSG),
                redirect_url,
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_form(
                &user_data.email,
                Some("An internal error occurred. Please try again later."),
                redirect_url,
            )
            .into_response();
        }
    };

    let is_password_valid = match user.password_hash.verify(&user_data.password) {
        Ok(is_password_valid) => is_password_valid,
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_form(
                &user_data.email,
                Some("An internal error occurred. Please try again later."),
                redirect_url,
            )
            .into_response();
        }
    };

    if !is_password_valid {
        return log_in_form(
            &user_data.email,
            Some(INVALID_CREDENTIALS_ERROR_MSG),
            redirect_url,
        )
        .into_response();
    }

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let jar = match set_auth_cookie(jar, user.id, cookie_duration) {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Could not set auth cookie: {error}");
            return Error::InvalidCredentials.into_response();
        }
    };

    let target = redirect_url.unwrap_or(endpoints::CUSTOMERS_VIEW);

    (
        jar,
        HxRedirect(target.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

fn log_in_form(email: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                input
                    id="email"
                    type="email"
                    name="email"
                    value=(email)
                    placeholder="you@example.com"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="password" class=(FORM_LABEL_STYLE) { "Password" }

                input
                    id="password"
                    type="password"
                    name="password"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label for="remember_me" class=(FORM_CHECKBOX_LABEL_STYLE)
                {
                    "Keep me logged in for one week"
                }
            }

            @if let Some(error_message) = error_message {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                (loading_spinner())
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Don't have an account? "
                a
                    href=(endpoints::REGISTER_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Register here"
                }
            }
        }
    }
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Query, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_extra::extract::PrivateCookieJar;
    use rusqlite::Connection;

    use crate::{
        PasswordHash,
        app_state::create_cookie_key,
        auth::DEFAULT_COOKIE_DURATION,
        db::initialize,
        endpoints,
        test_utils::{assert_hx_redirect, must_get_form, parse_html_document, parse_html_fragment},
        user::create_user,
    };

    use super::{
        INVALID_CREDENTIALS_ERROR_MSG, LogInData, LogInState, RedirectQuery, get_log_in_page,
        post_log_in,
    };

    const TEST_PASSWORD: &str = "correcthorsebatterystaple";

    fn get_log_in_state() -> LogInState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        let hash = PasswordHash::new(crate::ValidatedPassword::new_unchecked(TEST_PASSWORD))
            .expect("Could not hash password");
        create_user("foo@bar.baz", hash, false, &connection).expect("Could not create test user");

        LogInState {
            cookie_key: create_cookie_key("42"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn get_jar(state: &LogInState) -> PrivateCookieJar {
        PrivateCookieJar::new(state.cookie_key.clone())
    }

    #[tokio::test]
    async fn log_in_page_renders_form() {
        let response = get_log_in_page(Query(RedirectQuery { redirect_url: None }))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        must_get_form(&html);
    }

    #[tokio::test]
    async fn log_in_with_valid_credentials_redirects_to_customers() {
        let state = get_log_in_state();
        let jar = get_jar(&state);
        let form = LogInData {
            email: "foo@bar.baz".to_owned(),
            password: TEST_PASSWORD.to_owned(),
            remember_me: None,
            redirect_url: None,
        };

        let response = post_log_in(State(state), jar, Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CUSTOMERS_VIEW);
    }

    #[tokio::test]
    async fn log_in_with_wrong_password_shows_error() {
        let state = get_log_in_state();
        let jar = get_jar(&state);
        let form = LogInData {
            email: "foo@bar.baz".to_owned(),
            password: "wrong password".to_owned(),
            remember_me: None,
            redirect_url: None,
        };

        let response = post_log_in(State(state), jar, Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert!(
            html.html().contains(INVALID_CREDENTIALS_ERROR_MSG),
            "expected the invalid credentials message in {}",
            html.html()
        );
    }

    #[tokio::test]
    async fn log_in_with_unknown_email_shows_error() {
        let state = get_log_in_state();
        let jar = get_jar(&state);
        let form = LogInData {
            email: "nobody@example.com".to_owned(),
            password: TEST_PASSWORD.to_owned(),
            remember_me: None,
            redirect_url: None,
        };

        let response = post_log_in(State(state), jar, Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert!(html.html().contains(INVALID_CREDENTIALS_ERROR_MSG));
    }
}
