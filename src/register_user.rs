//! Defines the registration page and the endpoint that creates new users.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
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
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::set_auth_cookie,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner,
        log_in_register,
    },
    user::create_user,
};

/// The state needed to register a user.
#[derive(Debug, Clone)]
pub struct RegisterUserState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegisterUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegisterUserState> for Key {
    fn from_ref(state: &RegisterUserState) -> Self {
        state.cookie_key.clone()
    }
}

/// The form data for registering a user.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    /// The new user's email address.
    pub email: String,
    /// The new user's plain text password.
    pub password: String,
    /// The password, typed again.
    pub confirm_password: String,
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let form = register_form("", None);
    let content = log_in_register("Create an account", &form);

    base("Register", &[], &content).into_response()
}

/// Handle registration form submissions.
///
/// On success the new user is logged in right away and redirected to the
/// customers page.
pub async fn register_user(
    State(state): State<RegisterUserState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let email = form.email.trim();

    if email.is_empty() {
        return register_form(email, Some("Email cannot be empty")).into_response();
    }

    if form.password != form.confirm_password {
        return register_form(email, Some("Passwords do not match")).into_response();
    }

    let password = match ValidatedPassword::new(&form.password, &[email]) {
        Ok(password) => password,
        Err(Error::TooWeak(feedback)) => {
            return register_form(email, Some(&format!("Password is too weak: {feedback}")))
                .into_response();
        }
        Err(error) => {
            tracing::error!("Unexpected error while validating password: {error}");
            return register_form(email, Some("An internal error occurred")).into_response();
        }
    };

    let password_hash = match PasswordHash::new(password) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("Could not hash password: {error}");
            return register_form(email, Some("An internal error occurred")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let user = match create_user(email, password_hash, false, &connection) {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            return register_form(email, Some("That email address is already registered"))
                .into_response();
        }
        Err(error) => {
            tracing::error!("Could not create user: {error}");
            return register_form(email, Some("An internal error occurred")).into_response();
        }
    };

    let jar = match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Could not set auth cookie: {error}");
            return (
                HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response();
        }
    };

    (
        jar,
        HxRedirect(endpoints::CUSTOMERS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

fn register_form(email: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #confirm_password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
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

            div
            {
                label for="confirm_password" class=(FORM_LABEL_STYLE) { "Confirm Password" }

                input
                    id="confirm_password"
                    type="password"
                    name="confirm_password"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if let Some(error_message) = error_message {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                (loading_spinner())
                "Register"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Already have an account? "
                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}
