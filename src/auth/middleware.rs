//! Authentication middleware that validates cookies and handles redirects.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;

use crate::{AppState, auth::get_user_id_from_cookies, endpoints};

/// The state needed for the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Build the log-in page URL with a `redirect_url` query parameter pointing
/// back at the page the user originally requested.
fn build_log_in_redirect_url(target: &str) -> String {
    match normalize_redirect_url(target) {
        Some(redirect_url) => {
            let query = serde_urlencoded::to_string([("redirect_url", redirect_url)])
                .unwrap_or_default();

            format!("{}?{}", endpoints::LOG_IN_VIEW, query)
        }
        None => endpoints::LOG_IN_VIEW.to_owned(),
    }
}

/// Validate a redirect URL taken from a request.
///
/// Only site-local paths are allowed, so that the log-in page cannot be used
/// to redirect users to another site.
pub(crate) fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    if raw_url.starts_with('/') && !raw_url.starts_with("//") {
        Some(raw_url.to_owned())
    } else {
        None
    }
}

#[inline]
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let log_in_redirect_url = build_log_in_redirect_url(request.uri().path());

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Redirecting to log in page.");
            return get_redirect(&log_in_redirect_url);
        }
    };

    let user_id = match get_user_id_from_cookies(&jar) {
        Ok(user_id) => user_id,
        Err(_) => return get_redirect(&log_in_redirect_url),
    };

    parts.extensions.insert(user_id);
    let request = Request::from_parts(parts, body);

    next.run(request).await
}

/// Middleware function that checks for a valid authorization cookie.
///
/// The user ID is placed into the request and then the request executed
/// normally if the cookie is valid, otherwise a redirect to the log-in page
/// is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(user_id): Extension<UserId>` to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Same as [auth_guard], but redirects with the HX-Redirect header so that
/// HTMX swaps the whole page instead of the alert container.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::SEE_OTHER).into_response()
    })
    .await
}
