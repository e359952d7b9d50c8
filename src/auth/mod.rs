//! Cookie-based authentication.
//!
//! The log-in endpoint stores the user's ID in a private (encrypted) cookie
//! together with an expiry timestamp. The auth middleware checks both on
//! every request to a protected route and places the [crate::UserId] into the
//! request extensions for the route handlers.

mod cookie;
mod middleware;

pub use cookie::{
    DEFAULT_COOKIE_DURATION, get_user_id_from_cookies, invalidate_auth_cookie, set_auth_cookie,
};
pub use middleware::{auth_guard, auth_guard_hx};
pub(crate) use middleware::normalize_redirect_url;
