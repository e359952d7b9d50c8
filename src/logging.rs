//! Middleware for logging requests and responses.

use axum::{extract::Request, http::header::CONTENT_TYPE, middleware::Next, response::Response};

/// The maximum number of bytes of a request or response body to log at the
/// `info` level. Longer bodies are truncated.
pub const LOG_BODY_LENGTH_LIMIT: usize = 512;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated.
/// Password fields in URL-encoded form submissions are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body_text) = extract_parts_and_body_text_from_request(request).await;

    if parts.method == axum::http::Method::POST
        && parts.headers.get(CONTENT_TYPE)
            == Some(&"application/x-www-form-urlencoded".parse().unwrap())
    {
        let display_text = redact_password(&body_text, "password");
        let display_text = redact_password(&display_text, "confirm_password");
        log_request(&parts, &display_text);
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body_text) = extract_parts_and_body_text_from_response(response).await;
    log_response(&parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

fn redact_password(form_text: &str, field_name: &str) -> String {
    let password_start = form_text.find(&format!("{field_name}="));

    let start = match password_start {
        Some(password_pos) => password_pos,
        None => return form_text.to_string(),
    };

    let password_end = form_text[start..].find('&');
    let end = match password_end {
        Some(end) => start + end,
        None => form_text.len(),
    };
    let password = &form_text[start..end];

    form_text.replace(password, &format!("{field_name}=********"))
}

async fn extract_parts_and_body_text_from_request(
    request: Request,
) -> (axum::http::request::Parts, String) {
    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();

    (parts, String::from_utf8_lossy(&body_bytes).to_string())
}

async fn extract_parts_and_body_text_from_response(
    response: Response,
) -> (axum::http::response::Parts, String) {
    let (parts, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();

    (parts, String::from_utf8_lossy(&body_bytes).to_string())
}

fn log_request(parts: &axum::http::request::Parts, body_text: &str) {
    let truncated = truncate(body_text);

    tracing::info!(
        "request: {} {} body: {}",
        parts.method,
        parts.uri,
        truncated
    );
}

fn log_response(parts: &axum::http::response::Parts, body_text: &str) {
    let truncated = truncate(body_text);

    tracing::info!("response: {} body: {}", parts.status, truncated);
}

fn truncate(body_text: &str) -> &str {
    if body_text.len() <= LOG_BODY_LENGTH_LIMIT {
        return body_text;
    }

    let mut end = LOG_BODY_LENGTH_LIMIT;
    while !body_text.is_char_boundary(end) {
        end -= 1;
    }

    &body_text[..end]
}

#[cfg(test)]
mod redact_password_tests {
    use super::redact_password;

    #[test]
    fn redacts_password_in_middle_of_form() {
        let form_text = "email=foo%40bar.baz&password=hunter2&remember_me=on";

        let got = redact_password(form_text, "password");

        assert_eq!(got, "email=foo%40bar.baz&password=********&remember_me=on");
    }

    #[test]
    fn redacts_password_at_end_of_form() {
        let form_text = "email=foo%40bar.baz&password=hunter2";

        let got = redact_password(form_text, "password");

        assert_eq!(got, "email=foo%40bar.baz&password=********");
    }

    #[test]
    fn leaves_form_without_password_unchanged() {
        let form_text = "name=Acme&notes=hello";

        let got = redact_password(form_text, "password");

        assert_eq!(got, form_text);
    }
}
