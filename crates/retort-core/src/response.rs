//! Response normalization.
//!
//! Every call site funnels its `reqwest::Response` through here so server
//! failures always surface the same way: a 401 becomes the fixed
//! [`RetortError::AuthRequired`], any other non-2xx becomes
//! [`RetortError::Api`] with `message`/`detail` pulled from the body.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, RetortError};

/// Parses a response as JSON.
///
/// A 204 or an empty body parses as an empty object, so endpoints that
/// answer "accepted, nothing to say" deserialize into all-optional types
/// without a special case at every call site.
pub async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(error_from_parts(status, &body));
    }

    let body = response.text().await?;
    if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
        return Ok(serde_json::from_str("{}")?);
    }

    Ok(serde_json::from_str(&body)?)
}

/// Reads a successful response as plain text.
pub async fn read_text(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(error_from_parts(status, &body));
    }

    Ok(response.text().await?)
}

/// Discards the body, failing on a non-2xx status.
pub async fn check_status(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(error_from_parts(status, &body));
    }

    Ok(())
}

/// Passes a successful response through untouched for streaming; a non-2xx
/// status consumes the body for normalization instead.
pub async fn require_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(error_from_parts(status, &body));
    }

    Ok(response)
}

/// Builds the normalized error for a non-2xx status and its raw body.
///
/// The body is checked for `message`/`detail` both at the top level and
/// under a nested `info` object; the two shapes correspond to the two error
/// envelopes servers have been seen to produce. An unparseable body falls
/// back to the HTTP status text.
pub(crate) fn error_from_parts(status: StatusCode, body: &str) -> RetortError {
    // The 401 body is unreliable in practice; the status alone decides.
    if status == StatusCode::UNAUTHORIZED {
        return RetortError::AuthRequired;
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let message = field(&value, "message").or_else(|| info_field(&value, "message"));
        let detail = field(&value, "detail").or_else(|| info_field(&value, "detail"));
        if let Some(message) = message {
            return RetortError::Api { message, detail };
        }
    }

    RetortError::Api {
        message: status_text(status),
        detail: None,
    }
}

fn field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn info_field(value: &Value, key: &str) -> Option<String> {
    value
        .get("info")
        .and_then(|info| info.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_ignores_body() {
        let err = error_from_parts(
            StatusCode::UNAUTHORIZED,
            r#"{"message": "token expired", "detail": "renew it"}"#,
        );
        assert!(matches!(err, RetortError::AuthRequired));
        assert_eq!(err.to_string(), "Authentication Required");
    }

    #[test]
    fn test_top_level_message_and_detail() {
        let err = error_from_parts(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message": "Invalid task config", "detail": "plugin field is required"}"#,
        );
        assert_eq!(err.to_string(), "Invalid task config");
        assert_eq!(err.detail(), Some("plugin field is required"));
    }

    #[test]
    fn test_nested_info_shape() {
        let err = error_from_parts(
            StatusCode::BAD_REQUEST,
            r#"{"info": {"message": "Bad experiment id", "detail": "exp-9 does not exist"}}"#,
        );
        assert_eq!(err.to_string(), "Bad experiment id");
        assert_eq!(err.detail(), Some("exp-9 does not exist"));
    }

    #[test]
    fn test_top_level_wins_over_info() {
        let err = error_from_parts(
            StatusCode::BAD_REQUEST,
            r#"{"message": "outer", "info": {"message": "inner"}}"#,
        );
        assert_eq!(err.to_string(), "outer");
    }

    #[test]
    fn test_unparseable_body_falls_back_to_status_text() {
        let err = error_from_parts(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(err.to_string(), "Internal Server Error");
        assert_eq!(err.detail(), None);
    }

    #[test]
    fn test_json_body_without_message_falls_back() {
        let err = error_from_parts(StatusCode::BAD_GATEWAY, r#"{"error": "upstream"}"#);
        assert_eq!(err.to_string(), "Bad Gateway");
    }
}
