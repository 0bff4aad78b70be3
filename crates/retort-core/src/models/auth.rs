//! Authentication request/response types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request body for password login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Server response to a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Some deployments still answer with the `api_key` spelling.
    #[serde(default, alias = "api_key")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

/// The authenticated user, as reported by the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_api_key_alias() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"api_key": "tok-1"}"#).unwrap();
        assert_eq!(response.access_token.as_deref(), Some("tok-1"));

        let response: LoginResponse =
            serde_json::from_str(r#"{"access_token": "tok-2"}"#).unwrap();
        assert_eq!(response.access_token.as_deref(), Some("tok-2"));
    }
}
