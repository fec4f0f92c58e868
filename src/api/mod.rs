//! HTTP collaborators: identity provider sign-in and the bin monitoring API.
//!
//! Everything here is a thin synchronous wrapper over `ureq`. Failures are
//! returned as `anyhow` errors with context and are treated by callers as
//! retryable; the evaluator never sees them.

pub mod client;

use serde::{Deserialize, Serialize};

pub use client::ApiClient;

use crate::evaluator::BinReading;

/// Body of the password sign-in request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

/// Identity provider sign-in response. Only `idToken` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id_token: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub local_id: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds, sent as a string.
    #[serde(default)]
    pub expires_in: Option<String>,
}

/// Error body returned by the identity provider on a failed sign-in.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthErrorBody {
    pub error: AuthErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthErrorDetail {
    #[serde(default)]
    pub message: String,
}

/// `{ success, data, message }` envelope used by every monitoring endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `data` payload of `GET /bin_status`.
#[derive(Debug, Deserialize)]
pub(crate) struct BinStatusData {
    #[serde(default)]
    pub bins: Option<Vec<BinReading>>,
}

/// `data` payload of `GET /user/info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(deserialize_with = "crate::evaluator::id_as_string")]
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_request_uses_camel_case() {
        let body = SignInRequest {
            email: "amy@campus.edu",
            password: "pw",
            return_secure_token: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["returnSecureToken"], true);
        assert_eq!(json["email"], "amy@campus.edu");
    }

    #[test]
    fn auth_response_tolerates_missing_optionals() {
        let auth: AuthResponse = serde_json::from_str(r#"{"idToken": "abc"}"#).unwrap();
        assert_eq!(auth.id_token, "abc");
        assert!(auth.display_name.is_none());
        assert!(auth.expires_in.is_none());
    }

    #[test]
    fn envelope_parses_bin_list() {
        let json = r#"{
            "success": true,
            "data": { "bins": [
                { "binStatusId": "b1", "binName": "Atrium", "usages": 3 },
                { "binStatusId": 2, "usages": 27 }
            ]}
        }"#;
        let env: Envelope<BinStatusData> = serde_json::from_str(json).unwrap();
        assert!(env.success);
        let bins = env.data.unwrap().bins.unwrap();
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[1].bin_status_id, "2");
    }

    #[test]
    fn user_info_accepts_numeric_id() {
        let info: UserInfo = serde_json::from_str(r#"{"userId": 4411}"#).unwrap();
        assert_eq!(info.user_id, "4411");
    }
}
