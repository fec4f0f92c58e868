/// Synchronous client for the identity provider and the bin monitoring API.
///
/// Endpoints used:
///
/// - `POST <auth_url>?key=<api_key>` — password sign-in, returns an id token
/// - `GET <base_url>/bin_status` — bin readings for the signed-in user
/// - `GET <base_url>/user/info` — account info, including the stamp user id
///
/// Monitoring calls carry `Authorization: Bearer <id_token>` taken from the
/// [`Session`] passed in by the caller.
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use super::{AuthErrorBody, AuthResponse, BinStatusData, Envelope, SignInRequest, UserInfo};
use crate::config::schema::ApiConfig;
use crate::evaluator::BinReading;
use crate::session::Session;

/// Timeout of the reachability probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Created from an [`ApiConfig`] for the lifetime of one command.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    auth_url: String,
    api_key: String,
    timeout: Duration,
}

impl ApiClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_url: config.auth_url.clone(),
            api_key: config.api_key.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sign-in URL with the API key appended when one is configured.
    fn sign_in_url(&self) -> String {
        if self.api_key.is_empty() {
            return self.auth_url.clone();
        }
        let sep = if self.auth_url.contains('?') { '&' } else { '?' };
        format!("{}{}key={}", self.auth_url, sep, self.api_key)
    }

    /// Exchange email and password for an id token.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let body = SignInRequest {
            email,
            password,
            return_secure_token: true,
        };

        match ureq::post(&self.sign_in_url())
            .timeout(self.timeout)
            .send_json(&body)
        {
            Ok(resp) => resp
                .into_json::<AuthResponse>()
                .context("failed to parse sign-in response"),
            Err(ureq::Error::Status(code, resp)) => {
                let reason = resp
                    .into_json::<AuthErrorBody>()
                    .ok()
                    .map(|body| body.error.message)
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| format!("HTTP {code}"));
                anyhow::bail!("login failed ({reason}). Please check your credentials.")
            }
            Err(err) => Err(err).context("sign-in request failed"),
        }
    }

    /// Fetch the current bin readings.
    pub fn fetch_bins(&self, session: &Session) -> Result<Vec<BinReading>> {
        let envelope: Envelope<BinStatusData> = self.get_authorized("/bin_status", session)?;

        match envelope.data.and_then(|data| data.bins) {
            Some(bins) if envelope.success => Ok(bins),
            _ => anyhow::bail!(
                "failed to retrieve bin data{}",
                server_message(envelope.message.as_deref())
            ),
        }
    }

    /// Fetch account info for the signed-in user.
    pub fn fetch_user_info(&self, session: &Session) -> Result<UserInfo> {
        let envelope: Envelope<UserInfo> = self.get_authorized("/user/info", session)?;

        match envelope.data {
            Some(info) if envelope.success => Ok(info),
            _ => anyhow::bail!(
                "failed to fetch user info{}",
                server_message(envelope.message.as_deref())
            ),
        }
    }

    /// Whether the monitoring API answers HTTP at all (any status counts).
    pub fn is_reachable(&self) -> bool {
        match ureq::get(&self.base_url).timeout(PROBE_TIMEOUT).call() {
            Ok(_) | Err(ureq::Error::Status(..)) => true,
            Err(_) => false,
        }
    }

    fn get_authorized<T: DeserializeOwned>(&self, path: &str, session: &Session) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        let resp = match ureq::get(&url)
            .timeout(self.timeout)
            .set("Authorization", &session.bearer())
            .call()
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(401 | 403, _)) => {
                anyhow::bail!("{path} rejected the session token. Run `binwatch login` again.")
            }
            Err(ureq::Error::Status(code, _)) => anyhow::bail!("{path} returned HTTP {code}"),
            Err(err) => return Err(err).with_context(|| format!("request to {url} failed")),
        };

        resp.into_json()
            .with_context(|| format!("failed to parse {path} response"))
    }
}

fn server_message(message: Option<&str>) -> String {
    match message {
        Some(m) if !m.trim().is_empty() => format!(": {}", m.trim()),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_from_default_config() {
        let client = ApiClient::from_config(&ApiConfig::default());
        assert_eq!(client.base_url(), "http://192.168.110.200:8080");
        assert_eq!(client.timeout, Duration::from_millis(10_000));
    }

    #[test]
    fn client_strips_trailing_slash() {
        let config = ApiConfig {
            base_url: "http://bins.local:8080/".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(ApiClient::from_config(&config).base_url(), "http://bins.local:8080");
    }

    #[test]
    fn sign_in_url_appends_key() {
        let config = ApiConfig {
            auth_url: "https://auth.example/v1/accounts:signInWithPassword".to_string(),
            api_key: "k1".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(
            ApiClient::from_config(&config).sign_in_url(),
            "https://auth.example/v1/accounts:signInWithPassword?key=k1"
        );

        let config = ApiConfig {
            auth_url: "https://auth.example/login?tenant=a".to_string(),
            api_key: "k1".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(
            ApiClient::from_config(&config).sign_in_url(),
            "https://auth.example/login?tenant=a&key=k1"
        );
    }

    #[test]
    fn sign_in_url_without_key_is_unchanged() {
        let config = ApiConfig {
            auth_url: "http://127.0.0.1:1/login".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(
            ApiClient::from_config(&config).sign_in_url(),
            "http://127.0.0.1:1/login"
        );
    }

    #[test]
    fn server_message_formats_suffix() {
        assert_eq!(server_message(Some(" maintenance ")), ": maintenance");
        assert_eq!(server_message(Some("")), "");
        assert_eq!(server_message(None), "");
    }
}
