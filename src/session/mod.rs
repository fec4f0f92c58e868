/// Authenticated session handle.
///
/// A [`Session`] is created from a successful sign-in and dropped on logout.
/// It is passed explicitly to every API call that needs a bearer token; no
/// code reads it from ambient state.
///
/// Because each `binwatch` command is a short-lived process, the active
/// session is persisted to `~/.binwatch/session.json` by [`SessionStore`].
/// The token is stored in clear text in a file only the owner can read
/// (mode 0600 on Unix); `binwatch logout` removes it.
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::api::AuthResponse;

/// Token lifetime assumed when the provider omits `expiresIn`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Email the user signed in with.
    pub username: String,
    pub id_token: String,
    pub display_name: String,
    /// Provider account id, when returned.
    #[serde(default)]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Build a session from the identity provider's sign-in response.
    pub fn from_auth(username: &str, auth: AuthResponse, now: DateTime<Utc>) -> Self {
        let display_name = auth
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| username.to_string());

        let lifetime = auth
            .expires_in
            .as_deref()
            .and_then(|secs| secs.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

        Self {
            username: username.to_string(),
            id_token: auth.id_token,
            display_name,
            user_id: auth.local_id,
            created_at: now,
            expires_at: now + Duration::seconds(lifetime),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// `Authorization` header value for the monitoring API.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.id_token)
    }
}

// ---------------------------------------------------------------------------
// Credential checks
// ---------------------------------------------------------------------------

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex must compile")
});

/// Reject obviously unusable credentials before any network traffic.
pub fn validate_credentials(email: &str, password: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        anyhow::bail!("email and password are both required");
    }
    if !EMAIL_RE.is_match(email) {
        anyhow::bail!("'{email}' is not a valid email address");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// File-backed storage for the active session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the binwatch data directory (`~/.binwatch/session.json`).
    pub fn default_location() -> Result<Self> {
        let dir = crate::config::data_dir().context("could not determine home directory")?;
        Ok(Self::at(dir.join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("failed to create session directory")?;
        }
        let json = serde_json::to_string_pretty(session).context("failed to serialize session")?;
        write_private(&self.path, json.as_bytes())
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    /// Load the stored session. A missing or unreadable file yields `None`.
    pub fn load(&self) -> Option<Session> {
        let content = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Load the stored session, requiring it to exist and be unexpired.
    pub fn require_active(&self, now: DateTime<Utc>) -> Result<Session> {
        let session = self
            .load()
            .context("not logged in. Run `binwatch login <email>` first.")?;
        if session.is_expired(now) {
            anyhow::bail!("session expired. Run `binwatch login <email>` again.");
        }
        Ok(session)
    }

    /// Remove the stored session. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)
            .with_context(|| format!("failed to remove {}", self.path.display()))?;
        Ok(true)
    }
}

/// Write a file readable only by its owner (0600 on Unix).
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten files left by older versions.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    fs::write(path, contents)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
