//! Token data and file-based persistence.
//!
//! A [`Token`] is replaced wholesale on refresh or new acquisition; the
//! [`TokenStore`] writes it as JSON with restrictive permissions.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// An OAuth access/refresh token pair with its expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The bearer access token presented on API calls.
    pub access_token: String,

    /// The long-lived refresh token, if the authorization server issued one.
    pub refresh_token: Option<String>,

    /// When the access token expires. `None` means it does not expire.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Token {
    /// Safety margin subtracted from the reported lifetime, so the token
    /// is refreshed shortly before actual expiry.
    const EXPIRY_SKEW_SECS: i64 = 60;

    /// Creates a token from token-endpoint response data.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: Self::expiry_from_lifetime(expires_in_secs),
        }
    }

    /// Returns true if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            None => false,
        }
    }

    fn expiry_from_lifetime(expires_in_secs: Option<i64>) -> Option<DateTime<Utc>> {
        expires_in_secs
            .map(|secs| Utc::now() + Duration::seconds(secs - Self::EXPIRY_SKEW_SECS))
    }
}

/// File-based token persistence.
///
/// Tokens are stored as JSON at a configurable path. The parent directory
/// is created owner-only (0700) and the file itself is written atomically
/// via a temp file, then restricted to 0600.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Creates a token store for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the token file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted token, if any.
    ///
    /// Returns `Ok(None)` when no token file exists. A file that exists
    /// but cannot be parsed is reported as [`Error::CorruptToken`], so
    /// callers can decide between failing loudly and re-acquiring.
    pub fn load(&self) -> Result<Option<Token>> {
        if !self.path.exists() {
            debug!("no token file at {:?}", self.path);
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| Error::Storage(format!("failed to read token file: {}", e)))?;

        let token: Token = serde_json::from_str(&content).map_err(|e| Error::CorruptToken {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        info!("loaded token from {:?}", self.path);
        Ok(Some(token))
    }

    /// Persists the token, replacing any previous file.
    pub fn save(&self, token: &Token) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("failed to create token directory: {}", e)))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let perms = fs::Permissions::from_mode(0o700);
                let _ = fs::set_permissions(parent, perms);
            }
        }

        // Write to a temp file first, then rename for atomicity.
        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(token)
            .map_err(|e| Error::Storage(format!("failed to serialize token: {}", e)))?;

        fs::write(&temp_path, &content)
            .map_err(|e| Error::Storage(format!("failed to write token file: {}", e)))?;

        fs::rename(&temp_path, &self.path)
            .map_err(|e| Error::Storage(format!("failed to rename token file: {}", e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&self.path, perms);
        }

        debug!("saved token to {:?}", self.path);
        Ok(())
    }
}
