//! Session configuration and OAuth credentials.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};

/// OAuth 2.0 credentials for API access.
///
/// Users must provide their own OAuth client ID and secret, as Google
/// requires registered applications for API access. Immutable once the
/// session is constructed.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// The OAuth 2.0 client ID from the Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from the Google Cloud Console.
    pub client_secret: String,
    /// The redirect URI registered for the client.
    pub redirect_uri: String,
    /// OAuth scopes to request.
    pub scopes: Vec<String>,
}

/// Structure of Google's OAuth credentials JSON file.
///
/// Supports both the Cloud Console format with an "installed" or "web"
/// section and a flat format with client_id/client_secret at the root.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<NestedCredentials>,
    web: Option<NestedCredentials>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NestedCredentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    /// Default OAuth scope: full calendar access.
    pub const DEFAULT_SCOPE: &'static str = "https://www.googleapis.com/auth/calendar";

    /// Creates new credentials with the default calendar scope.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scopes: vec![Self::DEFAULT_SCOPE.to_string()],
        }
    }

    /// Loads the client ID and secret from a Google Cloud Console JSON file.
    pub fn from_file(path: impl AsRef<Path>, redirect_uri: impl Into<String>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::AuthConfig(format!("failed to read credentials file: {}", e)))?;
        Self::from_json(&content, redirect_uri)
    }

    /// Parses the client ID and secret from a credentials JSON string.
    ///
    /// Accepts either the Cloud Console format
    /// (`{"installed": {"client_id": ..., "client_secret": ...}}`, or a
    /// "web" section) or a flat object with both fields at the root.
    pub fn from_json(json: &str, redirect_uri: impl Into<String>) -> Result<Self> {
        let file: CredentialsFile = serde_json::from_str(json)
            .map_err(|e| Error::AuthConfig(format!("failed to parse credentials JSON: {}", e)))?;

        if let Some(creds) = file.installed.or(file.web) {
            return Ok(Self::new(creds.client_id, creds.client_secret, redirect_uri));
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret, redirect_uri));
        }

        Err(Error::AuthConfig(
            "credentials JSON must contain an 'installed'/'web' section \
             or 'client_id'/'client_secret' at the root"
                .to_string(),
        ))
    }

    /// Replaces the requested OAuth scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Validates that the credentials are usable.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(Error::AuthConfig("client_id is required".to_string()));
        }
        if self.client_secret.is_empty() {
            return Err(Error::AuthConfig("client_secret is required".to_string()));
        }
        url::Url::parse(&self.redirect_uri)
            .map_err(|e| Error::AuthConfig(format!("invalid redirect_uri: {}", e)))?;
        if self.scopes.is_empty() {
            return Err(Error::AuthConfig(
                "at least one OAuth scope is required".to_string(),
            ));
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            warn!("client_id does not look like a Google OAuth client ID");
        }
        Ok(())
    }
}

/// Configuration for an [`AuthSession`](crate::AuthSession).
///
/// Endpoint URLs default to Google's production endpoints and are
/// overridable so tests can point the session at a stub server.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// OAuth credentials for API access.
    pub credentials: Credentials,
    /// Path where the access/refresh token pair is persisted.
    pub token_path: PathBuf,
    /// Time zone attached to created calendars and events.
    pub time_zone: Tz,
    /// Request timeout.
    pub timeout: Duration,
    /// Authorization endpoint shown to the user for consent.
    pub auth_url: String,
    /// Token endpoint used for code exchange and refresh.
    pub token_url: String,
    /// Base URL for the Calendar API.
    pub api_base: String,
}

impl SessionConfig {
    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default time zone attached to created calendars and events.
    pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::Asia::Bangkok;

    /// Google's authorization endpoint.
    pub const GOOGLE_AUTH_URL: &'static str = "https://accounts.google.com/o/oauth2/v2/auth";

    /// Google's token endpoint.
    pub const GOOGLE_TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Base URL for Google Calendar API v3.
    pub const GOOGLE_API_BASE: &'static str = "https://www.googleapis.com/calendar/v3";

    /// Creates a new configuration with Google's production endpoints.
    pub fn new(credentials: Credentials, token_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials,
            token_path: token_path.into(),
            time_zone: Self::DEFAULT_TIME_ZONE,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            auth_url: Self::GOOGLE_AUTH_URL.to_string(),
            token_url: Self::GOOGLE_TOKEN_URL.to_string(),
            api_base: Self::GOOGLE_API_BASE.to_string(),
        }
    }

    /// Sets the time zone attached to created calendars and events.
    pub fn with_time_zone(mut self, time_zone: Tz) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the authorization endpoint.
    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    /// Overrides the token endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Overrides the Calendar API base URL.
    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.credentials.validate()?;
        if self.token_path.as_os_str().is_empty() {
            return Err(Error::AuthConfig("token_path is required".to_string()));
        }
        Ok(())
    }
}
