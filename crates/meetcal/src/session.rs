//! OAuth session and token lifecycle.
//!
//! An [`AuthSession`] owns the client credentials and the current token.
//! Construction runs the full bootstrap: load a persisted token, refresh
//! it if expired, or fall back to interactive acquisition through an
//! [`AuthCodeProvider`]. Afterwards every API call goes through
//! [`bearer_token`](AuthSession::bearer_token), which re-checks expiry
//! lazily and refreshes transparently.

use chrono_tz::Tz;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth_code::AuthCodeProvider;
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::token::{Token, TokenStore};

/// An authenticated session against the calendar service.
///
/// At most one valid token is active per session at any time. Refresh is
/// serialized by a session-local lock, so concurrent client calls cannot
/// race two refreshes against the token file.
#[derive(Debug)]
pub struct AuthSession {
    config: SessionConfig,
    store: TokenStore,
    http: reqwest::Client,
    token: Mutex<Option<Token>>,
}

impl AuthSession {
    /// Builds a session and runs the token bootstrap.
    ///
    /// - A persisted token that is still valid is used as-is.
    /// - An expired token with a refresh token is refreshed; failure is
    ///   fatal ([`Error::AuthRefresh`]) with no fallback to the
    ///   interactive flow.
    /// - Otherwise the interactive flow runs: the authorization URL is
    ///   handed to `code_provider`, and the returned code is exchanged
    ///   for a token ([`Error::AuthExchange`] on rejection).
    ///
    /// A corrupt token file is logged and treated as missing, so a
    /// damaged file degrades to re-acquisition instead of a hard failure.
    /// On any successful acquisition or refresh the token is persisted.
    pub async fn initialize(
        config: SessionConfig,
        code_provider: &dyn AuthCodeProvider,
    ) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::AuthConfig(format!("failed to build HTTP client: {}", e)))?;

        let store = TokenStore::new(&config.token_path);
        let loaded = match store.load() {
            Ok(token) => token,
            Err(Error::CorruptToken { path, reason }) => {
                warn!("corrupt token file at {:?} ({}), re-acquiring", path, reason);
                None
            }
            Err(e) => return Err(e),
        };

        let session = Self {
            config,
            store,
            http,
            token: Mutex::new(loaded),
        };
        session.establish(code_provider).await?;
        Ok(session)
    }

    /// Ensures the in-memory token is valid, acquiring or refreshing it
    /// as needed.
    async fn establish(&self, code_provider: &dyn AuthCodeProvider) -> Result<()> {
        let mut guard = self.token.lock().await;

        match (*guard).clone() {
            Some(token) if !token.is_expired() => Ok(()),
            Some(token) if token.refresh_token.is_some() => {
                let refreshed = self.refresh(&token).await?;
                self.store.save(&refreshed)?;
                *guard = Some(refreshed);
                Ok(())
            }
            _ => {
                let acquired = self.interactive_acquire(code_provider).await?;
                self.store.save(&acquired)?;
                *guard = Some(acquired);
                Ok(())
            }
        }
    }

    /// Returns a non-expired access token, refreshing transparently if
    /// the in-memory token has expired since the last call.
    pub async fn bearer_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;

        match (*guard).clone() {
            Some(token) if !token.is_expired() => Ok(token.access_token),
            Some(token) if token.refresh_token.is_some() => {
                let refreshed = self.refresh(&token).await?;
                self.store.save(&refreshed)?;
                let access = refreshed.access_token.clone();
                *guard = Some(refreshed);
                Ok(access)
            }
            _ => Err(Error::AuthRefresh(
                "access token expired and no refresh token is available".to_string(),
            )),
        }
    }

    /// Builds the authorization URL the user must visit to grant consent.
    pub fn authorization_url(&self) -> String {
        let credentials = &self.config.credentials;
        let scope = credentials.scopes.join(" ");

        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
             access_type=offline&prompt={}",
            self.config.auth_url,
            urlencoding::encode(&credentials.client_id),
            urlencoding::encode(&credentials.redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode("select_account consent"),
        )
    }

    /// Runs the interactive acquisition: consent URL out, code in,
    /// code exchanged for a token.
    async fn interactive_acquire(&self, code_provider: &dyn AuthCodeProvider) -> Result<Token> {
        let auth_url = self.authorization_url();
        info!("no usable token, starting interactive authorization");

        let code = code_provider.authorization_code(&auth_url)?;
        self.exchange_code(&code).await
    }

    /// Exchanges an authorization code for a token.
    async fn exchange_code(&self, code: &str) -> Result<Token> {
        let credentials = &self.config.credentials;
        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", credentials.redirect_uri.as_str()),
        ];

        let response = self
            .token_endpoint_request(&params)
            .await
            .map_err(Error::AuthExchange)?;

        let access_token = response
            .access_token
            .ok_or_else(|| Error::AuthExchange("token response missing access_token".to_string()))?;

        info!("obtained access token via authorization code");
        Ok(Token::new(
            access_token,
            response.refresh_token,
            response.expires_in,
        ))
    }

    /// Exchanges the refresh token for a new access token.
    ///
    /// The token endpoint usually omits the refresh token on refresh, so
    /// the previous one is carried forward.
    async fn refresh(&self, current: &Token) -> Result<Token> {
        let refresh_token = current.refresh_token.as_deref().ok_or_else(|| {
            Error::AuthRefresh("no refresh token available".to_string())
        })?;

        debug!("refreshing expired access token");

        let credentials = &self.config.credentials;
        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .token_endpoint_request(&params)
            .await
            .map_err(Error::AuthRefresh)?;

        let access_token = response
            .access_token
            .ok_or_else(|| Error::AuthRefresh("token response missing access_token".to_string()))?;

        info!("refreshed access token");
        Ok(Token::new(
            access_token,
            response
                .refresh_token
                .or_else(|| current.refresh_token.clone()),
            response.expires_in,
        ))
    }

    /// POSTs a form to the token endpoint and surfaces failures as a
    /// message string; callers wrap it in the path-specific error.
    async fn token_endpoint_request(
        &self,
        params: &[(&str, &str)],
    ) -> std::result::Result<TokenResponse, String> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| format!("token request failed: {}", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("failed to read token response: {}", e))?;

        let parsed: TokenResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(format!("token endpoint returned {}: {}", status, body));
            }
            Err(e) => return Err(format!("invalid token response: {}", e)),
        };

        if let Some(error) = parsed.error {
            let detail = parsed.error_description.unwrap_or_default();
            return Err(if detail.is_empty() {
                error
            } else {
                format!("{}: {}", error, detail)
            });
        }

        if !status.is_success() {
            return Err(format!("token endpoint returned {}: {}", status, body));
        }

        Ok(parsed)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn api_base(&self) -> &str {
        &self.config.api_base
    }

    pub(crate) fn time_zone(&self) -> Tz {
        self.config.time_zone
    }
}

/// Response from the token endpoint. Error responses carry `error` and
/// `error_description` instead of the token fields.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}
