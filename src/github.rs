//! GitHub REST calls made with an app JWT.

use std::fmt;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Proxy, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::env::{proxy_url, Environment};
use crate::jwt::SignedAssertion;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";
const CLIENT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Installation id of an app on one account or organization.
pub type InstallationId = u64;

#[derive(Debug, Clone, Deserialize)]
pub struct Installation {
    pub id: InstallationId,
    #[serde(default)]
    pub account: Option<InstallationAccount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallationAccount {
    pub login: String,
}

/// An installation access token. The value is secret for its whole lifetime.
pub struct InstallationToken {
    value: SecretString,
    expires_at: Option<String>,
}

impl InstallationToken {
    pub fn new(value: impl Into<String>, expires_at: Option<String>) -> Self {
        let value: String = value.into();
        Self {
            value: SecretString::new(value.into()),
            expires_at,
        }
    }

    pub fn value(&self) -> &str {
        self.value.expose_secret()
    }

    /// Expiry timestamp as reported by GitHub (RFC 3339).
    pub fn expires_at(&self) -> Option<&str> {
        self.expires_at.as_deref()
    }
}

impl fmt::Debug for InstallationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallationToken")
            .field("value", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
    #[serde(default)]
    expires_at: Option<String>,
}

/// Error body returned by the GitHub API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// A failed provider call, already rendered for humans.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitHub API returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// The app-authenticated operations the token exchange needs.
#[async_trait]
pub trait AppProvider: Send + Sync {
    /// List installations of the app identified by `assertion`.
    async fn list_installations(
        &self,
        assertion: &SignedAssertion,
    ) -> Result<Vec<Installation>, ProviderError>;

    /// Create an access token scoped to `installation_id`.
    async fn create_installation_token(
        &self,
        assertion: &SignedAssertion,
        installation_id: InstallationId,
    ) -> Result<InstallationToken, ProviderError>;
}

/// [`AppProvider`] backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: String,
}

impl GitHubClient {
    /// Build a client for `api_url`. When `env` names an HTTPS proxy, every
    /// request goes through it.
    pub fn new(api_url: &str, env: &impl Environment) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));

        let mut builder = Client::builder()
            .user_agent(CLIENT_USER_AGENT)
            .default_headers(headers)
            .no_proxy();

        if let Some(proxy) = proxy_url(env) {
            tracing::debug!("routing GitHub API requests through HTTPS proxy");
            builder = builder.proxy(Proxy::all(proxy.as_str())?);
        }

        Ok(Self {
            client: builder.build()?,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AppProvider for GitHubClient {
    async fn list_installations(
        &self,
        assertion: &SignedAssertion,
    ) -> Result<Vec<Installation>, ProviderError> {
        let url = format!("{}/app/installations", self.api_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(assertion.bearer())
            .send()
            .await?;

        let installations = check_status(response).await?.json().await?;
        Ok(installations)
    }

    async fn create_installation_token(
        &self,
        assertion: &SignedAssertion,
        installation_id: InstallationId,
    ) -> Result<InstallationToken, ProviderError> {
        let url = format!(
            "{}/app/installations/{}/access_tokens",
            self.api_url, installation_id
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(assertion.bearer())
            .send()
            .await?;

        let body: TokenResponse = check_status(response).await?.json().await?;
        Ok(InstallationToken::new(body.token, body.expires_at))
    }
}

/// Turn a non-2xx response into [`ProviderError::Status`], preferring the
/// API's own `message` over the raw body.
async fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|parsed| parsed.message)
        .unwrap_or(body);

    Err(ProviderError::Status {
        status: status.as_u16(),
        message,
    })
}
