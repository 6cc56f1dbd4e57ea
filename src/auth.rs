//! Upstream authentication: forwarded identity and OAuth client credentials

use crate::error::QueryError;
use crate::settings::PluginSettings;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const ID_TOKEN_HEADER: &str = "X-ID-Token";

fn header_value<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
        .filter(|value| !value.is_empty())
}

/// Identity headers copied from the caller's request when pass-through is enabled.
pub fn forwarded_identity_headers(
    request_headers: &HashMap<String, String>,
    settings: &PluginSettings,
) -> Vec<(String, String)> {
    if !settings.oauth_pass_thru {
        return Vec::new();
    }
    debug!("Forwarding OAuth identity");

    [AUTHORIZATION_HEADER, ID_TOKEN_HEADER]
        .iter()
        .filter_map(|name| {
            header_value(request_headers, name).map(|value| (name.to_string(), value.to_string()))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Fetches an access token with the client-credentials grant.
///
/// # Errors
/// Returns `AuthError` if the token endpoint is unreachable, answers with a
/// non-success status, or returns a body without `access_token`.
pub async fn fetch_client_credentials_token(
    client: &Client,
    settings: &PluginSettings,
) -> Result<String, AuthError> {
    let mut form = vec![
        ("grant_type", "client_credentials"),
        ("client_id", settings.oauth_client_id.as_str()),
        ("client_secret", settings.secrets.oauth_client_secret.as_str()),
    ];
    if !settings.oauth_scope.is_empty() {
        form.push(("scope", settings.oauth_scope.as_str()));
    }

    let response = client
        .post(&settings.oauth_token_url)
        .form(&form)
        .send()
        .await
        .map_err(|e| AuthError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::Status(status.as_u16(), body));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| AuthError::Parse(e.to_string()))?;
    debug!("Acquired client credentials token (expires_in: {:?})", token.expires_in);
    Ok(token.access_token)
}

/// Headers to attach to every upstream request of a batch.
///
/// # Errors
/// Returns `QueryError::Transport` if client credentials are configured and
/// the token cannot be acquired.
pub async fn upstream_auth_headers(
    client: &Client,
    settings: &PluginSettings,
    request_headers: &HashMap<String, String>,
) -> Result<Vec<(String, String)>, QueryError> {
    let mut headers = forwarded_identity_headers(request_headers, settings);

    if settings.is_client_credentials_configured() {
        let token = fetch_client_credentials_token(client, settings).await?;
        headers.retain(|(name, _)| name != AUTHORIZATION_HEADER);
        headers.push((AUTHORIZATION_HEADER.to_string(), format!("Bearer {}", token)));
    }

    Ok(headers)
}

/// Errors that can occur while acquiring an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Token endpoint could not be reached
    Request(String),
    /// Token endpoint answered with a non-success status
    Status(u16, String),
    /// Token response could not be parsed
    Parse(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Request(msg) => write!(f, "token request failed: {}", msg),
            AuthError::Status(code, body) => write!(f, "token endpoint returned {}: {}", code, body),
            AuthError::Parse(msg) => write!(f, "invalid token response: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<AuthError> for QueryError {
    fn from(err: AuthError) -> Self {
        QueryError::Transport(err.to_string())
    }
}
