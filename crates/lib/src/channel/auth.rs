//! Connector authentication: client-credentials token for the Bot Framework,
//! cached until shortly before expiry. With no app id configured (local
//! emulator), requests go out unauthenticated.

use crate::config::{AppType, ChannelSettings};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const LOGIN_BASE: &str = "https://login.microsoftonline.com";
const TOKEN_SCOPE: &str = "https://api.botframework.com/.default";

/// Multi-tenant apps authenticate against the shared Bot Framework tenant.
const MULTI_TENANT: &str = "botframework.com";

/// Refresh this long before the reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("token api error: {0}")]
    Api(String),
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Acquires and caches bearer tokens for the connector.
pub struct TokenProvider {
    settings: ChannelSettings,
    client: reqwest::Client,
    cached: RwLock<Option<CachedToken>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl TokenProvider {
    pub fn new(settings: ChannelSettings) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
            cached: RwLock::new(None),
        }
    }

    /// True when no app id is configured and requests are sent unauthenticated.
    pub fn is_anonymous(&self) -> bool {
        self.settings.app_id.is_none()
    }

    /// Current bearer token, fetching a fresh one when the cache is empty or
    /// near expiry. `Ok(None)` in anonymous mode.
    pub async fn bearer(&self) -> Result<Option<String>, AuthError> {
        if self.is_anonymous() {
            return Ok(None);
        }
        {
            let cached = self.cached.read().await;
            if let Some(ref t) = *cached {
                if t.expires_at > Instant::now() {
                    return Ok(Some(t.token.clone()));
                }
            }
        }
        let token = self.fetch_token().await?;
        Ok(Some(token))
    }

    async fn fetch_token(&self) -> Result<String, AuthError> {
        let app_id = self.settings.app_id.as_deref().unwrap_or_default();
        let password = self.settings.app_password.as_deref().unwrap_or_default();
        let tenant = match self.settings.app_type {
            AppType::SingleTenant => self
                .settings
                .tenant_id
                .as_deref()
                .ok_or_else(|| AuthError::Api("tenantId required for SingleTenant".to_string()))?,
            AppType::MultiTenant => MULTI_TENANT,
        };
        let url = format!("{}/{}/oauth2/v2.0/token", LOGIN_BASE, tenant);
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", app_id),
            ("client_secret", password),
            ("scope", TOKEN_SCOPE),
        ];
        let res = self.client.post(&url).form(&form).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AuthError::Api(format!("{} {}", status, body)));
        }
        let data: TokenResponse = res.json().await?;
        let ttl = Duration::from_secs(data.expires_in.unwrap_or(3600));
        let expires_at = Instant::now() + ttl.saturating_sub(EXPIRY_MARGIN);
        let mut cached = self.cached.write().await;
        *cached = Some(CachedToken {
            token: data.access_token.clone(),
            expires_at,
        });
        log::debug!("connector token refreshed, ttl {}s", ttl.as_secs());
        Ok(data.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn anonymous_without_app_id() {
        let provider = TokenProvider::new(ChannelSettings::default());
        assert!(provider.is_anonymous());
        assert_eq!(provider.bearer().await.expect("bearer"), None);
    }

    #[test]
    fn parse_token_response() {
        let data: TokenResponse =
            serde_json::from_str(r#"{"access_token":"tok","expires_in":3600,"token_type":"Bearer"}"#)
                .expect("parse");
        assert_eq!(data.access_token, "tok");
        assert_eq!(data.expires_in, Some(3600));
    }
}
