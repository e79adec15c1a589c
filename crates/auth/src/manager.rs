//! Access-token lifecycle on top of a [`TokenStore`].
//!
//! Responsibilities:
//! - Reuse the stored access token while it is unexpired.
//! - Otherwise refresh through the refresh token and persist the result,
//!   including a rotated refresh token.
//! - Complete the OAuth handshake: exchange the code, check scopes, persist.
use crate::oauth::missing_scopes;
use std::sync::Arc;
use subwatch_types::{SubwatchError, TokenGrant, TokenStore, TwitchApi, traits::Result};

/// Snapshot of what the token store can currently provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStatus {
    pub backend: &'static str,
    pub has_refresh_token: bool,
    /// Why no refresh token could be obtained.
    pub refresh_error: Option<String>,
    pub has_access_token: bool,
}

pub struct AuthManager {
    store: Arc<dyn TokenStore>,
    api: Arc<dyn TwitchApi>,
}

impl AuthManager {
    pub fn new(store: Arc<dyn TokenStore>, api: Arc<dyn TwitchApi>) -> Self {
        Self { store, api }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Return a valid access token, refreshing if the stored one has expired.
    ///
    /// # Errors
    ///
    /// Returns [`SubwatchError::MissingCredential`] if there is no refresh
    /// token, or [`SubwatchError::UpstreamAuth`] if Twitch rejects it.
    pub async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.store.get_stored_access_token().await {
            return Ok(token);
        }

        let refresh_token = self.store.get_refresh_token().await?;
        let grant = self.api.refresh_token(&refresh_token).await?;

        if let Some(rotated) = grant.refresh_token.as_deref()
            && !rotated.is_empty()
            && rotated != refresh_token
        {
            tracing::info!("refresh token rotated");
            self.store.set_refresh_token(rotated).await;
        }
        self.store
            .set_access_token(&grant.access_token, grant.expires_in)
            .await;
        tracing::debug!(expires_in = grant.expires_in, "access token refreshed");
        Ok(grant.access_token)
    }

    /// Exchange an authorization code and persist the resulting tokens.
    ///
    /// # Errors
    ///
    /// Returns [`SubwatchError::MissingScopes`] if the grant lacks a required
    /// scope, [`SubwatchError::UpstreamAuth`] if it carries no refresh token,
    /// or whatever the code exchange failed with.
    pub async fn complete_login(&self, code: &str) -> Result<TokenGrant> {
        let grant = self.api.exchange_code(code).await?;

        let missing = missing_scopes(&grant.scope);
        if !missing.is_empty() {
            tracing::warn!(missing = ?missing, "authorization lacks required scopes");
            return Err(SubwatchError::MissingScopes(missing));
        }

        let refresh_token = grant
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SubwatchError::UpstreamAuth("token response lacks refresh_token".into()))?;

        self.store.set_refresh_token(refresh_token).await;
        self.store
            .set_access_token(&grant.access_token, grant.expires_in)
            .await;
        tracing::info!(backend = self.store.backend(), "twitch authorization stored");
        Ok(grant)
    }

    /// Report token availability without touching Twitch.
    pub async fn token_status(&self) -> TokenStatus {
        let (has_refresh_token, refresh_error) = match self.store.get_refresh_token().await {
            Ok(_) => (true, None),
            Err(e) => (false, Some(e.to_string())),
        };
        TokenStatus {
            backend: self.store.backend(),
            has_refresh_token,
            refresh_error,
            has_access_token: self.store.get_stored_access_token().await.is_some(),
        }
    }
}
