//! Environment-only token store: nothing is persisted.

use crate::slot::TokenSlot;
use async_trait::async_trait;
use std::sync::Arc;
use subwatch_types::{Clock, SubwatchError, TokenStore, traits::Result};

/// A [`TokenStore`] whose only durable source is the static refresh token
/// supplied through `TWITCH_REFRESH_TOKEN`. Tokens obtained at runtime live
/// in memory until the process exits.
pub struct EnvTokenStore {
    slot: TokenSlot,
    fallback: Option<String>,
}

impl EnvTokenStore {
    /// Creates a store with an optional static refresh token. Empty strings
    /// count as absent.
    #[must_use]
    pub fn new(fallback: Option<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: TokenSlot::new(clock),
            fallback: fallback.filter(|t| !t.is_empty()),
        }
    }
}

#[async_trait]
impl TokenStore for EnvTokenStore {
    async fn get_refresh_token(&self) -> Result<String> {
        self.slot
            .refresh_token()
            .or_else(|| self.fallback.clone())
            .ok_or(SubwatchError::MissingCredential)
    }

    async fn set_refresh_token(&self, token: &str) {
        self.slot.set_refresh_token(token);
        tracing::info!("refresh token held in memory only; set TWITCH_REFRESH_TOKEN to keep it");
    }

    async fn set_access_token(&self, token: &str, expires_in_secs: u64) {
        self.slot.set_access_token(token, expires_in_secs);
    }

    async fn get_stored_access_token(&self) -> Option<String> {
        self.slot.valid_access_token()
    }

    fn backend(&self) -> &'static str {
        "environment"
    }
}
