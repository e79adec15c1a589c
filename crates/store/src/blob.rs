//! Token store persisting the full [`TokenRecord`] in a [`BlobStore`].

use crate::slot::TokenSlot;
use async_trait::async_trait;
use std::sync::Arc;
use subwatch_types::{BlobStore, Clock, SubwatchError, TokenRecord, TokenStore, traits::Result};

/// A [`TokenStore`] for production deployments where the filesystem is not
/// durable. Both tokens and the access-token expiry are written under one
/// blob key.
pub struct BlobTokenStore {
    slot: TokenSlot,
    blobs: Arc<dyn BlobStore>,
    key: String,
    fallback: Option<String>,
}

impl BlobTokenStore {
    #[must_use]
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        key: impl Into<String>,
        fallback: Option<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            slot: TokenSlot::new(clock),
            blobs,
            key: key.into(),
            fallback: fallback.filter(|t| !t.is_empty()),
        }
    }

    async fn load(&self) -> Result<Option<TokenRecord>> {
        match self.blobs.get(&self.key).await? {
            None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| SubwatchError::Storage(format!("blob `{}`: {e}", self.key))),
        }
    }

    /// Read-modify-write of the stored record. Falls back to the in-memory
    /// snapshot when the stored copy cannot be read.
    async fn persist(&self, update: impl FnOnce(&mut TokenRecord) + Send) {
        let mut record = match self.load().await {
            Ok(stored) => stored.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored tokens, writing memory snapshot");
                self.slot.snapshot()
            }
        };
        update(&mut record);
        let result = match serde_json::to_value(&record) {
            Ok(value) => self.blobs.set(&self.key, &value).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, key = %self.key, "failed to persist tokens");
        }
    }
}

#[async_trait]
impl TokenStore for BlobTokenStore {
    async fn get_refresh_token(&self) -> Result<String> {
        if let Some(token) = self.slot.refresh_token() {
            return Ok(token);
        }
        match self.load().await {
            Ok(Some(record)) => {
                self.slot.absorb(&record);
                if let Some(token) = record.refresh_token.filter(|t| !t.is_empty()) {
                    return Ok(token);
                }
            }
            Ok(None) => {}
            Err(e) if self.fallback.is_some() => {
                tracing::warn!(error = %e, "blob store unreadable, using environment fallback");
            }
            Err(e) => return Err(e),
        }
        self.fallback
            .clone()
            .ok_or(SubwatchError::MissingCredential)
    }

    async fn set_refresh_token(&self, token: &str) {
        self.slot.set_refresh_token(token);
        let token = token.to_string();
        self.persist(move |record| record.refresh_token = Some(token))
            .await;
    }

    async fn set_access_token(&self, token: &str, expires_in_secs: u64) {
        let updated = self.slot.set_access_token(token, expires_in_secs);
        self.persist(move |record| {
            record.access_token = updated.access_token;
            record.expires_at = updated.expires_at;
        })
        .await;
    }

    async fn get_stored_access_token(&self) -> Option<String> {
        if let Some(token) = self.slot.valid_access_token() {
            return Some(token);
        }
        match self.load().await {
            Ok(Some(record)) => {
                self.slot.absorb(&record);
                self.slot.valid_access_token()
            }
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(error = %e, "stored access token unreadable");
                None
            }
        }
    }

    fn backend(&self) -> &'static str {
        "blob"
    }
}
