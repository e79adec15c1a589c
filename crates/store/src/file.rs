//! File-backed token store for local development.
//!
//! Layout: a single JSON object `{ "refresh_token": "…" }`. Only the refresh
//! token is written to disk; access tokens stay in memory.

use crate::slot::TokenSlot;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{io::ErrorKind, path::PathBuf, sync::Arc};
use subwatch_types::{Clock, SubwatchError, TokenStore, traits::Result};

#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
    refresh_token: String,
}

/// A [`TokenStore`] that persists the refresh token to a JSON file.
pub struct FileTokenStore {
    slot: TokenSlot,
    path: PathBuf,
    fallback: Option<String>,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, fallback: Option<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: TokenSlot::new(clock),
            path: path.into(),
            fallback: fallback.filter(|t| !t.is_empty()),
        }
    }

    async fn read_file(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => {
                let file: TokenFile = serde_json::from_str(&text).map_err(|e| {
                    SubwatchError::Storage(format!("{}: {e}", self.path.display()))
                })?;
                Ok(Some(file.refresh_token).filter(|t| !t.is_empty()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SubwatchError::Storage(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn write_file(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SubwatchError::Storage(format!("{}: {e}", parent.display())))?;
        }
        let json = serde_json::to_string_pretty(&TokenFile {
            refresh_token: token.to_string(),
        })?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| SubwatchError::Storage(format!("{}: {e}", self.path.display())))
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get_refresh_token(&self) -> Result<String> {
        if let Some(token) = self.slot.refresh_token() {
            return Ok(token);
        }
        match self.read_file().await {
            Ok(Some(token)) => {
                self.slot.set_refresh_token(&token);
                return Ok(token);
            }
            Ok(None) => {}
            Err(e) if self.fallback.is_some() => {
                tracing::warn!(error = %e, "token file unreadable, using environment fallback");
            }
            Err(e) => return Err(e),
        }
        self.fallback
            .clone()
            .ok_or(SubwatchError::MissingCredential)
    }

    async fn set_refresh_token(&self, token: &str) {
        self.slot.set_refresh_token(token);
        if let Err(e) = self.write_file(token).await {
            tracing::warn!(error = %e, "failed to persist refresh token");
        }
    }

    async fn set_access_token(&self, token: &str, expires_in_secs: u64) {
        self.slot.set_access_token(token, expires_in_secs);
    }

    async fn get_stored_access_token(&self) -> Option<String> {
        self.slot.valid_access_token()
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}
