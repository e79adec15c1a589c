//! Builds the configured token store.

use crate::{
    BlobTokenStore, EnvTokenStore, FileTokenStore, HttpBlobStore, InMemoryBlobStore,
    SqliteBlobStore,
};
use std::sync::Arc;
use subwatch_config::{BlobConfig, BlobKind, Config, TokenBackend};
use subwatch_types::{BlobStore, Clock, SubwatchError, TokenStore, traits::Result};

/// Opens the blob backend described by `config`.
///
/// # Errors
///
/// Returns [`SubwatchError::Config`] if the `http` kind has no `base_url`, or
/// [`SubwatchError::Storage`] if the `SQLite` database cannot be opened.
pub async fn open_blob_store(
    config: &BlobConfig,
    http: reqwest::Client,
) -> Result<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.kind {
        BlobKind::Memory => Arc::new(InMemoryBlobStore::new()),
        BlobKind::Sqlite => {
            Arc::new(SqliteBlobStore::new(&config.database_url, config.namespace.clone()).await?)
        }
        BlobKind::Http => {
            let base_url = config.base_url.clone().ok_or_else(|| {
                SubwatchError::Config("token_store.blob.base_url is required for kind=http".into())
            })?;
            Arc::new(HttpBlobStore::new(
                http,
                base_url,
                config.namespace.clone(),
                config.api_token.clone(),
            ))
        }
    };
    Ok(store)
}

/// Opens the token store selected by [`Config::token_backend`].
///
/// # Errors
///
/// Propagates errors from [`open_blob_store`].
pub async fn open_token_store(
    config: &Config,
    clock: Arc<dyn Clock>,
    http: reqwest::Client,
) -> Result<Arc<dyn TokenStore>> {
    let fallback = config.twitch.refresh_token.clone();
    let store: Arc<dyn TokenStore> = match config.token_backend() {
        TokenBackend::Environment => Arc::new(EnvTokenStore::new(fallback, clock)),
        TokenBackend::File => Arc::new(FileTokenStore::new(
            config.token_store.file_path.clone(),
            fallback,
            clock,
        )),
        TokenBackend::Blob => {
            let blobs = open_blob_store(&config.token_store.blob, http).await?;
            Arc::new(BlobTokenStore::new(
                blobs,
                config.token_store.blob.key.clone(),
                fallback,
                clock,
            ))
        }
    };
    tracing::info!(backend = store.backend(), "token store ready");
    Ok(store)
}
