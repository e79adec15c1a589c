//! Async traits shared across all subwatch crates.
//!
//! Every cross-crate abstraction is defined here so that higher layers depend
//! only on `subwatch-types`, not on each other.

use crate::{
    SubwatchError, SubscriptionPage, TokenGrant, TokenValidation, UserProfile,
};
use async_trait::async_trait;
use serde_json::Value;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, SubwatchError>;

/// Holds the Twitch refresh token and the current access token.
///
/// Implementations keep an in-memory copy and consult their backing store
/// (environment, file, or blob) behind it. Writes are best-effort: a failed
/// persist is logged, never returned.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Returns the refresh token from memory, the backing store, or the
    /// environment fallback, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`SubwatchError::MissingCredential`] if no source has one, or
    /// [`SubwatchError::Storage`] if the backing store failed and there is no
    /// fallback to try.
    async fn get_refresh_token(&self) -> Result<String>;

    /// Replaces the refresh token in memory and in the backing store.
    async fn set_refresh_token(&self, token: &str);

    /// Stores a new access token that expires `expires_in_secs` from now,
    /// minus the safety margin.
    async fn set_access_token(&self, token: &str, expires_in_secs: u64);

    /// Returns the stored access token if it has not expired.
    async fn get_stored_access_token(&self) -> Option<String>;

    /// Short name of the backing store, for diagnostics.
    fn backend(&self) -> &'static str;
}

/// A namespaced key-value store for JSON documents.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Loads the JSON document stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    /// Stores (or overwrites) the JSON document under `key`.
    async fn set(&self, key: &str, value: &Value) -> Result<()>;
}

/// The subset of the Twitch OAuth and Helix APIs this service calls.
#[async_trait]
pub trait TwitchApi: Send + Sync {
    /// Exchanges an authorization code for tokens.
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant>;

    /// Mints a new access token from a refresh token.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant>;

    /// Resolves the user behind an access token.
    async fn validate_token(&self, access_token: &str) -> Result<TokenValidation>;

    /// Fetches one page of the broadcaster's subscriptions.
    async fn subscriptions(
        &self,
        access_token: &str,
        broadcaster_id: &str,
        after: Option<&str>,
    ) -> Result<SubscriptionPage>;

    /// Fetches public profiles for at most 100 user ids.
    async fn users(&self, access_token: &str, ids: &[String]) -> Result<Vec<UserProfile>>;
}
