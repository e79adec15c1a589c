//! Unified error type for the subwatch workspace.

use thiserror::Error;

/// Enumerates all error kinds that can occur across subwatch crates.
#[derive(Debug, Error)]
pub enum SubwatchError {
    /// No refresh token could be obtained from memory, the backing store, or the
    /// environment fallback.
    #[error("no refresh token available; authenticate at /api/twitch/login")]
    MissingCredential,

    /// The OAuth provider rejected a code exchange, refresh, or validation.
    #[error("upstream auth error: {0}")]
    UpstreamAuth(String),

    /// A downstream data API returned a non-success status.
    #[error("upstream api error: status={status}, body={body}")]
    UpstreamApi { status: u16, body: String },

    /// Backing store (file, blob, `SQLite`) read or write failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// HTTP transport error.
    #[error("http error: {0}")]
    Http(String),

    /// JSON serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The OAuth callback carried an `error` or lacked a `code`.
    #[error("invalid oauth callback: {0}")]
    InvalidCallback(String),

    /// The granted scopes do not cover what the service needs.
    #[error("missing permissions: {}", .0.join(", "))]
    MissingScopes(Vec<String>),
}

// ── Feature-gated From impls ──────────────────────────────────────────────────

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for SubwatchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for SubwatchError {
    fn from(e: sqlx::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl SubwatchError {
    /// Returns `true` if the error came from obtaining an access token, which
    /// is the class of failure the subscribers endpoint may paper over with
    /// cached data.
    #[must_use]
    pub fn is_token_failure(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::UpstreamAuth(_))
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, SubwatchError>;
