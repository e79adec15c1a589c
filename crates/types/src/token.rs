//! The persisted OAuth token record and its expiry logic.

use serde::{Deserialize, Serialize};

/// Safety margin subtracted from every access token lifetime, so a token is
/// never handed out in its final minute.
pub const ACCESS_TOKEN_MARGIN_MS: u64 = 60_000;

/// Refresh token plus the current short-lived access token.
///
/// Serialized with camelCase keys because this is the exact layout stored
/// under the blob key: `{ "refreshToken"?, "accessToken"?, "expiresAt"? }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Milliseconds since the Unix epoch, margin already applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl TokenRecord {
    /// Stores `access_token`, expiring `expires_in_secs` from `now_ms` minus
    /// [`ACCESS_TOKEN_MARGIN_MS`].
    pub fn set_access_token(
        &mut self,
        access_token: impl Into<String>,
        expires_in_secs: u64,
        now_ms: u64,
    ) {
        let lifetime_ms = expires_in_secs.saturating_mul(1000);
        self.access_token = Some(access_token.into());
        self.expires_at = Some(
            now_ms
                .saturating_add(lifetime_ms)
                .saturating_sub(ACCESS_TOKEN_MARGIN_MS),
        );
    }

    /// Returns the access token if one is present and `now_ms < expires_at`.
    #[must_use]
    pub fn valid_access_token(&self, now_ms: u64) -> Option<&str> {
        let token = self.access_token.as_deref()?;
        let expires_at = self.expires_at?;
        (now_ms < expires_at).then_some(token)
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.refresh_token.is_none() && self.access_token.is_none() && self.expires_at.is_none()
    }
}
