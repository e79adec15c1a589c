//! The in-memory token slot every adapter consults first.

use std::sync::{Arc, Mutex, PoisonError};
use subwatch_types::{Clock, TokenRecord};

/// A [`TokenRecord`] behind a `Mutex`, stamped by an injectable [`Clock`].
///
/// The lock is never held across an `.await`.
pub struct TokenSlot {
    record: Mutex<TokenRecord>,
    clock: Arc<dyn Clock>,
}

impl TokenSlot {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            record: Mutex::new(TokenRecord::default()),
            clock,
        }
    }

    /// Current time from the slot's clock.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.lock().refresh_token.clone()
    }

    pub fn set_refresh_token(&self, token: &str) {
        self.lock().refresh_token = Some(token.to_string());
    }

    /// Stores the access token and returns a snapshot of the updated record.
    pub fn set_access_token(&self, token: &str, expires_in_secs: u64) -> TokenRecord {
        let now = self.now_ms();
        let mut record = self.lock();
        record.set_access_token(token, expires_in_secs, now);
        record.clone()
    }

    /// The access token, if present and unexpired.
    #[must_use]
    pub fn valid_access_token(&self) -> Option<String> {
        let now = self.now_ms();
        self.lock().valid_access_token(now).map(str::to_string)
    }

    #[must_use]
    pub fn snapshot(&self) -> TokenRecord {
        self.lock().clone()
    }

    /// Fills gaps from a persisted record. A refresh token already in memory
    /// wins, an empty persisted one is ignored, and the access token is only
    /// replaced when the one in memory is missing or expired.
    pub fn absorb(&self, persisted: &TokenRecord) {
        let now = self.now_ms();
        let mut record = self.lock();
        if record.refresh_token.is_none() {
            record.refresh_token = persisted
                .refresh_token
                .clone()
                .filter(|t| !t.is_empty());
        }
        if record.valid_access_token(now).is_none() {
            record.access_token.clone_from(&persisted.access_token);
            record.expires_at = persisted.expires_at;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TokenRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use subwatch_types::ManualClock;

    #[test]
    fn test_access_token_expires_with_clock() {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let slot = TokenSlot::new(clock.clone());
        slot.set_access_token("tok", 120);
        assert_eq!(slot.valid_access_token().as_deref(), Some("tok"));
        clock.advance(Duration::from_secs(60));
        assert!(slot.valid_access_token().is_none());
    }

    #[test]
    fn test_absorb_keeps_memory_values() {
        let slot = TokenSlot::new(Arc::new(ManualClock::new(0)));
        slot.set_refresh_token("in-memory");
        slot.absorb(&TokenRecord {
            refresh_token: Some("persisted".into()),
            access_token: Some("acc".into()),
            expires_at: Some(500),
        });
        let snap = slot.snapshot();
        assert_eq!(snap.refresh_token.as_deref(), Some("in-memory"));
        assert_eq!(snap.access_token.as_deref(), Some("acc"));
        assert_eq!(snap.expires_at, Some(500));
    }

    #[test]
    fn test_absorb_skips_empty_refresh_token() {
        let slot = TokenSlot::new(Arc::new(ManualClock::new(0)));
        slot.absorb(&TokenRecord {
            refresh_token: Some(String::new()),
            ..TokenRecord::default()
        });
        assert!(slot.refresh_token().is_none());
    }
}
