//! `GET /api/twitch/subscribers`: cached, enriched subscriber list.

use crate::{
    AppState, ApiError,
    cache::{CacheEntry, SubscriberCache},
};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subwatch_twitch::fetch_subscriber_bundle;
use subwatch_types::{SubscriberBundle, traits::Result};

#[derive(Debug, Default, Deserialize)]
pub struct SubscribersQuery {
    /// `true` skips the cache read.
    #[serde(default)]
    pub force: Option<String>,
}

/// How the response was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheMeta {
    pub from_cache: bool,
    pub cached_at: u64,
    pub expires_at: u64,
    pub remaining_time: u64,
    pub stale: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscribersResponse {
    #[serde(flatten)]
    pub bundle: SubscriberBundle,
    #[serde(rename = "_cache_info")]
    pub cache_info: CacheMeta,
}

impl SubscribersResponse {
    fn new(
        cache: &SubscriberCache,
        entry: CacheEntry<SubscriberBundle>,
        from_cache: bool,
        error: Option<String>,
    ) -> Self {
        let stale = error.is_some() || (from_cache && cache.is_stale(&entry));
        Self {
            cache_info: CacheMeta {
                from_cache,
                cached_at: entry.cached_at,
                expires_at: entry.expires_at,
                remaining_time: entry.expires_at.saturating_sub(cache.now_ms()),
                stale,
                error,
            },
            bundle: entry.payload,
        }
    }
}

/// Obtains a token, runs the Helix pipeline, and stores the result.
///
/// # Errors
///
/// Returns the token failure or the first upstream error.
pub async fn refresh_subscribers(state: &AppState) -> Result<CacheEntry<SubscriberBundle>> {
    let token = state.auth.access_token().await?;
    let bundle = fetch_subscriber_bundle(state.api.as_ref(), &token).await?;
    Ok(state.cache.set_cached(bundle))
}

pub async fn subscribers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubscribersQuery>,
) -> std::result::Result<Json<SubscribersResponse>, ApiError> {
    let force = query.force.as_deref() == Some("true");

    if !force && let Some(entry) = state.cache.get_cached() {
        tracing::debug!(cached_at = entry.cached_at, "serving subscribers from cache");
        return Ok(Json(SubscribersResponse::new(&state.cache, entry, true, None)));
    }

    match refresh_subscribers(&state).await {
        Ok(entry) => Ok(Json(SubscribersResponse::new(
            &state.cache,
            entry,
            false,
            None,
        ))),
        Err(e) if e.is_token_failure() => {
            let Some(entry) = state.cache.peek() else {
                return Err(e.into());
            };
            tracing::warn!(error = %e, "token unavailable, serving stale subscribers");
            Ok(Json(SubscribersResponse::new(
                &state.cache,
                entry,
                true,
                Some(e.to_string()),
            )))
        }
        Err(e) => Err(e.into()),
    }
}
