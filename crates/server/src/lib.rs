//! HTTP layer: axum router, route handlers, subscriber cache and error mapping.
//!
//! Routes live under `/api/twitch/`: the OAuth handshake (`login`,
//! `callback`), the cached subscriber list, and two diagnostic pages.

pub mod cache;
mod error;
mod html;
mod oauth;
pub mod status;
pub mod subscribers;

pub use cache::{CacheEntry, CacheInfo, ResponseCache, SubscriberCache};
pub use error::ApiError;
pub use status::{StatusReport, build_report};
pub use subscribers::refresh_subscribers;

use axum::{Router, http::Method, routing::get};
use std::sync::Arc;
use subwatch_auth::AuthManager;
use subwatch_config::Config;
use subwatch_types::{Clock, TwitchApi};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared application state passed to all route handlers.
pub struct AppState {
    pub config: Arc<Config>,
    /// Token lifecycle on top of the configured token store.
    pub auth: Arc<AuthManager>,
    /// Twitch client used for the Helix calls.
    pub api: Arc<dyn TwitchApi>,
    pub cache: SubscriberCache,
}

impl AppState {
    /// Creates the shared state, sizing the cache from `config.cache`.
    pub fn new(
        config: Arc<Config>,
        auth: Arc<AuthManager>,
        api: Arc<dyn TwitchApi>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let cache = SubscriberCache::new(config.cache.ttl(), config.cache.stale_after(), clock);
        Arc::new(Self {
            config,
            auth,
            api,
            cache,
        })
    }
}

/// Build the full axum router.
///
/// Routes:
/// - GET /api/twitch/login
/// - GET /api/twitch/callback
/// - GET /api/twitch/subscribers        `?force=true` skips the cache
/// - GET /api/twitch/status             HTML, or JSON with `?format=json`
/// - GET /api/twitch/cache-status
pub fn make_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/twitch/login", get(oauth::login))
        .route("/api/twitch/callback", get(oauth::callback))
        .route("/api/twitch/subscribers", get(subscribers::subscribers))
        .route("/api/twitch/status", get(status::status))
        .route("/api/twitch/cache-status", get(status::cache_status))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt as _;
    use serde_json::Value;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use subwatch_store::EnvTokenStore;
    use subwatch_types::{
        ManualClock, Subscription, SubscriptionPage, SubwatchError, TokenGrant, TokenStore,
        TokenValidation, UserProfile, traits::Result,
    };
    use tower::ServiceExt as _;

    const NOW: u64 = 1_700_000_000_000;

    /// Scripted Twitch: one page of two subscribers, profiles for both.
    struct FakeTwitch {
        refresh_ok: AtomicBool,
        scope: Vec<String>,
        refreshes: AtomicUsize,
        pages: AtomicUsize,
        last_code: Mutex<Option<String>>,
    }

    impl FakeTwitch {
        fn new() -> Self {
            Self {
                refresh_ok: AtomicBool::new(true),
                scope: vec!["channel:read:subscriptions".into()],
                refreshes: AtomicUsize::new(0),
                pages: AtomicUsize::new(0),
                last_code: Mutex::new(None),
            }
        }

        fn grant(&self, access: &str) -> TokenGrant {
            TokenGrant {
                access_token: access.into(),
                refresh_token: Some("ref-new".into()),
                expires_in: 3600,
                scope: self.scope.clone(),
                token_type: Some("bearer".into()),
            }
        }
    }

    #[async_trait]
    impl TwitchApi for FakeTwitch {
        async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
            *self.last_code.lock().unwrap() = Some(code.into());
            if code == "bad" {
                return Err(SubwatchError::UpstreamApi {
                    status: 400,
                    body: "Invalid authorization code".into(),
                });
            }
            Ok(self.grant("acc-login"))
        }
        async fn refresh_token(&self, _refresh_token: &str) -> Result<TokenGrant> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            if self.refresh_ok.load(Ordering::SeqCst) {
                Ok(self.grant("acc-refreshed"))
            } else {
                Err(SubwatchError::UpstreamAuth("invalid refresh token".into()))
            }
        }
        async fn validate_token(&self, _access_token: &str) -> Result<TokenValidation> {
            Ok(TokenValidation {
                client_id: "cid".into(),
                login: "streamer".into(),
                user_id: "b1".into(),
                scopes: self.scope.clone(),
                expires_in: 3600,
            })
        }
        async fn subscriptions(
            &self,
            _access_token: &str,
            _broadcaster_id: &str,
            _after: Option<&str>,
        ) -> Result<SubscriptionPage> {
            self.pages.fetch_add(1, Ordering::SeqCst);
            Ok(SubscriptionPage {
                data: ["u1", "u2"]
                    .into_iter()
                    .map(|id| Subscription {
                        user_id: id.into(),
                        tier: "1000".into(),
                        ..Subscription::default()
                    })
                    .collect(),
                cursor: None,
                total: Some(2),
            })
        }
        async fn users(&self, _access_token: &str, ids: &[String]) -> Result<Vec<UserProfile>> {
            Ok(ids
                .iter()
                .map(|id| UserProfile {
                    id: id.clone(),
                    display_name: format!("Name {id}"),
                    profile_image_url: format!("https://img/{id}.png"),
                    ..UserProfile::default()
                })
                .collect())
        }
    }

    struct Harness {
        state: Arc<AppState>,
        api: Arc<FakeTwitch>,
        clock: Arc<ManualClock>,
    }

    fn harness_with(api: FakeTwitch, refresh_token: Option<&str>) -> Harness {
        let clock = Arc::new(ManualClock::new(NOW));
        let api = Arc::new(api);
        let store = Arc::new(EnvTokenStore::new(
            refresh_token.map(str::to_string),
            clock.clone(),
        ));
        let auth = Arc::new(AuthManager::new(store, api.clone()));
        let mut config = Config::default();
        config.twitch.client_id = "cid".into();
        config.twitch.client_secret = "secret".into();
        let state = AppState::new(Arc::new(config), auth, api.clone(), clock.clone());
        Harness { state, api, clock }
    }

    fn harness() -> Harness {
        harness_with(FakeTwitch::new(), Some("ref-env"))
    }

    async fn get(state: &Arc<AppState>, uri: &str) -> axum::response::Response {
        make_router(state.clone())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(resp: axum::response::Response) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_login_redirects_to_twitch() {
        let h = harness();
        let resp = get(&h.state, "/api/twitch/login").await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        let location = resp
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(location.starts_with("https://id.twitch.tv/oauth2/authorize?response_type=code"));
        assert!(location.contains("client_id=cid"));
        assert!(location.contains("scope=channel%3Aread%3Asubscriptions"));
    }

    #[tokio::test]
    async fn test_login_without_client_id_is_config_error() {
        let clock = Arc::new(ManualClock::new(NOW));
        let api = Arc::new(FakeTwitch::new());
        let store = Arc::new(EnvTokenStore::new(None, clock.clone()));
        let auth = Arc::new(AuthManager::new(store, api.clone()));
        let state = AppState::new(Arc::new(Config::default()), auth, api, clock);
        let resp = get(&state, "/api/twitch/login").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["error"]["code"], "configuration_error");
    }

    #[tokio::test]
    async fn test_subscribers_second_request_is_cached() {
        let h = harness();
        let first = body_json(get(&h.state, "/api/twitch/subscribers").await).await;
        assert_eq!(first["_cache_info"]["from_cache"], false);
        assert_eq!(first["user_id"], "b1");
        assert_eq!(first["total_count"], 2);
        assert_eq!(first["subscribers"][0]["display_name"], "Name u1");
        assert_eq!(first["subscribers"][1]["profile_image_url"], "https://img/u2.png");

        h.clock.advance(Duration::from_secs(120));
        let second = body_json(get(&h.state, "/api/twitch/subscribers").await).await;
        assert_eq!(second["_cache_info"]["from_cache"], true);
        assert_eq!(second["_cache_info"]["stale"], false);
        assert_eq!(second["_cache_info"]["remaining_time"], 180_000);
        assert_eq!(first["subscribers"], second["subscribers"]);
        assert_eq!(h.api.pages.load(Ordering::SeqCst), 1);
        assert_eq!(h.api.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_subscribers_force_bypasses_cache() {
        let h = harness();
        get(&h.state, "/api/twitch/subscribers").await;
        let forced = body_json(get(&h.state, "/api/twitch/subscribers?force=true").await).await;
        assert_eq!(forced["_cache_info"]["from_cache"], false);
        assert_eq!(h.api.pages.load(Ordering::SeqCst), 2);
        // The stored access token is reused, so only the first call refreshed.
        assert_eq!(h.api.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_subscribers_refetch_after_expiry() {
        let h = harness();
        get(&h.state, "/api/twitch/subscribers").await;
        h.clock.advance(Duration::from_secs(301));
        let again = body_json(get(&h.state, "/api/twitch/subscribers").await).await;
        assert_eq!(again["_cache_info"]["from_cache"], false);
        assert_eq!(h.api.pages.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_subscribers_stale_fallback_on_refresh_failure() {
        let h = harness();
        get(&h.state, "/api/twitch/subscribers").await;

        // Past both the cache ttl and the access token lifetime.
        h.clock.advance(Duration::from_secs(3600));
        h.api.refresh_ok.store(false, Ordering::SeqCst);

        let resp = get(&h.state, "/api/twitch/subscribers?force=true").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["_cache_info"]["from_cache"], true);
        assert_eq!(body["_cache_info"]["stale"], true);
        assert!(
            body["_cache_info"]["error"]
                .as_str()
                .unwrap()
                .contains("invalid refresh token")
        );
        assert_eq!(body["subscribers"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_subscribers_without_credentials_or_cache() {
        let h = harness_with(FakeTwitch::new(), None);
        let resp = get(&h.state, "/api/twitch/subscribers").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["error"]["code"], "missing_credential");
    }

    #[tokio::test]
    async fn test_callback_error_param() {
        let h = harness();
        let resp = get(&h.state, "/api/twitch/callback?error=access_denied").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert!(
            body["error"]["message"]
                .as_str()
                .unwrap()
                .contains("access_denied")
        );
    }

    #[tokio::test]
    async fn test_callback_missing_code() {
        let h = harness();
        let resp = get(&h.state, "/api/twitch/callback").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_callback_exchange_failure_is_502() {
        let h = harness();
        let resp = get(&h.state, "/api/twitch/callback?code=bad").await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let msg = body_json(resp).await["error"]["message"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("Invalid authorization code"));
    }

    #[tokio::test]
    async fn test_callback_missing_scope_is_403() {
        let api = FakeTwitch {
            scope: vec!["user:read:email".into()],
            ..FakeTwitch::new()
        };
        let h = harness_with(api, None);
        let resp = get(&h.state, "/api/twitch/callback?code=good").await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(h.state.auth.store().get_refresh_token().await.is_err());
    }

    #[tokio::test]
    async fn test_callback_stores_tokens_and_shows_refresh_token() {
        let h = harness_with(FakeTwitch::new(), None);
        let resp = get(&h.state, "/api/twitch/callback?code=good").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("ref-new"));
        assert!(html.contains("TWITCH_REFRESH_TOKEN"));
        assert_eq!(h.api.last_code.lock().unwrap().as_deref(), Some("good"));

        let store = h.state.auth.store();
        assert_eq!(store.get_refresh_token().await.unwrap(), "ref-new");
        assert_eq!(
            store.get_stored_access_token().await.as_deref(),
            Some("acc-login")
        );
    }

    #[tokio::test]
    async fn test_status_json_when_healthy() {
        let h = harness();
        let resp = get(&h.state, "/api/twitch/status?format=json").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["environment"], "Development");
        assert_eq!(body["has_refresh_token"], true);
        assert_eq!(body["refresh_token_source"], "environment");
        assert_eq!(body["can_get_subscribers"], true);
        assert!(body["token_error"].is_null());
        // The in-process check populated the cache.
        assert!(h.state.cache.cache_info().has_cached_data);
    }

    #[tokio::test]
    async fn test_status_reports_missing_token() {
        let h = harness_with(FakeTwitch::new(), None);
        let resp = make_router(h.state.clone())
            .oneshot(
                Request::builder()
                    .uri("/api/twitch/status")
                    .header("accept", "application/json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["has_refresh_token"], false);
        assert_eq!(body["refresh_token_source"], "none");
        assert_eq!(body["can_get_subscribers"], false);
        assert!(
            body["next_steps"][0]
                .as_str()
                .unwrap()
                .contains("/api/twitch/login")
        );
        assert_eq!(h.api.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_status_html_by_default() {
        let h = harness();
        let resp = get(&h.state, "/api/twitch/status").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("text/html"));
        assert!(body_text(resp).await.contains("Twitch integration status"));
    }

    #[tokio::test]
    async fn test_cache_status_empty() {
        let h = harness();
        let body = body_json(get(&h.state, "/api/twitch/cache-status").await).await;
        assert_eq!(body["cache_status"]["hasCachedData"], false);
        assert_eq!(body["cache_status"]["isExpired"], true);
        assert_eq!(body["cache_status"]["isStale"], true);
        assert!(body["cache_status"]["remainingTime"].is_null());
        assert_eq!(body["recommendations"]["should_refresh"], true);
        assert_eq!(body["recommendations"]["use_cache"], false);
        assert_eq!(
            body["recommendations"]["force_refresh_url"],
            "/api/twitch/subscribers?force=true"
        );
        assert_eq!(body["timing"]["cache_duration_minutes"].as_f64(), Some(5.0));
        assert_eq!(body["timing"]["stale_threshold_minutes"].as_f64(), Some(10.0));
        assert_eq!(body["timing"]["remaining_time_formatted"], "N/A");
    }

    #[tokio::test]
    async fn test_cache_status_after_fetch() {
        let h = harness();
        get(&h.state, "/api/twitch/subscribers").await;
        h.clock.advance(Duration::from_secs(90));
        let body = body_json(get(&h.state, "/api/twitch/cache-status").await).await;
        assert_eq!(body["cache_status"]["hasCachedData"], true);
        assert_eq!(body["cache_status"]["remainingTime"], 210_000);
        assert_eq!(body["recommendations"]["should_refresh"], false);
        assert_eq!(body["recommendations"]["use_cache"], true);
        assert_eq!(body["timing"]["remaining_time_formatted"], "3m 30s");
    }
}
