//! Twitch OAuth + Helix client.
//!
//! Auth: form-encoded client credentials on `/oauth2/token`; `Client-Id`
//! plus `Authorization: Bearer` on every Helix call.
use crate::http_util::{TwitchHttp, as_auth_error};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use subwatch_auth::oauth::{TOKEN_PATH, VALIDATE_PATH, code_form_params, refresh_form_params};
use subwatch_config::TwitchConfig;
use subwatch_types::{
    Subscription, SubscriptionPage, TokenGrant, TokenValidation, TwitchApi, UserProfile,
    traits::Result,
};

/// Page size requested from `/helix/subscriptions`.
pub const PAGE_SIZE: usize = 100;

/// Maximum number of `id` parameters accepted by `/helix/users`.
pub const USERS_PER_REQUEST: usize = 100;

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(default)]
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionsResponse {
    #[serde(default)]
    data: Vec<Subscription>,
    #[serde(default)]
    pagination: Option<Pagination>,
    #[serde(default)]
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    #[serde(default)]
    data: Vec<UserProfile>,
}

/// [`TwitchApi`] over HTTP.
pub struct HelixClient {
    http: TwitchHttp,
    config: TwitchConfig,
}

impl HelixClient {
    pub fn new(http: Client, config: TwitchConfig) -> Self {
        Self {
            http: TwitchHttp::new(http),
            config,
        }
    }

    fn id_url(&self, path: &str) -> String {
        format!("{}{path}", self.config.id_base_url.trim_end_matches('/'))
    }

    fn helix_url(&self, path: &str) -> String {
        format!(
            "{}/helix{path}",
            self.config.api_base_url.trim_end_matches('/')
        )
    }

    fn helix_get(&self, path: &str, access_token: &str) -> reqwest::RequestBuilder {
        self.http
            .client()
            .get(self.helix_url(path))
            .header("client-id", self.config.client_id.as_str())
            .bearer_auth(access_token)
    }

    async fn token_request(&self, form: &[(&'static str, String)]) -> Result<TokenGrant> {
        let builder = self.http.client().post(self.id_url(TOKEN_PATH)).form(form);
        let resp = self.http.send(builder).await?;
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl TwitchApi for HelixClient {
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        self.token_request(&code_form_params(&self.config, code))
            .await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant> {
        self.token_request(&refresh_form_params(&self.config, refresh_token))
            .await
            .map_err(as_auth_error("token refresh failed"))
    }

    async fn validate_token(&self, access_token: &str) -> Result<TokenValidation> {
        let builder = self
            .http
            .client()
            .get(self.id_url(VALIDATE_PATH))
            .bearer_auth(access_token);
        let resp = self
            .http
            .send(builder)
            .await
            .map_err(as_auth_error("access token rejected"))?;
        Ok(resp.json().await?)
    }

    async fn subscriptions(
        &self,
        access_token: &str,
        broadcaster_id: &str,
        after: Option<&str>,
    ) -> Result<SubscriptionPage> {
        let first = PAGE_SIZE.to_string();
        let mut query = vec![("broadcaster_id", broadcaster_id), ("first", first.as_str())];
        if let Some(cursor) = after {
            query.push(("after", cursor));
        }
        let builder = self.helix_get("/subscriptions", access_token).query(&query);
        let body: SubscriptionsResponse = self.http.send(builder).await?.json().await?;
        Ok(SubscriptionPage {
            data: body.data,
            cursor: body
                .pagination
                .and_then(|p| p.cursor)
                .filter(|c| !c.is_empty()),
            total: body.total,
        })
    }

    async fn users(&self, access_token: &str, ids: &[String]) -> Result<Vec<UserProfile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query: Vec<(&str, &str)> = ids.iter().map(|id| ("id", id.as_str())).collect();
        let builder = self.helix_get("/users", access_token).query(&query);
        let body: UsersResponse = self.http.send(builder).await?.json().await?;
        Ok(body.data)
    }
}
