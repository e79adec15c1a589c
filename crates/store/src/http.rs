//! Blob store backed by a remote key-value HTTP service.
//!
//! Documents live at `{base_url}/{namespace}/{key}`: `GET` reads (404 means
//! absent), `PUT` with a JSON body writes.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use subwatch_types::{BlobStore, SubwatchError, traits::Result};

/// A [`BlobStore`] that talks to a managed key-value service over HTTP.
pub struct HttpBlobStore {
    http: reqwest::Client,
    base_url: String,
    namespace: String,
    api_token: Option<String>,
}

impl HttpBlobStore {
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        namespace: impl Into<String>,
        api_token: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            namespace: namespace.into(),
            api_token,
        }
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}/{key}", self.base_url, self.namespace)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

async fn storage_error(resp: reqwest::Response) -> SubwatchError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    SubwatchError::Storage(format!("blob service returned {status}: {body}"))
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let resp = self
            .authorize(self.http.get(self.url(key)))
            .send()
            .await
            .map_err(|e| SubwatchError::Storage(e.to_string()))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(storage_error(resp).await);
        }
        let value: Value = resp
            .json()
            .await
            .map_err(|e| SubwatchError::Storage(e.to_string()))?;
        Ok((!value.is_null()).then_some(value))
    }

    async fn set(&self, key: &str, value: &Value) -> Result<()> {
        let resp = self
            .authorize(self.http.put(self.url(key)))
            .json(value)
            .send()
            .await
            .map_err(|e| SubwatchError::Storage(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(storage_error(resp).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Path, State},
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::get,
    };
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Docs = Arc<Mutex<HashMap<String, Value>>>;

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "Bearer secret")
    }

    async fn read(
        State(docs): State<Docs>,
        Path((ns, key)): Path<(String, String)>,
        headers: HeaderMap,
    ) -> std::result::Result<Json<Value>, AxumStatus> {
        if !authorized(&headers) {
            return Err(AxumStatus::UNAUTHORIZED);
        }
        docs.lock()
            .unwrap()
            .get(&format!("{ns}/{key}"))
            .cloned()
            .map(Json)
            .ok_or(AxumStatus::NOT_FOUND)
    }

    async fn write(
        State(docs): State<Docs>,
        Path((ns, key)): Path<(String, String)>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> AxumStatus {
        if !authorized(&headers) {
            return AxumStatus::UNAUTHORIZED;
        }
        docs.lock().unwrap().insert(format!("{ns}/{key}"), body);
        AxumStatus::NO_CONTENT
    }

    async fn spawn_server() -> String {
        let docs: Docs = Arc::default();
        let app = Router::new()
            .route("/{ns}/{key}", get(read).put(write))
            .with_state(docs);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn test_round_trip_through_service() {
        let base = spawn_server().await;
        let s = HttpBlobStore::new(reqwest::Client::new(), base, "twitch", Some("secret".into()));
        assert!(s.get("tokens").await.unwrap().is_none());
        s.set("tokens", &json!({"refreshToken": "r"})).await.unwrap();
        assert_eq!(
            s.get("tokens").await.unwrap(),
            Some(json!({"refreshToken": "r"}))
        );
    }

    #[tokio::test]
    async fn test_unauthorized_is_storage_error() {
        let base = spawn_server().await;
        let s = HttpBlobStore::new(reqwest::Client::new(), base, "twitch", None);
        let err = s.get("tokens").await.unwrap_err();
        assert!(matches!(err, SubwatchError::Storage(ref m) if m.contains("401")));
        assert!(s.set("tokens", &json!({})).await.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_is_storage_error() {
        let s = HttpBlobStore::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            "twitch",
            None,
        );
        assert!(matches!(
            s.get("tokens").await,
            Err(SubwatchError::Storage(_))
        ));
    }
}
