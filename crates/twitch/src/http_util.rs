//! Shared HTTP utilities for the Twitch client.
//!
//! One place for the send → status-check logic used by every endpoint.

use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use subwatch_config::HttpConfig;
use subwatch_types::{SubwatchError, traits::Result};

/// Builds the outbound client with the configured timeout.
///
/// # Errors
///
/// Returns [`SubwatchError::Http`] if the TLS backend fails to initialise.
pub fn build_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(SubwatchError::from)
}

/// Thin wrapper that turns non-2xx responses into errors.
#[derive(Clone)]
pub struct TwitchHttp {
    http: Client,
}

impl TwitchHttp {
    #[must_use]
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// Returns a reference to the inner HTTP client for building requests.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.http
    }

    /// Sends a request and checks for success status.
    ///
    /// On non-2xx responses, reads the body text and returns
    /// [`SubwatchError::UpstreamApi`].
    ///
    /// # Errors
    ///
    /// Returns `SubwatchError::UpstreamApi` on non-success HTTP status codes,
    /// or [`SubwatchError::Http`] if the request fails to send.
    pub async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let resp = builder.send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(SubwatchError::UpstreamApi {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Reclassifies an upstream rejection as an auth failure, prefixed with
/// what was being attempted.
pub(crate) fn as_auth_error(context: &str) -> impl FnOnce(SubwatchError) -> SubwatchError + '_ {
    move |err| match err {
        SubwatchError::UpstreamApi { status, body } => {
            SubwatchError::UpstreamAuth(format!("{context}: {status} {body}"))
        }
        other => other,
    }
}
