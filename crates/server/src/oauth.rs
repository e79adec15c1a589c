//! OAuth handshake routes: login redirect and callback.

use crate::{ApiError, AppState, html};
use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use subwatch_auth::oauth::build_auth_url;
use subwatch_types::SubwatchError;

/// `GET /api/twitch/login` redirects to the Twitch consent screen.
pub async fn login(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    if state.config.twitch.client_id.is_empty() {
        return Err(SubwatchError::Config("TWITCH_CLIENT_ID is not set".into()).into());
    }
    let url = build_auth_url(&state.config.twitch);
    tracing::info!("redirecting to twitch authorization");
    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// `GET /api/twitch/callback`: exchanges the code and stores the tokens.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
) -> Result<Html<String>, ApiError> {
    if let Some(error) = query.error {
        let detail = match query.error_description {
            Some(desc) => format!("{error}: {desc}"),
            None => error,
        };
        return Err(SubwatchError::InvalidCallback(format!("twitch returned {detail}")).into());
    }
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| SubwatchError::InvalidCallback("missing code".into()))?;

    let grant = state.auth.complete_login(&code).await?;
    let backend = state.auth.store().backend();

    let token_block = match grant.refresh_token.as_deref() {
        Some(token) if backend == "environment" => format!(
            r#"<div><strong>Refresh token:</strong><div class="token">{}</div>
<small>Save it in your <code>.env</code> as <code>TWITCH_REFRESH_TOKEN</code>; it is only kept in memory.</small></div>"#,
            html::escape(token)
        ),
        _ => format!(
            "<p>The refresh token was stored by the <code>{}</code> backend.</p>",
            html::escape(backend)
        ),
    };

    let body = format!(
        r#"<h1 class="success">Authentication successful</h1>
<p>Tokens obtained. The subscribers endpoint is ready to use.</p>
{token_block}
<p><strong>Granted scopes:</strong> {scopes}</p>
<p><a href="/api/twitch/subscribers">Try the subscribers endpoint</a></p>"#,
        scopes = html::escape(&grant.scope.join(", ")),
    );
    Ok(Html(html::page("Twitch authentication", &body)))
}

