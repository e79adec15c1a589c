//! Diagnostic routes: integration status and cache status.

use crate::{AppState, cache::CacheInfo, html, subscribers::refresh_subscribers};
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Path that bypasses the subscriber cache.
pub const FORCE_REFRESH_URL: &str = "/api/twitch/subscribers?force=true";

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub format: Option<String>,
}

/// Everything `/api/twitch/status` reports.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub environment: &'static str,
    pub is_production: bool,
    pub has_refresh_token: bool,
    /// Backend the refresh token came from, or `"none"`.
    pub refresh_token_source: &'static str,
    pub has_valid_access_token: bool,
    pub can_get_subscribers: bool,
    pub token_error: Option<String>,
    pub next_steps: Vec<String>,
}

/// Checks the token store, then runs the subscriber pipeline in-process if
/// a refresh token is available.
pub async fn build_report(state: &AppState) -> StatusReport {
    let tokens = state.auth.token_status().await;

    let (can_get_subscribers, token_error) = if tokens.has_refresh_token {
        match refresh_subscribers(state).await {
            Ok(_) => (true, None),
            Err(e) => (false, Some(e.to_string())),
        }
    } else {
        (false, tokens.refresh_error.clone())
    };

    let mut next_steps = Vec::new();
    if !tokens.has_refresh_token {
        next_steps.push("Visit /api/twitch/login to authenticate".to_string());
        if tokens.backend == "environment" {
            next_steps.push("Copy the refresh token into .env as TWITCH_REFRESH_TOKEN".to_string());
        }
    } else if !can_get_subscribers {
        next_steps.push("Check that the stored refresh token is still valid".to_string());
        next_steps.push("If it is not, re-authenticate at /api/twitch/login".to_string());
    } else {
        next_steps.push("All set: /api/twitch/subscribers is ready".to_string());
    }

    StatusReport {
        environment: state.config.environment.label(),
        is_production: state.config.environment.is_production(),
        has_refresh_token: tokens.has_refresh_token,
        refresh_token_source: if tokens.has_refresh_token {
            tokens.backend
        } else {
            "none"
        },
        has_valid_access_token: tokens.has_access_token,
        can_get_subscribers,
        token_error,
        next_steps,
    }
}

fn wants_json(query: &StatusQuery, headers: &HeaderMap) -> bool {
    if query.format.as_deref() == Some("json") {
        return true;
    }
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}

fn row(ok: bool, fail_class: &str, label: &str, yes: &str, no: &str) -> String {
    let (class, text) = if ok { ("success", yes) } else { (fail_class, no) };
    format!(r#"<div class="status {class}"><strong>{label}:</strong> {text}</div>"#)
}

fn render_html(report: &StatusReport) -> String {
    let mut body = String::from("<h1>Twitch integration status</h1>\n");
    body.push_str(&format!(
        "<p>Environment: <strong>{}</strong></p>\n",
        report.environment
    ));
    body.push_str(&row(
        report.has_refresh_token,
        "error",
        "Refresh token",
        &format!("available ({})", html::escape(report.refresh_token_source)),
        "not found",
    ));
    body.push_str(&row(
        report.has_valid_access_token,
        "warning",
        "Access token",
        "valid",
        "no valid token stored",
    ));
    body.push_str(&row(
        report.can_get_subscribers,
        "error",
        "API",
        "subscribers can be fetched",
        "fetching subscribers failed",
    ));
    if let Some(err) = &report.token_error {
        body.push_str(&format!(
            "<div class=\"status error\"><strong>Error details:</strong><pre>{}</pre></div>\n",
            html::escape(err)
        ));
    }
    body.push_str("<h2>Next steps</h2>\n<ul>\n");
    for step in &report.next_steps {
        body.push_str(&format!("<li>{}</li>\n", html::escape(step)));
    }
    body.push_str("</ul>\n");
    body.push_str(
        r#"<h2>Links</h2>
<a href="/api/twitch/login" class="btn">Authenticate with Twitch</a>
<a href="/api/twitch/subscribers" class="btn">View subscribers</a>
<a href="/api/twitch/cache-status" class="btn">Cache status</a>
"#,
    );
    let debug = serde_json::to_string_pretty(report).unwrap_or_default();
    body.push_str(&format!(
        "<h2>Debug info</h2>\n<pre>{}</pre>\n",
        html::escape(&debug)
    ));
    html::page("Twitch integration status", &body)
}

/// `GET /api/twitch/status`
pub async fn status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
    headers: HeaderMap,
) -> Response {
    let report = build_report(&state).await;
    if wants_json(&query, &headers) {
        Json(report).into_response()
    } else {
        Html(render_html(&report)).into_response()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendations {
    pub should_refresh: bool,
    pub use_cache: bool,
    pub force_refresh_url: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Timing {
    pub cache_duration_minutes: f64,
    pub stale_threshold_minutes: f64,
    pub remaining_time_formatted: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub cache_status: CacheInfo,
    pub recommendations: Recommendations,
    pub timing: Timing,
}

/// `"{m}m {s}s"`, or `"N/A"` when nothing remains.
#[must_use]
pub fn format_remaining(remaining_ms: Option<u64>) -> String {
    match remaining_ms {
        Some(ms) if ms > 0 => format!("{}m {}s", ms / 60_000, (ms % 60_000) / 1000),
        _ => "N/A".to_string(),
    }
}

/// `GET /api/twitch/cache-status`
pub async fn cache_status(State(state): State<Arc<AppState>>) -> Json<CacheStatus> {
    let info = state.cache.cache_info();
    Json(CacheStatus {
        cache_status: info,
        recommendations: Recommendations {
            should_refresh: info.is_stale || !info.has_cached_data,
            use_cache: info.has_cached_data && !info.is_expired,
            force_refresh_url: FORCE_REFRESH_URL,
        },
        timing: Timing {
            cache_duration_minutes: state.cache.ttl().as_secs_f64() / 60.0,
            stale_threshold_minutes: state.cache.stale_after().as_secs_f64() / 60.0,
            remaining_time_formatted: format_remaining(info.remaining_time),
        },
    })
}
