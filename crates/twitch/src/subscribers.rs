//! The subscriber pipeline: validate → paginate → enrich.

use crate::client::{PAGE_SIZE, USERS_PER_REQUEST};
use futures_util::future::try_join_all;
use std::collections::HashMap;
use subwatch_types::{
    Subscriber, SubscriberBundle, Subscription, TwitchApi, UserProfile, traits::Result,
};

/// Walks `/helix/subscriptions` until there is no cursor or a page comes
/// back short.
///
/// # Errors
///
/// Propagates the first failing page request.
pub async fn fetch_all_subscriptions(
    api: &dyn TwitchApi,
    access_token: &str,
    broadcaster_id: &str,
) -> Result<Vec<Subscription>> {
    let mut all = Vec::new();
    let mut after: Option<String> = None;
    let mut pages = 0_usize;
    loop {
        let page = api
            .subscriptions(access_token, broadcaster_id, after.as_deref())
            .await?;
        pages += 1;
        let short = page.data.len() < PAGE_SIZE;
        all.extend(page.data);
        match page.cursor {
            Some(cursor) if !short => after = Some(cursor),
            _ => break,
        }
    }
    tracing::debug!(pages, count = all.len(), "fetched subscriptions");
    Ok(all)
}

/// Looks up profiles for every subscriber in chunks of at most
/// [`USERS_PER_REQUEST`] ids, fetched concurrently, and merges them in by id.
///
/// # Errors
///
/// Fails if any chunk fails.
pub async fn enrich(
    api: &dyn TwitchApi,
    access_token: &str,
    subscriptions: Vec<Subscription>,
) -> Result<Vec<Subscriber>> {
    let ids: Vec<String> = subscriptions.iter().map(|s| s.user_id.clone()).collect();
    let chunks = try_join_all(
        ids.chunks(USERS_PER_REQUEST)
            .map(|chunk| api.users(access_token, chunk)),
    )
    .await?;

    let profiles: HashMap<String, UserProfile> = chunks
        .into_iter()
        .flatten()
        .map(|p| (p.id.clone(), p))
        .collect();

    Ok(subscriptions
        .into_iter()
        .map(|s| {
            let profile = profiles.get(&s.user_id);
            Subscriber::merge(s, profile)
        })
        .collect())
}

/// Runs the whole pipeline for an already-obtained access token.
///
/// # Errors
///
/// Returns [`SubwatchError::UpstreamAuth`](subwatch_types::SubwatchError::UpstreamAuth)
/// if the token fails validation, or the first Helix error.
pub async fn fetch_subscriber_bundle(
    api: &dyn TwitchApi,
    access_token: &str,
) -> Result<SubscriberBundle> {
    let validation = api.validate_token(access_token).await?;
    let subscriptions = fetch_all_subscriptions(api, access_token, &validation.user_id).await?;
    let subscribers = enrich(api, access_token, subscriptions).await?;
    tracing::info!(
        broadcaster = %validation.login,
        count = subscribers.len(),
        "fetched subscribers"
    );
    Ok(SubscriberBundle {
        user_id: validation.user_id,
        total_count: subscribers.len() as u64,
        subscribers,
    })
}
