//! Twitch API access for subwatch.
//!
//! [`HelixClient`] implements [`TwitchApi`](subwatch_types::TwitchApi) over
//! HTTP. The [`subscribers`] module turns an access token into an enriched
//! [`SubscriberBundle`](subwatch_types::SubscriberBundle).

pub mod client;
pub mod http_util;
pub mod mock;
pub mod subscribers;

pub use client::HelixClient;
pub use http_util::build_client;
pub use mock::mock_bundle;
pub use subscribers::{enrich, fetch_all_subscriptions, fetch_subscriber_bundle};
