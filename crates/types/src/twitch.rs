//! Twitch OAuth and Helix data shapes.

use serde::{Deserialize, Serialize};

/// Tokens returned from `/oauth2/token` after a code exchange or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Lifetime of `access_token` in seconds.
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// Response of `/oauth2/validate`: who the token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenValidation {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub login: String,
    pub user_id: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub expires_in: u64,
}

/// One row of `/helix/subscriptions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: String,
    #[serde(default)]
    pub user_login: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub broadcaster_id: String,
    #[serde(default)]
    pub broadcaster_login: String,
    #[serde(default)]
    pub broadcaster_name: String,
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub plan_name: String,
    #[serde(default)]
    pub is_gift: bool,
    #[serde(default)]
    pub gifter_id: String,
    #[serde(default)]
    pub gifter_login: String,
    #[serde(default)]
    pub gifter_name: String,
}

/// A single page of subscriptions plus the cursor for the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionPage {
    pub data: Vec<Subscription>,
    /// `None` (or empty) when there are no more pages.
    pub cursor: Option<String>,
    /// Total subscriber count reported by Helix, if present.
    pub total: Option<u64>,
}

/// One row of `/helix/users`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub broadcaster_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub profile_image_url: String,
    #[serde(default)]
    pub offline_image_url: String,
    #[serde(default)]
    pub created_at: String,
}

/// A subscription enriched with the subscriber's public profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    #[serde(flatten)]
    pub subscription: Subscription,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offline_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcaster_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Subscriber {
    /// Combines a subscription with its profile, if one was found.
    #[must_use]
    pub fn merge(subscription: Subscription, profile: Option<&UserProfile>) -> Self {
        let Some(p) = profile else {
            return Self {
                subscription,
                ..Self::default()
            };
        };
        Self {
            subscription,
            display_name: Some(p.display_name.clone()),
            profile_image_url: Some(p.profile_image_url.clone()),
            offline_image_url: Some(p.offline_image_url.clone()),
            description: Some(p.description.clone()),
            broadcaster_type: Some(p.broadcaster_type.clone()),
            created_at: Some(p.created_at.clone()),
        }
    }
}

/// Everything the subscribers endpoint caches and serves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberBundle {
    pub user_id: String,
    pub subscribers: Vec<Subscriber>,
    pub total_count: u64,
}
