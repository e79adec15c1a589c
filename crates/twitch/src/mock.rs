//! Canned subscribers for local development, so pages can be built without
//! Twitch credentials.

use subwatch_types::{Subscriber, SubscriberBundle, Subscription};

/// Twitch's default avatar.
pub const DEFAULT_PROFILE_IMAGE: &str = "https://static-cdn.jtvnw.net/user-default-pictures-uv/ebe4cd89-b4f4-4cd9-adac-2f30151b4209-profile_image-300x300.png";

/// Three placeholder subscribers.
#[must_use]
pub fn mock_bundle() -> SubscriberBundle {
    let subscribers: Vec<Subscriber> = (1..=3)
        .map(|n| Subscriber {
            subscription: Subscription {
                user_id: n.to_string(),
                user_login: format!("mock_subscriber_{n}"),
                user_name: format!("mock_subscriber_{n}"),
                tier: "1000".to_string(),
                ..Subscription::default()
            },
            display_name: Some(format!("Mock Subscriber {n}")),
            profile_image_url: Some(DEFAULT_PROFILE_IMAGE.to_string()),
            ..Subscriber::default()
        })
        .collect();
    SubscriberBundle {
        user_id: "mock".to_string(),
        total_count: subscribers.len() as u64,
        subscribers,
    }
}
