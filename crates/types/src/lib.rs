//! Core types and traits for the subwatch workspace.
//!
//! This crate defines the shared abstractions used across all layers of the
//! subwatch service: the error type, the persisted token record, Twitch data
//! shapes, the clock, and the async traits that each layer implements.

pub mod clock;
pub mod error;
pub mod token;
pub mod traits;
pub mod twitch;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::SubwatchError;
pub use token::{ACCESS_TOKEN_MARGIN_MS, TokenRecord};
pub use traits::{BlobStore, TokenStore, TwitchApi};
pub use twitch::{
    Subscriber, SubscriberBundle, Subscription, SubscriptionPage, TokenGrant, TokenValidation,
    UserProfile,
};
