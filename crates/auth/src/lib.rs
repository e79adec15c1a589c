//! Twitch OAuth for the subwatch service.
//!
//! [`oauth`] builds the authorize URL and the token-endpoint form bodies.
//! [`AuthManager`] owns the access-token lifecycle on top of a
//! [`TokenStore`](subwatch_types::TokenStore).

pub mod manager;
pub mod oauth;

pub use manager::{AuthManager, TokenStatus};
