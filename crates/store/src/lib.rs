//! Token storage for the Twitch refresh and access tokens.
//!
//! Three [`TokenStore`](subwatch_types::TokenStore) adapters share one
//! in-memory slot and differ only in what sits behind it:
//!
//! - [`EnvTokenStore`]: nothing; the refresh token comes from `TWITCH_REFRESH_TOKEN`.
//! - [`FileTokenStore`]: a local JSON file holding the refresh token.
//! - [`BlobTokenStore`]: the full record in a [`BlobStore`](subwatch_types::BlobStore).
//!
//! Blob backends: [`InMemoryBlobStore`] for tests, [`SqliteBlobStore`] for
//! self-hosting, and [`HttpBlobStore`] for a managed key-value service.

pub mod blob;
pub mod env;
pub mod factory;
pub mod file;
pub mod http;
pub mod memory;
pub mod slot;
pub mod sqlite;

pub use blob::BlobTokenStore;
pub use env::EnvTokenStore;
pub use factory::{open_blob_store, open_token_store};
pub use file::FileTokenStore;
pub use http::HttpBlobStore;
pub use memory::InMemoryBlobStore;
pub use slot::TokenSlot;
pub use sqlite::SqliteBlobStore;
