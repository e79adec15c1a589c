//! Configuration loading for the subwatch service.
//!
//! Uses figment to layer defaults, an optional YAML file, and environment
//! variables (`TWITCH_*` verbatim, everything else under `SUBWATCH_*`).

pub mod schema;

pub use schema::{
    BlobConfig, BlobKind, CacheConfig, Config, Environment, HttpConfig, LogConfig, LogFormat,
    TokenBackend, TokenStoreConfig, TwitchConfig,
};
