use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Environment variables read verbatim (no `SUBWATCH_` prefix) and mapped
/// onto the `twitch` section.
const TWITCH_ENV_VARS: &[&str] = &[
    "TWITCH_CLIENT_ID",
    "TWITCH_CLIENT_SECRET",
    "TWITCH_REDIRECT_URI",
    "TWITCH_REFRESH_TOKEN",
];

/// Deployment flavour; picks the default token backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(self) -> bool {
        self == Self::Production
    }

    /// Human-readable name for status pages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Development => "Development",
            Self::Production => "Production",
        }
    }
}

fn default_redirect_uri() -> String {
    "http://localhost:4321/api/twitch/callback".to_string()
}
fn default_id_base_url() -> String {
    "https://id.twitch.tv".to_string()
}
fn default_api_base_url() -> String {
    "https://api.twitch.tv".to_string()
}

/// Twitch application credentials and endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitchConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Static fallback refresh token (`TWITCH_REFRESH_TOKEN`).
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Base URL of the OAuth host (overridable for tests).
    #[serde(default = "default_id_base_url")]
    pub id_base_url: String,
    /// Base URL of the Helix API host (overridable for tests).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            refresh_token: None,
            id_base_url: default_id_base_url(),
            api_base_url: default_api_base_url(),
        }
    }
}

/// Which adapter backs the token store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenBackend {
    Environment,
    File,
    Blob,
}

/// Which service holds blobs for the `blob` token backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobKind {
    #[default]
    Sqlite,
    Http,
    Memory,
}

fn default_namespace() -> String {
    "twitch".to_string()
}
fn default_blob_key() -> String {
    "tokens".to_string()
}
fn default_database_url() -> String {
    "sqlite://subwatch.db".to_string()
}

/// Blob store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobConfig {
    #[serde(default)]
    pub kind: BlobKind,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_blob_key")]
    pub key: String,
    /// Used when `kind` is `sqlite`.
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Used when `kind` is `http`.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bearer token for the `http` blob service.
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            kind: BlobKind::default(),
            namespace: default_namespace(),
            key: default_blob_key(),
            database_url: default_database_url(),
            base_url: None,
            api_token: None,
        }
    }
}

fn default_token_file() -> PathBuf {
    PathBuf::from(".twitch-token.json")
}

/// Token store selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenStoreConfig {
    /// Explicit backend; `None` picks one from [`Environment`].
    #[serde(default)]
    pub backend: Option<TokenBackend>,
    /// Location of the JSON file for the `file` backend.
    #[serde(default = "default_token_file")]
    pub file_path: PathBuf,
    #[serde(default)]
    pub blob: BlobConfig,
}

impl Default for TokenStoreConfig {
    fn default() -> Self {
        Self {
            backend: None,
            file_path: default_token_file(),
            blob: BlobConfig::default(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    5 * 60
}
fn default_stale_after_secs() -> u64 {
    10 * 60
}

/// Subscriber cache durations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long an entry is served before it is evicted.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Age after which an entry is reported as stale.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            stale_after_secs: default_stale_after_secs(),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    #[must_use]
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    /// Entries are evicted at `ttl`, so the stale flag can only ever be seen
    /// on a live entry when `stale_after < ttl`.
    #[must_use]
    pub fn staleness_observable(&self) -> bool {
        self.stale_after_secs < self.ttl_secs
    }
}

fn default_timeout_secs() -> u64 {
    15
}

/// Outbound HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Logging configuration. `RUST_LOG` takes precedence over `level`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_port() -> u16 {
    4321
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listen port (defaults to 4321).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Listen address (defaults to `127.0.0.1`).
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub twitch: TwitchConfig,
    #[serde(default)]
    pub token_store: TokenStoreConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            environment: Environment::default(),
            twitch: TwitchConfig::default(),
            token_store: TokenStoreConfig::default(),
            cache: CacheConfig::default(),
            http: HttpConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Parses configuration from a YAML string, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the YAML is invalid or extraction fails.
    #[allow(clippy::result_large_err)]
    pub fn from_yaml(yaml: &str) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml))
            .extract()
    }

    /// Loads configuration from a file path, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn from_file(path: &std::path::Path) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .extract()
    }

    /// Loads defaults, then the optional YAML file, then `TWITCH_*`
    /// variables, then `SUBWATCH_*` variables (`__` separates nested keys).
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if any layer fails to parse or extract.
    #[allow(clippy::result_large_err)]
    pub fn load(path: Option<&std::path::Path>) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Env, Format as _, Serialized, Yaml},
        };
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::raw().only(TWITCH_ENV_VARS).map(|key| {
                key.as_str()
                    .to_ascii_lowercase()
                    .replacen("twitch_", "twitch.", 1)
                    .into()
            }))
            .merge(Env::prefixed("SUBWATCH_").split("__"))
            .extract()
    }

    /// The configured token backend, or the deployment default: `blob` in
    /// production, `environment` in development.
    #[must_use]
    pub fn token_backend(&self) -> TokenBackend {
        self.token_store
            .backend
            .unwrap_or(if self.environment.is_production() {
                TokenBackend::Blob
            } else {
                TokenBackend::Environment
            })
    }

    /// Names of required Twitch settings that are empty.
    #[must_use]
    pub fn missing_twitch_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.twitch.client_id.is_empty() {
            missing.push("TWITCH_CLIENT_ID");
        }
        if self.twitch.client_secret.is_empty() {
            missing.push("TWITCH_CLIENT_SECRET");
        }
        if self.twitch.redirect_uri.is_empty() {
            missing.push("TWITCH_REDIRECT_URI");
        }
        missing
    }
}
