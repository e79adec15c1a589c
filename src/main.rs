use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use subwatch_auth::{AuthManager, oauth::build_auth_url};
use subwatch_config::{Config, LogConfig, LogFormat};
use subwatch_server::AppState;
use subwatch_store::open_token_store;
use subwatch_twitch::{HelixClient, build_client, mock_bundle};
use subwatch_types::{Clock, SystemClock, TwitchApi};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "subwatch", about = "subwatch: Twitch subscriber proxy")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Path to the YAML configuration file.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Override the listening port (default: 4321).
        #[arg(short, long)]
        port: Option<u16>,
        /// Override the listening address (default: 127.0.0.1).
        #[arg(long)]
        host: Option<String>,
    },
    /// Open the Twitch authorization page.
    Login {
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Show which tokens the configured store can provide.
    Status {
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Print the subscriber list from a running instance.
    Subscribers {
        /// Base URL of the running server (default: from config host/port).
        #[arg(long)]
        url: Option<String>,
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Query the server even in development.
        #[arg(long)]
        live: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, port, host } => cmd_serve(config, port, host).await,
        Commands::Login { config } => cmd_login(config),
        Commands::Status { config } => cmd_status(config).await,
        Commands::Subscribers { url, config, live } => cmd_subscribers(url, config, live).await,
    }
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config =
        Config::load(path.as_deref()).map_err(|e| anyhow::anyhow!("config error: {e}"))?;
    init_tracing(&config.log);
    Ok(config)
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Wires the token store, Twitch client and auth manager from `config`.
async fn build_auth(
    config: &Config,
) -> Result<(Arc<AuthManager>, Arc<dyn TwitchApi>, Arc<dyn Clock>)> {
    let http = build_client(&config.http)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = open_token_store(config, clock.clone(), http.clone()).await?;
    let api: Arc<dyn TwitchApi> = Arc::new(HelixClient::new(http, config.twitch.clone()));
    let auth = Arc::new(AuthManager::new(store, api.clone()));
    Ok((auth, api, clock))
}

fn warn_on_config(config: &Config) {
    let missing = config.missing_twitch_settings();
    if !missing.is_empty() {
        tracing::warn!(missing = ?missing, "twitch credentials incomplete; OAuth routes will fail");
    }
    if !config.cache.staleness_observable() {
        tracing::warn!(
            ttl_secs = config.cache.ttl_secs,
            stale_after_secs = config.cache.stale_after_secs,
            "cache entries expire before they can turn stale; the stale flag will only appear on fallback responses"
        );
    }
}

async fn cmd_serve(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    host: Option<String>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(p) = port {
        config.port = p;
    }
    if let Some(h) = host {
        config.host = h;
    }
    warn_on_config(&config);

    let addr = format!("{}:{}", config.host, config.port);
    let (auth, api, clock) = build_auth(&config).await?;
    let state = AppState::new(Arc::new(config), auth, api, clock);
    let app = subwatch_server::make_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "subwatch listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn cmd_login(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    if config.twitch.client_id.is_empty() {
        anyhow::bail!("TWITCH_CLIENT_ID is not set");
    }
    let url = build_auth_url(&config.twitch);
    println!("{url}");
    eprintln!(
        "Authorize in the browser; the server at {} stores the tokens.",
        config.twitch.redirect_uri
    );
    if let Err(e) = open::that(&url) {
        tracing::warn!(error = %e, "could not open a browser");
    }
    Ok(())
}

async fn cmd_status(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let (auth, _, _) = build_auth(&config).await?;
    let status = auth.token_status().await;
    println!("environment:   {}", config.environment.label());
    println!("backend:       {}", status.backend);
    match &status.refresh_error {
        None => println!("refresh token: available"),
        Some(err) => println!("refresh token: missing ({err})"),
    }
    println!(
        "access token:  {}",
        if status.has_access_token {
            "valid"
        } else {
            "none stored"
        }
    );
    Ok(())
}

async fn cmd_subscribers(
    url: Option<String>,
    config_path: Option<PathBuf>,
    live: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    if !config.environment.is_production() && !live {
        println!("{}", serde_json::to_string_pretty(&mock_bundle())?);
        return Ok(());
    }

    let base = url.unwrap_or_else(|| format!("http://{}:{}", config.host, config.port));
    let endpoint = format!("{}/api/twitch/subscribers", base.trim_end_matches('/'));
    let http = build_client(&config.http)?;
    let resp = http.get(&endpoint).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("error loading subscribers: {status} {body}");
    }
    let body: serde_json::Value = resp.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
