//! REST API server exposing query batches and health checks

mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

use crate::client::ClientConfig;
use crate::datasource::Datasource;
use crate::settings::{PluginSettings, CLIENT_SECRET_KEY};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host address (default: "127.0.0.1")
    pub host: String,
    /// Server port (default: 3000)
    pub port: u16,
    /// Path to the data source settings JSON (default: "settings.json")
    pub settings_path: PathBuf,
    /// OAuth client secret, kept out of the settings file
    pub client_secret: Option<String>,
    /// Upstream request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            settings_path: PathBuf::from("settings.json"),
            client_secret: None,
            timeout_seconds: ClientConfig::default().timeout_seconds,
        }
    }
}

impl ServerConfig {
    /// Creates a new server configuration
    pub fn new(host: impl Into<String>, port: u16, settings_path: impl Into<PathBuf>) -> Self {
        ServerConfig {
            host: host.into(),
            port,
            settings_path: settings_path.into(),
            ..Default::default()
        }
    }

    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Decrypted secure settings built from the configured secret.
    pub fn secure_settings(&self) -> HashMap<String, String> {
        let mut secure = HashMap::new();
        if let Some(secret) = &self.client_secret {
            secure.insert(CLIENT_SECRET_KEY.to_string(), secret.clone());
        }
        secure
    }
}

/// Runs the API server
///
/// # Arguments
/// * `config` - Server configuration
///
/// # Returns
/// Returns an error if the settings cannot be loaded, the server fails to
/// start, or it encounters a fatal error
///
/// # Example
/// ```rust,no_run
/// use graphql_frames::server::{run_server, ServerConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ServerConfig::default();
///     run_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();

    let settings = PluginSettings::from_file(&config.settings_path, &config.secure_settings())?;
    if let Err(err) = settings.validate() {
        tracing::warn!("Settings incomplete, queries will fail: {}", err);
    }

    let client_config = ClientConfig {
        timeout_seconds: config.timeout_seconds,
    };
    let datasource = Datasource::with_http(settings, client_config)?;
    let state = Arc::new(AppState::new(datasource));

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
