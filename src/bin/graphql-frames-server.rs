//! GraphQL Frames API Server Binary
//!
//! Run with: `cargo run --bin graphql-frames-server`

use graphql_frames::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Note: Tracing is initialized in run_server()
    // Set RUST_LOG environment variable to control log level:
    //   RUST_LOG=debug cargo run --bin graphql-frames-server
    //   RUST_LOG=graphql_frames::inference=trace cargo run --bin graphql-frames-server

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .unwrap_or(3000);
    let settings_path =
        std::env::var("SETTINGS_PATH").unwrap_or_else(|_| "settings.json".to_string());

    let mut config = ServerConfig::new(host, port, settings_path);
    if let Ok(secret) = std::env::var("OAUTH_CLIENT_SECRET") {
        config = config.with_client_secret(secret);
    }
    if let Some(timeout) = std::env::var("UPSTREAM_TIMEOUT_SECONDS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
    {
        config.timeout_seconds = timeout;
    }

    println!("Starting GraphQL Frames API Server...");
    println!("   Host: {}", config.host);
    println!("   Port: {}", config.port);
    println!("   Settings: {}", config.settings_path.display());
    println!();
    println!("Available endpoints:");
    println!("  GET  /health   - Data source health check");
    println!("  POST /query    - Execute a batch of queries");
    println!();

    run_server(config).await?;

    Ok(())
}
