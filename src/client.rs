use crate::error::QueryError;
use reqwest::Client;
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// A GraphQL request ready to be sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQlRequest {
    /// Full URL of the GraphQL endpoint
    pub endpoint: String,
    /// Query text with variables already interpolated
    pub query: String,
    /// Extra headers, typically authentication
    pub headers: Vec<(String, String)>,
}

/// Executes GraphQL requests against the upstream API.
///
/// This trait keeps the query pipeline independent of the transport.
/// Implementations can be:
/// - the reqwest-based `HttpGraphQlClient`
/// - canned responses for testing
pub trait GraphQlExecutor {
    /// Sends the request and returns the raw response body.
    ///
    /// # Errors
    /// Returns `QueryError::Transport` if the request cannot be sent or the
    /// body cannot be read. Non-success HTTP statuses are not errors here;
    /// their bodies carry the upstream error envelope.
    fn execute(
        &self,
        request: GraphQlRequest,
    ) -> impl Future<Output = Result<Vec<u8>, QueryError>> + Send;
}

/// Configuration for the upstream HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig { timeout_seconds: 30 }
    }
}

/// reqwest-backed GraphQL executor.
#[derive(Debug, Clone)]
pub struct HttpGraphQlClient {
    client: Client,
    config: ClientConfig,
}

impl HttpGraphQlClient {
    /// Creates a client with default configuration.
    ///
    /// # Errors
    /// Returns `QueryError::Internal` if the HTTP client cannot be built.
    pub fn new() -> Result<Self, QueryError> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client with custom configuration.
    ///
    /// # Errors
    /// Returns `QueryError::Internal` if the HTTP client cannot be built.
    pub fn with_config(config: ClientConfig) -> Result<Self, QueryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| QueryError::Internal(format!("http client creation: {}", e)))?;

        Ok(HttpGraphQlClient { client, config })
    }

    /// Returns a reference to the HTTP client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl GraphQlExecutor for HttpGraphQlClient {
    async fn execute(&self, request: GraphQlRequest) -> Result<Vec<u8>, QueryError> {
        let mut builder = self
            .client
            .post(&request.endpoint)
            .json(&json!({ "query": request.query }));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        debug!("Upstream responded with {}", response.status());

        let body = response
            .bytes()
            .await
            .map_err(|e| QueryError::Transport(format!("read response body: {}", e)))?;
        Ok(body.to_vec())
    }
}
