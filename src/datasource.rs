//! Query pipeline: interpolate, execute, classify, post-process, tabularize

use crate::auth::upstream_auth_headers;
use crate::client::{ClientConfig, GraphQlExecutor, GraphQlRequest, HttpGraphQlClient};
use crate::envelope::classify_response;
use crate::error::QueryError;
use crate::frame::Frame;
use crate::interpolate::{interpolate_variables, ScopedVars};
use crate::post_processing::apply_post_processing;
use crate::query::{DataQuery, DataResponse, QueryDataRequest, QueryDataResponse, QueryModel};
use crate::settings::PluginSettings;
use crate::structure::frame_from_value;
use reqwest::Client;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Outcome of a health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckHealthResult {
    pub status: HealthStatus,
    pub message: String,
}

/// Data source answering dashboard query batches.
///
/// Holds only read-only state: the settings, the executor and an HTTP client
/// for token requests. Every query gets its own JSON tree and frame.
#[derive(Debug, Clone)]
pub struct Datasource<E = HttpGraphQlClient> {
    settings: PluginSettings,
    executor: E,
    http: Client,
}

impl Datasource<HttpGraphQlClient> {
    /// Creates a data source that talks to the upstream API over HTTP.
    ///
    /// # Errors
    /// Returns `QueryError::Internal` if the HTTP client cannot be built.
    pub fn with_http(settings: PluginSettings, config: ClientConfig) -> Result<Self, QueryError> {
        let executor = HttpGraphQlClient::with_config(config)?;
        let http = executor.client().clone();
        Ok(Datasource {
            settings,
            executor,
            http,
        })
    }
}

impl<E: GraphQlExecutor + Sync> Datasource<E> {
    /// Creates a data source around a custom executor.
    pub fn new(settings: PluginSettings, executor: E) -> Self {
        Datasource {
            settings,
            executor,
            http: Client::new(),
        }
    }

    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Runs every query of a batch; one outcome per `ref_id`.
    ///
    /// Failures stay local to their query and never abort the batch.
    pub async fn query_data(&self, request: QueryDataRequest) -> QueryDataResponse {
        let mut responses = BTreeMap::new();
        if request.queries.is_empty() {
            return QueryDataResponse { responses };
        }

        let auth_headers = upstream_auth_headers(&self.http, &self.settings, &request.headers).await;

        for query in &request.queries {
            let outcome = match &auth_headers {
                Ok(headers) => self.query(query, headers).await,
                Err(err) => Err(err.clone()),
            };

            let response = match outcome {
                Ok(frame) => {
                    debug!(
                        "Query {} produced {} columns x {} rows",
                        query.ref_id,
                        frame.fields.len(),
                        frame.row_count()
                    );
                    DataResponse::from_frame(frame)
                }
                Err(err) => {
                    warn!("Query {} failed: {}", query.ref_id, err);
                    DataResponse::from_error(&err)
                }
            };
            responses.insert(query.ref_id.clone(), response);
        }

        info!("Processed batch of {} queries", request.queries.len());
        QueryDataResponse { responses }
    }

    /// Runs a single query through the whole pipeline.
    ///
    /// # Errors
    /// Returns the first fatal `QueryError` of the pipeline; nothing is retried.
    pub async fn query(
        &self,
        query: &DataQuery,
        auth_headers: &[(String, String)],
    ) -> Result<Frame, QueryError> {
        let model = QueryModel::from_json(&query.query)?;
        let data_models_query = &model.data_models_query;

        let vars = ScopedVars::from_time_range(&query.time_range);
        let interpolated = interpolate_variables(&data_models_query.graphql_query, &vars);
        debug!("Interpolated query: {}", interpolated);

        let request = GraphQlRequest {
            endpoint: self.settings.graphql_endpoint(data_models_query),
            query: interpolated,
            headers: auth_headers.to_vec(),
        };
        let body = self.executor.execute(request).await?;
        debug!("Raw GraphQL response: {}", String::from_utf8_lossy(&body));

        let data = classify_response(&body)?;
        debug!(
            "Post-processing expression: {:?}",
            data_models_query.post_processing
        );
        let transformed = apply_post_processing(&data_models_query.post_processing, data)?;

        Ok(frame_from_value(&query.ref_id, &transformed))
    }

    /// Reports whether the settings needed to reach the upstream API are present.
    pub fn check_health(&self) -> CheckHealthResult {
        match self.settings.validate() {
            Ok(()) => CheckHealthResult {
                status: HealthStatus::Ok,
                message: "Data source is working".to_string(),
            },
            Err(err) => {
                warn!("Health check failed: {}", err);
                CheckHealthResult {
                    status: HealthStatus::Error,
                    message: format!("Unable to load settings: {}", err),
                }
            }
        }
    }
}
