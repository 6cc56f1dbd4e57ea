use crate::error::QueryError;
use crate::frame::Frame;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Location of a remote data model plus the GraphQL text to run against it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataModelsQuery {
    /// External id of the data model
    pub external_id: String,
    /// Data model version
    pub version: String,
    /// Space the data model lives in
    pub space: String,
    /// Raw GraphQL query text, possibly containing `$__from`/`$__to`
    #[serde(rename = "graphQlQuery")]
    pub graphql_query: String,
    /// JMESPath expression applied to the `data` payload; blank means none
    pub post_processing: String,
}

/// Query payload as sent by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryModel {
    #[serde(rename = "dataModellingV2Query")]
    pub data_models_query: DataModelsQuery,
}

impl QueryModel {
    /// Parses the opaque per-query JSON.
    ///
    /// # Errors
    /// Returns `QueryError::BadRequest` if the JSON does not match the query shape.
    pub fn from_json(json: &Value) -> Result<Self, QueryError> {
        QueryModel::deserialize(json).map_err(|e| QueryError::BadRequest(e.to_string()))
    }
}

/// Time range selected on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        TimeRange { from, to }
    }
}

/// A single query within a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuery {
    /// Caller-chosen identifier; also the name of the resulting frame
    pub ref_id: String,
    pub time_range: TimeRange,
    /// Opaque query payload, parsed into `QueryModel` during processing
    #[serde(default)]
    pub query: Value,
}

/// Batch of queries plus the caller's request headers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryDataRequest {
    /// Headers of the originating request, used for identity forwarding
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub queries: Vec<DataQuery>,
}

/// Outcome of a single query.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DataResponse {
    pub frames: Vec<Frame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl DataResponse {
    pub fn from_frame(frame: Frame) -> Self {
        DataResponse {
            frames: vec![frame],
            error: None,
            status: None,
        }
    }

    pub fn from_error(err: &QueryError) -> Self {
        DataResponse {
            frames: Vec::new(),
            error: Some(err.to_string()),
            status: Some(err.status()),
        }
    }
}

/// Outcomes of a batch, keyed by `ref_id`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryDataResponse {
    pub responses: BTreeMap<String, DataResponse>,
}
