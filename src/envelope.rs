//! Classification of the upstream GraphQL response envelope

use crate::error::QueryError;
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

/// Singular error object returned for request-level failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ErrorResponse {
    pub message: String,
    pub code: i64,
}

/// One entry of the GraphQL `errors` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ErrorItem {
    pub message: String,
}

/// Raw `{data?, errors?, error?}` envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GraphQlEnvelope {
    pub data: Option<Value>,
    pub errors: Option<Vec<ErrorItem>>,
    pub error: Option<ErrorResponse>,
}

/// Upstream application-level error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    FieldError(ErrorResponse),
    ItemErrors(Vec<ErrorItem>),
}

impl From<UpstreamError> for QueryError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::FieldError(ErrorResponse { message, code }) => {
                QueryError::UpstreamField { message, code }
            }
            UpstreamError::ItemErrors(items) => {
                QueryError::UpstreamItems(items.into_iter().map(|item| item.message).collect())
            }
        }
    }
}

impl GraphQlEnvelope {
    /// Parses a raw response body.
    ///
    /// # Errors
    /// Returns `QueryError::MalformedResponse` if the body is not a JSON object.
    pub fn from_slice(body: &[u8]) -> Result<Self, QueryError> {
        serde_json::from_slice(body).map_err(|e| QueryError::MalformedResponse(e.to_string()))
    }

    /// The upstream error carried by the envelope, singular form first.
    pub fn upstream_error(&self) -> Option<UpstreamError> {
        if let Some(err) = &self.error {
            return Some(UpstreamError::FieldError(err.clone()));
        }
        self.errors.clone().map(UpstreamError::ItemErrors)
    }

    /// Routes the envelope to its `data` payload or an error.
    ///
    /// The singular `error` takes priority over the `errors` list, and both
    /// take priority over `data`.
    pub fn into_data(self) -> Result<Value, QueryError> {
        if let Some(err) = self.upstream_error() {
            error!("Upstream returned an error: {:?}", err);
            return Err(err.into());
        }
        self.data.ok_or(QueryError::EmptyData)
    }
}

/// Parses a raw response body and returns its `data` payload.
pub fn classify_response(body: &[u8]) -> Result<Value, QueryError> {
    GraphQlEnvelope::from_slice(body)?.into_data()
}
