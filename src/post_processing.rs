//! JMESPath post-processing of the `data` payload

use crate::error::QueryError;
use serde_json::Value;
use tracing::debug;

/// Applies `expression` to `payload`.
///
/// A blank expression returns the payload unchanged.
///
/// # Errors
/// Returns `QueryError::PostProcessing` if the expression does not compile or
/// cannot be evaluated against the payload.
pub fn apply_post_processing(expression: &str, payload: Value) -> Result<Value, QueryError> {
    if expression.trim().is_empty() {
        debug!("Empty post-processing expression, using raw data");
        return Ok(payload);
    }

    let compiled = jmespath::compile(expression)?;
    let result = compiled.search(&payload)?;
    serde_json::to_value(&*result).map_err(|e| QueryError::PostProcessing(e.to_string()))
}
