//! Per-query error taxonomy

/// Errors that end the processing of a single query.
///
/// Each variant becomes the error result of the query it occurred in;
/// sibling queries in the same batch are unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The incoming query JSON could not be parsed
    BadRequest(String),
    /// Network or connection failure talking to the upstream API
    Transport(String),
    /// The upstream body was not a JSON response envelope
    MalformedResponse(String),
    /// Singular `error` object returned by the upstream API
    UpstreamField { message: String, code: i64 },
    /// List-shaped `errors` returned by the upstream API
    UpstreamItems(Vec<String>),
    /// Success envelope without a `data` payload
    EmptyData,
    /// Post-processing expression failed to compile or evaluate
    PostProcessing(String),
    /// Request construction or serialization failure
    Internal(String),
}

impl QueryError {
    /// HTTP-style status code reported alongside the error message.
    ///
    /// Only malformed caller input is a client error; everything else is
    /// reported as a server-side failure.
    pub fn status(&self) -> u16 {
        match self {
            QueryError::BadRequest(_) => 400,
            _ => 500,
        }
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::BadRequest(msg) => write!(f, "json unmarshal: {}", msg),
            QueryError::Transport(msg) => write!(f, "http request: {}", msg),
            QueryError::MalformedResponse(msg) => write!(f, "json unmarshal: {}", msg),
            QueryError::UpstreamField { message, .. } => write!(f, "API error: {}", message),
            QueryError::UpstreamItems(messages) => {
                write!(f, "API errors:")?;
                for message in messages {
                    write!(f, "\n- {}", message)?;
                }
                Ok(())
            }
            QueryError::EmptyData => write!(f, "no data in response"),
            QueryError::PostProcessing(msg) => {
                write!(f, "error transforming JSON response: {}", msg)
            }
            QueryError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for QueryError {}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        QueryError::Transport(err.to_string())
    }
}

impl From<jmespath::JmespathError> for QueryError {
    fn from(err: jmespath::JmespathError) -> Self {
        QueryError::PostProcessing(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_errors_one_line_per_message() {
        let err = QueryError::UpstreamItems(vec![
            "Field 'foo' not found".to_string(),
            "Syntax error".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "API errors:\n- Field 'foo' not found\n- Syntax error"
        );
    }

    #[test]
    fn test_field_error_message() {
        let err = QueryError::UpstreamField {
            message: "Unauthorized".to_string(),
            code: 401,
        };
        assert_eq!(err.to_string(), "API error: Unauthorized");
    }

    #[test]
    fn test_status_distinguishes_bad_request() {
        assert_eq!(QueryError::BadRequest("eof".to_string()).status(), 400);
        assert_eq!(QueryError::EmptyData.status(), 500);
        assert_eq!(QueryError::Transport("refused".to_string()).status(), 500);
    }
}
