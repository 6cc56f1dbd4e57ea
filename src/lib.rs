pub mod auth;
pub mod client;
pub mod datasource;
pub mod envelope;
pub mod error;
pub mod frame;
pub mod inference;
pub mod interpolate;
pub mod post_processing;
pub mod query;
pub mod server;
pub mod settings;
pub mod structure;
pub mod value;

pub use client::{ClientConfig, GraphQlExecutor, GraphQlRequest, HttpGraphQlClient};
pub use datasource::{CheckHealthResult, Datasource, HealthStatus};
pub use envelope::{classify_response, GraphQlEnvelope, UpstreamError};
pub use error::QueryError;
pub use frame::{Column, ColumnType, ColumnValues, Frame};
pub use inference::{infer_column, infer_column_type, parse_datetime};
pub use interpolate::{interpolate_variables, ScopedVars};
pub use post_processing::apply_post_processing;
pub use query::{
    DataModelsQuery, DataQuery, DataResponse, QueryDataRequest, QueryDataResponse, QueryModel,
    TimeRange,
};
pub use server::{create_router, run_server, ApiError, AppState, ServerConfig};
pub use settings::{PluginSettings, SettingsError};
pub use structure::{analyze, frame_from_value};
pub use value::JsonShape;
