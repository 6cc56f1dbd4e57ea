#![allow(dead_code)]

use axum::{
    extract::{Form, State},
    http::{HeaderMap, StatusCode, Uri},
    routing::post,
    Json, Router,
};
use chrono::{TimeZone, Utc};
use graphql_frames::{DataQuery, PluginSettings, TimeRange};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

pub const CLIENT_SECRET: &str = "s3cret";
pub const MACHINE_TOKEN: &str = "machine-token";

/// A GraphQL request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub id_token: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Debug, Default)]
pub struct Recorder {
    requests: Mutex<Vec<RecordedRequest>>,
}

impl Recorder {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn token(Form(form): Form<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    let valid = form.get("grant_type").map(String::as_str) == Some("client_credentials")
        && form.get("client_secret").map(String::as_str) == Some(CLIENT_SECRET);
    if valid {
        (
            StatusCode::OK,
            Json(json!({"access_token": MACHINE_TOKEN, "token_type": "Bearer", "expires_in": 3600})),
        )
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid_client"})))
    }
}

/// Answers by data model external id:
/// - `Pumps`: a connection with edges
/// - `Echo`: returns the received query text under `data.echo.query`
/// - `Broken`: a singular error object with status 400
/// - `Failing`: a GraphQL `errors` list
async fn graphql(
    State(recorder): State<Arc<Recorder>>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    let path = uri.path().to_string();
    recorder.requests.lock().unwrap().push(RecordedRequest {
        path: path.clone(),
        authorization: header(&headers, "authorization"),
        id_token: header(&headers, "x-id-token"),
        content_type: header(&headers, "content-type"),
        body: body.clone(),
    });

    if path.contains("/datamodels/Pumps/") {
        (
            StatusCode::OK,
            Json(json!({
                "data": {
                    "listPump": {
                        "edges": [
                            {"node": {"name": "p1", "pressure": 1.5, "updatedAt": "2024-01-01T06:00:00Z"}, "cursor": "a"},
                            {"node": {"name": "p2", "pressure": 2.5, "updatedAt": "2024-01-01T07:00:00Z"}, "cursor": "b"}
                        ],
                        "pageInfo": {"hasNextPage": false}
                    }
                }
            })),
        )
    } else if path.contains("/datamodels/Echo/") {
        (
            StatusCode::OK,
            Json(json!({"data": {"echo": {"query": body["query"].clone()}}})),
        )
    } else if path.contains("/datamodels/Broken/") {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"message": "Invalid token", "code": 400}})),
        )
    } else if path.contains("/datamodels/Failing/") {
        (
            StatusCode::OK,
            Json(json!({"errors": [{"message": "Cannot query field 'foo'"}, {"message": "Unknown type 'Bar'"}]})),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"message": "Not found", "code": 404}})),
        )
    }
}

/// Starts a mock upstream API on an ephemeral port.
pub async fn spawn_upstream() -> (SocketAddr, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let app = Router::new()
        .route("/token", post(token))
        .fallback(graphql)
        .with_state(recorder.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, recorder)
}

/// Settings pointing at the mock upstream.
pub fn settings_for(addr: SocketAddr) -> PluginSettings {
    PluginSettings {
        cluster_url: format!("http://{}", addr),
        cognite_project: "plant".to_string(),
        ..Default::default()
    }
}

pub fn time_range() -> TimeRange {
    TimeRange::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
    )
}

pub fn query_json(model: &str, graphql: &str, post_processing: &str) -> Value {
    json!({
        "dataModellingV2Query": {
            "space": "assets",
            "externalId": model,
            "version": "1",
            "graphQlQuery": graphql,
            "postProcessing": post_processing
        }
    })
}

pub fn data_query(ref_id: &str, model: &str, graphql: &str, post_processing: &str) -> DataQuery {
    DataQuery {
        ref_id: ref_id.to_string(),
        time_range: time_range(),
        query: query_json(model, graphql, post_processing),
    }
}
