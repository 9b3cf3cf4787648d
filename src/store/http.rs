//! HTTP record store implementation
//!
//! Talks to the hosted record store over its JSON API. Handles client
//! setup, authentication headers, endpoint routing and mapping of
//! transport failures.

use std::time::{Duration, Instant};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;
use crate::config::StoreConfig;
use crate::utils::errors::{ClassroomHubError, StoreError, Result};
use crate::utils::logging::log_store_operation;
use super::protocol::{DeleteParams, FetchParams, FetchResponse, GetResponse, RecordsPayload, WriteResponse};
use super::RecordStore;

const PROJECT_HEADER: &str = "X-Project-Id";

/// Record store reached over HTTP
#[derive(Clone, Debug)]
pub struct HttpRecordStore {
    client: Client,
    base_url: Url,
    project_id: String,
    public_key: String,
}

impl HttpRecordStore {
    /// Create a new HttpRecordStore instance
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ClassroomHubError::Http)?;

        // Url::join drops the last path segment unless it ends with '/'
        let mut base = config.api_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)?;

        Ok(Self {
            client,
            base_url,
            project_id: config.project_id.clone(),
            public_key: config.public_key.clone(),
        })
    }

    /// Endpoint for a table-relative path
    pub fn endpoint(&self, table: &str, path: &str) -> Result<Url> {
        let relative = format!("projects/{}/tables/{}/{}", self.project_id, table, path);
        Ok(self.base_url.join(&relative)?)
    }

    async fn send<B, T>(&self, operation: &str, method: Method, table: &str, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(table, path)?;
        debug!(operation = operation, table = table, url = %url, "Sending record store request");

        let started = Instant::now();
        let result = self.execute(method, url, body).await;
        log_store_operation(operation, table, started.elapsed().as_millis() as u64, result.is_ok());

        result
    }

    async fn execute<B, T>(&self, method: Method, url: Url, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client
            .request(method, url)
            .header(PROJECT_HEADER, &self.project_id)
            .bearer_auth(&self.public_key)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;

        decode_body(status, &text)
    }
}

fn map_transport_error(e: reqwest::Error) -> ClassroomHubError {
    if e.is_timeout() {
        ClassroomHubError::Transport(StoreError::Timeout)
    } else if e.is_connect() {
        ClassroomHubError::Transport(StoreError::ServiceUnavailable)
    } else {
        ClassroomHubError::Transport(StoreError::RequestFailed(e.to_string()))
    }
}

/// Decode a response body into a store envelope
///
/// Error statuses still carry the store's envelope most of the time; those
/// are passed on so the `success: false` message reaches the caller.
fn decode_body<T: DeserializeOwned>(status: StatusCode, text: &str) -> Result<T> {
    match serde_json::from_str::<T>(text) {
        Ok(envelope) => {
            if !status.is_success() {
                debug!(status = %status, "Record store returned an envelope with error status");
            }
            Ok(envelope)
        }
        Err(e) if status.is_success() => Err(ClassroomHubError::Transport(
            StoreError::InvalidResponse(e.to_string()),
        )),
        Err(_) => {
            warn!(status = %status, "Record store returned an error without an envelope");
            Err(ClassroomHubError::Transport(StoreError::RequestFailed(
                format!("HTTP {}: {}", status, text)
            )))
        }
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<FetchResponse> {
        self.send("fetch", Method::POST, table, "records/query", params).await
    }

    async fn get_record_by_id(&self, table: &str, id: i64, params: &FetchParams) -> Result<GetResponse> {
        let path = format!("records/{}/query", id);
        self.send("get", Method::POST, table, &path, params).await
    }

    async fn create_records(&self, table: &str, payload: &RecordsPayload) -> Result<WriteResponse> {
        self.send("create", Method::POST, table, "records", payload).await
    }

    async fn update_records(&self, table: &str, payload: &RecordsPayload) -> Result<WriteResponse> {
        self.send("update", Method::PUT, table, "records", payload).await
    }

    async fn delete_records(&self, table: &str, params: &DeleteParams) -> Result<WriteResponse> {
        self.send("delete", Method::DELETE, table, "records", params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use assert_matches::assert_matches;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let mut config = Settings::default().store;
        config.api_url = "https://records.example.com/api/v2".to_string();
        config.project_id = "school-1".to_string();

        let store = HttpRecordStore::new(&config).unwrap();
        let url = store.endpoint("student", "records/query").unwrap();
        assert_eq!(
            url.as_str(),
            "https://records.example.com/api/v2/projects/school-1/tables/student/records/query"
        );
    }

    #[test]
    fn test_decode_error_status_with_envelope() {
        let response: FetchResponse =
            decode_body(StatusCode::BAD_REQUEST, r#"{"success": false, "message": "bad table"}"#).unwrap();
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("bad table"));
    }

    #[test]
    fn test_decode_error_status_without_envelope() {
        let result: Result<FetchResponse> = decode_body(StatusCode::BAD_GATEWAY, "upstream down");
        assert_matches!(
            result,
            Err(ClassroomHubError::Transport(StoreError::RequestFailed(msg))) if msg.contains("502")
        );
    }

    #[test]
    fn test_decode_garbage_success_body() {
        let result: Result<FetchResponse> = decode_body(StatusCode::OK, "<html>");
        assert_matches!(result, Err(ClassroomHubError::Transport(StoreError::InvalidResponse(_))));
    }
}
