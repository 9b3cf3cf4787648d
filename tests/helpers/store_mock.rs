//! Mock record store API server for testing
//!
//! Simulates the hosted record store's HTTP API with wiremock so the HTTP
//! store and the record client can be exercised end to end.

use serde_json::Value;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};
use ClassroomHub::config::StoreConfig;
use ClassroomHub::Settings;

pub const TEST_PROJECT: &str = "school-1";
pub const TEST_KEY: &str = "test-public-key";

/// Mock record store server
pub struct StoreMockServer {
    pub server: MockServer,
}

impl StoreMockServer {
    /// Start a new mock server
    pub async fn new() -> Self {
        Self { server: MockServer::start().await }
    }

    /// Store configuration pointing at this server
    pub fn config(&self) -> StoreConfig {
        StoreConfig {
            api_url: format!("{}/api", self.server.uri()),
            project_id: TEST_PROJECT.to_string(),
            public_key: TEST_KEY.to_string(),
            timeout_seconds: 2,
            user_agent: "ClassroomHub-Test/1.0".to_string(),
        }
    }

    /// Full settings pointing at this server
    pub fn settings(&self) -> Settings {
        Settings {
            store: self.config(),
            ..Settings::default()
        }
    }

    pub fn table_path(table: &str, suffix: &str) -> String {
        format!("/api/projects/{}/tables/{}/{}", TEST_PROJECT, table, suffix)
    }

    /// Respond to one method/path with a JSON body
    pub async fn mock_json(&self, http_method: &str, table: &str, suffix: &str, status: u16, body: Value) {
        Mock::given(method(http_method))
            .and(path(Self::table_path(table, suffix)))
            .and(header("X-Project-Id", TEST_PROJECT))
            .and(header("Authorization", format!("Bearer {}", TEST_KEY).as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Respond with a raw body
    pub async fn mock_raw(&self, http_method: &str, table: &str, suffix: &str, status: u16, body: &str) {
        Mock::given(method(http_method))
            .and(path(Self::table_path(table, suffix)))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Respond after a delay
    pub async fn mock_delayed(&self, http_method: &str, table: &str, suffix: &str, delay_ms: u64, body: Value) {
        Mock::given(method(http_method))
            .and(path(Self::table_path(table, suffix)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(body)
                    .set_delay(std::time::Duration::from_millis(delay_ms)),
            )
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of every request received so far
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }

    /// Reset all mocks
    pub async fn reset(&self) {
        self.server.reset().await;
    }
}
