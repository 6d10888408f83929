//! Client for the IAM SaaS debug-log API, authenticated with basic auth.

use std::time::Duration;

use chrono::Utc;

use super::auth::BasicAuth;
use super::client::{JsonObject, ServiceClient};
use super::envelope::{CallEngine, Method, Overrides, Params};
use super::ApiError;
use crate::storage::AppIdentity;

/// Timeout for debug-log reads, in seconds
const DEBUG_TIMEOUT_SECS: u64 = 10;

/// Day format expected by the debug list endpoint, e.g. `20210501`
pub const DAY_FORMAT: &str = "%Y%m%d";

pub struct SaasClient {
    engine: CallEngine<BasicAuth>,
}

impl SaasClient {
    pub fn new(host: &str, identity: AppIdentity, overrides: Overrides) -> Result<Self, ApiError> {
        let engine = CallEngine::new(host, BasicAuth::new(identity), overrides)?;
        Ok(Self { engine })
    }

    /// Debug entries recorded on `day` (`YYYYMMDD`).
    pub async fn list_debug(&self, day: &str) -> Result<Vec<JsonObject>, ApiError> {
        let params = Params::new().with("day", day);
        self.call(
            Method::Get,
            "/api/v1/debug/",
            &params,
            Duration::from_secs(DEBUG_TIMEOUT_SECS),
        )
        .await
    }

    /// One debug entry by request id or task id.
    pub async fn get_debug(&self, request_id: &str) -> Result<JsonObject, ApiError> {
        let path = format!("/api/v1/debug/{}/", request_id);
        self.call(
            Method::Get,
            &path,
            &Params::new(),
            Duration::from_secs(DEBUG_TIMEOUT_SECS),
        )
        .await
    }
}

impl ServiceClient for SaasClient {
    type Auth = BasicAuth;

    fn engine(&self) -> &CallEngine<BasicAuth> {
        &self.engine
    }

    async fn verify_identity(&self) -> Result<(), ApiError> {
        let today = Utc::now().format(DAY_FORMAT).to_string();
        self.list_debug(&today).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{CapturedLogs, MockResponse, MockServer};
    use base64::{engine::general_purpose::STANDARD, Engine};

    const SECRET: &str = "2c6f9d0e-secret";

    fn client(server: &MockServer) -> SaasClient {
        let identity = AppIdentity::new("bk_iam", SECRET);
        SaasClient::new(server.url(), identity, Overrides::default()).unwrap()
    }

    #[tokio::test]
    async fn test_list_debug_uses_basic_auth() {
        let server = MockServer::start(vec![(
            "/api/v1/debug/",
            MockResponse::json(200, r#"{"code":0,"message":"","data":[{"id":"abc"}]}"#),
        )])
        .await;

        let entries = client(&server).list_debug("20210501").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["id"], "abc");

        let raw = server.last_request();
        assert!(raw.starts_with("GET /api/v1/debug/?day=20210501 HTTP/1.1"));
        let token = STANDARD.encode(format!("bk_iam:{}", SECRET));
        let expected = format!("authorization: basic {}", token);
        assert!(raw.to_lowercase().contains(&expected.to_lowercase()));
        assert!(!raw.to_lowercase().contains("x-bk-app-secret"));
    }

    #[tokio::test]
    async fn test_get_debug_path() {
        let server = MockServer::start(vec![(
            "/api/v1/debug/9f1c2a7e/",
            MockResponse::json(
                200,
                r#"{"code":0,"message":"","data":{"id":"9f1c2a7e","steps":[]}}"#,
            ),
        )])
        .await;

        let entry = client(&server).get_debug("9f1c2a7e").await.unwrap();
        assert_eq!(entry["id"], "9f1c2a7e");
    }

    #[tokio::test]
    async fn test_verify_identity_lists_today() {
        let server = MockServer::start(vec![(
            "/api/v1/debug/",
            MockResponse::json(200, r#"{"code":0,"message":"","data":[]}"#),
        )])
        .await;

        client(&server).verify_identity().await.unwrap();
        let today = Utc::now().format(DAY_FORMAT).to_string();
        assert!(server.last_request().contains(&format!("day={}", today)));
    }

    #[tokio::test]
    async fn test_failure_dump_drops_authorization() {
        let server = MockServer::start(vec![(
            "/api/v1/debug/",
            MockResponse::json(401, r#"{"code":401,"message":"unauthorized","data":null}"#),
        )])
        .await;
        let logs = CapturedLogs::default();
        let _guard = logs.install();

        let err = client(&server).list_debug("20210501").await.unwrap_err();
        assert!(err.is_transport());

        let output = logs.contents();
        assert!(output.contains("[http request fail]"));
        assert!(!output.to_lowercase().contains("authorization"));
        assert!(!output.contains(SECRET));
    }

    #[tokio::test]
    async fn test_ping() {
        let server = MockServer::start(vec![("/ping", MockResponse::text(200, "pong"))]).await;
        client(&server).ping().await.unwrap();
    }
}
