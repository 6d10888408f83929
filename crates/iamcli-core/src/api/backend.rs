//! Client for the IAM backend debug API.
//!
//! Authenticates with the `X-BK-APP-CODE` / `X-BK-APP-SECRET` headers.
//! Every operation maps typed parameters onto one GET through the call
//! envelope; liveness endpoints bypass the envelope.

use std::fmt;
use std::time::Duration;

use super::auth::AppSecretHeaders;
use super::client::{JsonObject, ServiceClient};
use super::envelope::{CallEngine, Method, Overrides, Params};
use super::ApiError;
use crate::storage::AppIdentity;

/// Default timeout for debug queries, in seconds
const QUERY_TIMEOUT_SECS: u64 = 10;

/// Policy evaluation can be slow with `debug` on
const QUERY_POLICY_TIMEOUT_SECS: u64 = 20;

/// Timeout for `/healthz` and `/version`
const LIVENESS_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectType {
    User,
    Group,
}

impl SubjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectType::User => "user",
            SubjectType::Group => "group",
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a policy evaluation query.
#[derive(Debug, Clone)]
pub struct PolicyQuery {
    pub system: String,
    pub subject_type: SubjectType,
    pub subject_id: String,
    pub action: String,
    /// Skip the backend caches for this query only
    pub force: bool,
    /// Ask for evaluation details for this query only
    pub debug: bool,
}

/// Filter for listing a system's policies of one action.
#[derive(Debug, Clone, Default)]
pub struct PolicyListQuery {
    pub action_id: String,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub timestamp: Option<i64>,
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",")
}

pub struct BackendClient {
    engine: CallEngine<AppSecretHeaders>,
}

impl BackendClient {
    pub fn new(host: &str, identity: AppIdentity, overrides: Overrides) -> Result<Self, ApiError> {
        let engine = CallEngine::new(host, AppSecretHeaders::new(identity), overrides)?;
        Ok(Self { engine })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &Params,
        timeout_secs: u64,
    ) -> Result<T, ApiError> {
        self.call(Method::Get, path, params, Duration::from_secs(timeout_secs))
            .await
    }

    // ===== Liveness =====

    pub async fn healthz(&self) -> Result<(), ApiError> {
        self.engine
            .probe("/healthz", Duration::from_secs(LIVENESS_TIMEOUT_SECS))
            .await
            .map(|_| ())
    }

    /// Build information reported by `/version`.
    pub async fn version(&self) -> Result<JsonObject, ApiError> {
        let body = self
            .engine
            .probe("/version", Duration::from_secs(LIVENESS_TIMEOUT_SECS))
            .await?;
        serde_json::from_str(&body).map_err(|e| ApiError::decode(e, &body))
    }

    // ===== Systems =====

    pub async fn list_systems(&self) -> Result<Vec<JsonObject>, ApiError> {
        let params = Params::new().with("fields", "");
        self.get("/api/v1/web/systems", &params, QUERY_TIMEOUT_SECS).await
    }

    // ===== Debug queries =====

    /// Permission model (resource types, actions, instance selections) of a system
    pub async fn query_model(&self, system: &str) -> Result<JsonObject, ApiError> {
        let params = Params::new().with("system", system);
        self.get("/api/v1/debug/query/model", &params, QUERY_TIMEOUT_SECS).await
    }

    pub async fn query_action(&self, system: &str) -> Result<JsonObject, ApiError> {
        let params = Params::new().with("system", system);
        self.get("/api/v1/debug/query/action", &params, QUERY_TIMEOUT_SECS).await
    }

    /// A subject together with its departments and groups
    pub async fn query_subject(
        &self,
        subject_type: SubjectType,
        subject_id: &str,
    ) -> Result<JsonObject, ApiError> {
        let params = Params::new()
            .with("type", subject_type.as_str())
            .with("id", subject_id);
        self.get("/api/v1/debug/query/subject", &params, QUERY_TIMEOUT_SECS).await
    }

    pub async fn query_policy(&self, query: &PolicyQuery) -> Result<JsonObject, ApiError> {
        let mut params = Params::new()
            .with("system", query.system.as_str())
            .with("subject_type", query.subject_type.as_str())
            .with("subject_id", query.subject_id.as_str())
            .with("action", query.action.as_str());
        if query.force {
            params.push("force", true);
        }
        if query.debug {
            params.push("debug", true);
        }
        self.get("/api/v1/debug/query/policy", &params, QUERY_POLICY_TIMEOUT_SECS)
            .await
    }

    // ===== Cache inspection =====

    /// Cached policies of a subject; without `action` the backend lists all
    /// cached actions instead of one action's detail.
    pub async fn query_cache_policy(
        &self,
        system: &str,
        subject_type: SubjectType,
        subject_id: &str,
        action: Option<&str>,
    ) -> Result<JsonObject, ApiError> {
        let mut params = Params::new()
            .with("system", system)
            .with("subject_type", subject_type.as_str())
            .with("subject_id", subject_id);
        if let Some(action) = action.filter(|a| !a.is_empty()) {
            params.push("action", action);
        }
        self.get("/api/v1/debug/cache/policy", &params, QUERY_TIMEOUT_SECS).await
    }

    pub async fn query_cache_expression(&self, pks: &[i64]) -> Result<JsonObject, ApiError> {
        let params = Params::new().with("pks", join_ids(pks));
        self.get("/api/v1/debug/cache/expression", &params, QUERY_TIMEOUT_SECS)
            .await
    }

    // ===== Policy objects =====
    // Used by systems that pull policies and evaluate them on their side.

    pub async fn policy_get(&self, system: &str, policy_id: i64) -> Result<JsonObject, ApiError> {
        let path = format!("/api/v1/systems/{}/policies/{}", system, policy_id);
        self.get(&path, &Params::new(), QUERY_TIMEOUT_SECS).await
    }

    pub async fn policy_list(
        &self,
        system: &str,
        query: &PolicyListQuery,
    ) -> Result<JsonObject, ApiError> {
        let path = format!("/api/v1/systems/{}/policies", system);
        let mut params = Params::new().with("action_id", query.action_id.as_str());
        if let Some(page) = query.page {
            params.push("page", page);
        }
        if let Some(page_size) = query.page_size {
            params.push("page_size", page_size);
        }
        if let Some(timestamp) = query.timestamp {
            params.push("timestamp", timestamp);
        }
        self.get(&path, &params, QUERY_TIMEOUT_SECS).await
    }

    pub async fn policy_subjects(
        &self,
        system: &str,
        policy_ids: &[i64],
    ) -> Result<Vec<JsonObject>, ApiError> {
        let path = format!("/api/v1/systems/{}/policies/-/subjects", system);
        let params = Params::new().with("ids", join_ids(policy_ids));
        self.get(&path, &params, QUERY_TIMEOUT_SECS).await
    }
}

impl ServiceClient for BackendClient {
    type Auth = AppSecretHeaders;

    fn engine(&self) -> &CallEngine<AppSecretHeaders> {
        &self.engine
    }

    async fn verify_identity(&self) -> Result<(), ApiError> {
        self.list_systems().await.map(|_| ())
    }
}
