//! Capabilities shared by the backend and SaaS clients.

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::auth::Authenticate;
use super::envelope::{CallEngine, Method, Params};
use super::ApiError;

/// `/ping` timeout in seconds
const PING_TIMEOUT_SECS: u64 = 5;

/// JSON object as returned by most debug endpoints
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// A remote service reachable through the call envelope.
///
/// Implementors pick the authentication scheme by choosing `Auth`; the
/// request machinery itself lives in [`CallEngine`]. Nothing here caches or
/// retries.
#[allow(async_fn_in_trait)]
pub trait ServiceClient {
    type Auth: Authenticate;

    fn engine(&self) -> &CallEngine<Self::Auth>;

    /// Make one authenticated read to confirm the identity is accepted.
    async fn verify_identity(&self) -> Result<(), ApiError>;

    fn host(&self) -> &str {
        self.engine().host()
    }

    /// Check that the host answers `/ping`.
    async fn ping(&self) -> Result<(), ApiError> {
        self.engine()
            .probe("/ping", Duration::from_secs(PING_TIMEOUT_SECS))
            .await
            .map(|_| ())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        timeout: Duration,
    ) -> Result<T, ApiError> {
        self.engine().call(method, path, params, timeout).await
    }
}
