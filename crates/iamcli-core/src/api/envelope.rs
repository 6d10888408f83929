//! The call envelope engine shared by every remote operation.
//!
//! Every response body is `{"code": int, "message": string, "data": any}`.
//! `code == 0` means success and `data` holds the payload; anything else is
//! an application failure, whatever the HTTP status said.

use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use super::auth::Authenticate;
use super::dump::RequestDump;
use super::ApiError;

/// Timeout used when a caller passes `Duration::ZERO`.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection setup timeout, applied on top of the per-call timeout
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Response header carrying the server-side correlation id
const REQUEST_ID_HEADER: &str = "X-Request-Id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// Query-string switches honoured by the remote service.
///
/// `debug` asks the backend to attach evaluation details to the response,
/// `force` asks it to skip its own caches and read from the database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub debug: bool,
    pub force: bool,
}

impl Overrides {
    fn pairs(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        [("debug", self.debug), ("force", self.force)]
            .into_iter()
            .filter(|(_, enabled)| *enabled)
            .map(|(name, _)| (name, "true"))
    }
}

/// Ordered request fields. Query parameters for GET, a JSON object for POST.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    fields: Vec<(String, Value)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    fn query_pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                (name.clone(), value)
            })
            .collect()
    }

    fn to_json(&self) -> Value {
        let map: Map<String, Value> = self.fields.iter().cloned().collect();
        Value::Object(map)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Value,
}

/// What the response told us, for the diagnostic log line.
#[derive(Default)]
struct CallTrace {
    status: Option<StatusCode>,
    request_id: Option<String>,
}

impl CallTrace {
    fn status_code(&self) -> i64 {
        self.status.map(|s| i64::from(s.as_u16())).unwrap_or(-1)
    }

    fn request_id(&self) -> &str {
        self.request_id.as_deref().unwrap_or("-")
    }
}

/// Issues requests against one host with one authentication scheme.
/// Clone is cheap - reqwest::Client uses Arc internally.
#[derive(Clone)]
pub struct CallEngine<A> {
    http: Client,
    host: String,
    auth: A,
    overrides: Overrides,
}

impl<A: Authenticate> CallEngine<A> {
    pub fn new(host: &str, auth: A, overrides: Overrides) -> Result<Self, ApiError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            host: host.trim_end_matches('/').to_string(),
            auth,
            overrides,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    /// Send one request and unwrap the envelope into `T`.
    ///
    /// Every call logs a replayable, redacted `curl` command: at error level
    /// when anything fails, at debug level otherwise.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        timeout: Duration,
    ) -> Result<T, ApiError> {
        let timeout = if timeout.is_zero() {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            timeout
        };

        let request = match self.build_request(method, path, params, timeout) {
            Ok(request) => request,
            Err(e) => {
                error!(
                    method = ?method,
                    host = %self.host,
                    path,
                    error = %e,
                    "[http request fail] could not build request"
                );
                return Err(e);
            }
        };
        let dump = RequestDump::from_request(&request).to_curl();

        let start = Instant::now();
        let mut trace = CallTrace::default();
        let result = self.exchange(request, &mut trace).await;
        let took_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => debug!(
                status = trace.status_code(),
                request_id = %trace.request_id(),
                took_ms,
                request = %dump,
                "[http request] ok"
            ),
            Err(e) => error!(
                status = trace.status_code(),
                request_id = %trace.request_id(),
                took_ms,
                error = %e,
                request = %dump,
                "[http request fail]"
            ),
        }

        result
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        timeout: Duration,
    ) -> Result<reqwest::Request, ApiError> {
        let mut builder = self.http.request(method.into(), self.url(path)).timeout(timeout);

        let mut query = Vec::new();
        match method {
            Method::Get => query.extend(params.query_pairs()),
            Method::Post => builder = builder.json(&params.to_json()),
        }

        // Overrides go in the query string for both methods
        for (name, value) in self.overrides.pairs() {
            if !params.contains(name) {
                query.push((name.to_string(), value.to_string()));
            }
        }
        if !query.is_empty() {
            builder = builder.query(&query);
        }

        Ok(self.auth.apply(builder).build()?)
    }

    async fn exchange<T: DeserializeOwned>(
        &self,
        request: reqwest::Request,
        trace: &mut CallTrace,
    ) -> Result<T, ApiError> {
        let response = self.http.execute(request).await?;

        let status = response.status();
        trace.status = Some(status);
        trace.request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }

        let envelope: Envelope =
            serde_json::from_str(&body).map_err(|e| ApiError::decode(e, &body))?;
        if envelope.code != 0 {
            return Err(ApiError::Application {
                code: envelope.code,
                message: envelope.message,
            });
        }

        T::deserialize(&envelope.data).map_err(|e| ApiError::decode(e, &envelope.data.to_string()))
    }

    /// Unauthenticated GET used by liveness endpoints, which do not use the
    /// envelope. Returns the body on any 2xx status.
    pub async fn probe(&self, path: &str, timeout: Duration) -> Result<String, ApiError> {
        let url = self.url(path);
        let response = self.http.get(&url).timeout(timeout).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Liveness check failed");
            return Err(ApiError::from_status(status, &body));
        }

        debug!(url = %url, status = status.as_u16(), "Liveness check ok");
        Ok(body)
    }
}
