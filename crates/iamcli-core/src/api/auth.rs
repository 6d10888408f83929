//! Authentication schemes applied to outgoing requests.

use reqwest::RequestBuilder;

use crate::storage::AppIdentity;

pub const APP_CODE_HEADER: &str = "X-BK-APP-CODE";
pub const APP_SECRET_HEADER: &str = "X-BK-APP-SECRET";
pub const IAM_VERSION_HEADER: &str = "X-Bk-IAM-Version";

/// Protocol version announced to the backend
const IAM_VERSION: &str = "1";

/// Adds credentials to a request before it is sent.
pub trait Authenticate {
    fn apply(&self, builder: RequestBuilder) -> RequestBuilder;
}

/// Backend scheme: app code and secret in custom headers.
#[derive(Debug, Clone)]
pub struct AppSecretHeaders {
    identity: AppIdentity,
}

impl AppSecretHeaders {
    pub fn new(identity: AppIdentity) -> Self {
        Self { identity }
    }
}

impl Authenticate for AppSecretHeaders {
    fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(APP_CODE_HEADER, &self.identity.app_code)
            .header(APP_SECRET_HEADER, &self.identity.app_secret)
            .header(IAM_VERSION_HEADER, IAM_VERSION)
    }
}

/// SaaS scheme: HTTP basic auth with the same identity.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    identity: AppIdentity,
}

impl BasicAuth {
    pub fn new(identity: AppIdentity) -> Self {
        Self { identity }
    }
}

impl Authenticate for BasicAuth {
    fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.basic_auth(&self.identity.app_code, Some(&self.identity.app_secret))
    }
}
