//! Replayable `curl` rendering of a request, with credentials redacted.
//!
//! Every call logs one of these (error level on failure, debug level on
//! success), so an operator can paste it into a shell to reproduce the
//! request after filling the secret back in.

use super::auth::APP_SECRET_HEADER;

/// Placeholder written in place of the app secret
pub const REDACTED: &str = "*****";

/// Headers removed from the dump entirely
const STRIPPED_HEADERS: [&str; 2] = ["authorization", "proxy-authorization"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDump {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestDump {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub(crate) fn from_request(request: &reqwest::Request) -> Self {
        let headers = request
            .headers()
            .iter()
            .map(|(name, value)| {
                let value = value.to_str().unwrap_or("<binary>");
                (name.as_str().to_string(), value.to_string())
            })
            .collect();
        let body = request
            .body()
            .and_then(|b| b.as_bytes())
            .map(|b| String::from_utf8_lossy(b).into_owned());

        Self {
            method: request.method().as_str().to_string(),
            url: request.url().to_string(),
            headers,
            body,
        }
    }

    /// Render as `curl -X 'METHOD' [-d 'BODY'] -H 'Name: value'... 'URL'`.
    /// Headers are sorted by name so the output is stable.
    pub fn to_curl(&self) -> String {
        let mut headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .filter_map(|(name, value)| redact(name, value).map(|v| (name.as_str(), v)))
            .collect();
        headers.sort_by_key(|(name, _)| name.to_ascii_lowercase());

        let mut parts = vec!["curl".to_string(), "-X".to_string(), shell_quote(&self.method)];
        if let Some(body) = self.body.as_deref().filter(|b| !b.is_empty()) {
            parts.push("-d".to_string());
            parts.push(shell_quote(body));
        }
        for (name, value) in headers {
            parts.push("-H".to_string());
            parts.push(shell_quote(&format!("{}: {}", name, value)));
        }
        parts.push(shell_quote(&self.url));
        parts.join(" ")
    }
}

fn redact<'a>(name: &str, value: &'a str) -> Option<&'a str> {
    if STRIPPED_HEADERS.iter().any(|h| name.eq_ignore_ascii_case(h)) {
        None
    } else if name.eq_ignore_ascii_case(APP_SECRET_HEADER) {
        Some(REDACTED)
    } else {
        Some(value)
    }
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
