//! Blocking HTTP client with backend fallback.
//!
//! Each request goes through the same steps:
//!
//! 1. the URL must carry an explicit `http` or `https` scheme;
//! 2. for `https`, at least one backend must support TLS;
//! 3. `GET` parameters are merged over the URL's own query, other methods
//!    send them as a form body;
//! 4. fixed identifying headers, the `Connection` header and any extra
//!    headers are attached, in that order;
//! 5. backends are tried in order until one returns a response.
//!
//! There is no retry beyond the fallback. Any HTTP status counts as a
//! response; only transport failures move on to the next backend.
//!
//! ## Feature Flags
//!
//! - `reqwest-backend` (default): primary TLS-capable backend.
//!   Without it only the plain-socket [`StreamBackend`] is used and `https`
//!   URLs are rejected.

mod backend;
#[cfg(feature = "reqwest-backend")]
mod reqwest_backend;
mod stream;

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::codec::{build_query, parse_query};
use crate::config::HttpConfig;
use crate::params::{ParamValue, ParameterMap};
use crate::{GatewayError, Result};

pub use backend::{TransportBackend, TransportError};
#[cfg(feature = "reqwest-backend")]
pub use reqwest_backend::ReqwestBackend;
pub use stream::StreamBackend;

/// Content type of form bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP method. Anything that is not `GET` sends its parameters as a body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Parameters go into the query string.
    Get,
    /// Parameters go into a form body.
    Post,
}

impl HttpMethod {
    /// Method name on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing request before validation.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    method: HttpMethod,
    url: String,
    params: ParameterMap,
    keep_alive: bool,
    headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Create a request.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: ParameterMap::new(),
            keep_alive: false,
            headers: Vec::new(),
        }
    }

    /// Create a `GET` request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Create a `POST` request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// Set the parameters.
    pub fn with_params(mut self, params: ParameterMap) -> Self {
        self.params = params;
        self
    }

    /// Ask the server to keep the connection open.
    pub fn with_keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Append an extra header, sent after the fixed ones.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Request method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Target URL as given.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// A validated request ready for a backend.
#[derive(Clone, Debug)]
pub struct PreparedRequest {
    method: HttpMethod,
    url: Url,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl PreparedRequest {
    /// Request method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Final URL, including the query for `GET`.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Headers in sending order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Look up a header value, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Form body; empty for `GET`.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// True for `https` URLs.
    pub fn is_tls(&self) -> bool {
        self.url.scheme() == "https"
    }
}

/// Raw response from whichever backend answered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
    /// Name of the backend that produced the response.
    pub backend: &'static str,
}

impl HttpResponse {
    /// Create a response.
    pub fn new(status: u16, body: Vec<u8>, backend: &'static str) -> Self {
        Self {
            status,
            body,
            backend,
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Blocking HTTP client trying an ordered list of backends.
pub struct HttpClient {
    backends: Vec<Box<dyn TransportBackend>>,
    user_agent: String,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.backends.iter().map(|b| b.name()).collect();
        f.debug_struct("HttpClient")
            .field("backends", &names)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl HttpClient {
    /// Create a client with the default backends: reqwest (when compiled
    /// in), then the plain-socket stream backend.
    pub fn new(config: &HttpConfig) -> Self {
        let timeout = Duration::from_secs(config.connect_timeout_secs);
        let mut backends: Vec<Box<dyn TransportBackend>> = Vec::with_capacity(2);

        #[cfg(feature = "reqwest-backend")]
        match ReqwestBackend::new(timeout) {
            Ok(backend) => backends.push(Box::new(backend)),
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("reqwest backend unavailable: {_err}");
            }
        }

        backends.push(Box::new(StreamBackend::new(timeout)));
        Self::with_backends(config, backends)
    }

    /// Create a client with an explicit backend order.
    pub fn with_backends(config: &HttpConfig, backends: Vec<Box<dyn TransportBackend>>) -> Self {
        Self {
            backends,
            user_agent: config.user_agent.clone(),
        }
    }

    /// Names of the configured backends, in preference order.
    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Validate `request` and build what the backends send.
    pub fn prepare(&self, request: &HttpRequest) -> Result<PreparedRequest> {
        let mut url = Url::parse(&request.url).map_err(|e| match e {
            url::ParseError::RelativeUrlWithoutBase => GatewayError::TransportConfig(
                "URL must contain a name of a protocol e.g. http:// or https://".to_string(),
            ),
            other => GatewayError::TransportConfig(format!("invalid URL '{}': {}", request.url, other)),
        })?;

        match url.scheme() {
            "http" => {}
            "https" => {
                if !self.backends.iter().any(|b| b.supports_tls()) {
                    return Err(GatewayError::TransportConfig(
                        "https requested but no TLS-capable backend is available".to_string(),
                    ));
                }
            }
            other => {
                return Err(GatewayError::TransportConfig(format!(
                    "unsupported URL scheme '{}'",
                    other
                )))
            }
        }

        for (name, value) in &request.headers {
            validate_header(name, value)?;
        }

        let mut headers: Vec<(String, String)> = vec![
            ("User-Agent".into(), self.user_agent.clone()),
            (
                "Accept".into(),
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".into(),
            ),
            ("Accept-Language".into(), "en-us,en;q=0.5".into()),
            // no compression support
            ("Accept-Encoding".into(), "identity".into()),
            ("Accept-Charset".into(), "utf-8;q=0.7,*;q=0.7".into()),
        ];

        let body = match request.method {
            HttpMethod::Get => {
                let mut merged = parse_query(url.query().unwrap_or_default().as_bytes());
                merged.extend(
                    request
                        .params
                        .iter()
                        .map(|(k, v)| (k.to_string(), ParamValue::clone(v))),
                );
                let query = build_query(&merged);
                url.set_fragment(None);
                url.set_query((!query.is_empty()).then_some(query.as_str()));
                Vec::new()
            }
            HttpMethod::Post => {
                let body = build_query(&request.params).into_bytes();
                headers.push(("Content-Length".into(), body.len().to_string()));
                body
            }
        };

        let connection = if request.keep_alive { "keep-alive" } else { "Close" };
        headers.push(("Connection".into(), connection.into()));
        headers.extend(request.headers.iter().cloned());

        Ok(PreparedRequest {
            method: request.method,
            url,
            headers,
            body,
        })
    }

    /// Execute `request`, falling back through the backends.
    ///
    /// Fails with [`GatewayError::TransportUnavailable`] when no backend can
    /// take the request and [`GatewayError::Communication`] when every
    /// backend that tried failed.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, request), fields(method = %request.method)))]
    pub fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let prepared = self.prepare(request)?;
        let mut last_error: Option<TransportError> = None;

        for backend in &self.backends {
            if !backend.is_available(&prepared) {
                continue;
            }
            match backend.execute(&prepared) {
                Ok(response) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(backend = backend.name(), status = response.status, "response received");
                    return Ok(response);
                }
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(backend = backend.name(), "transport attempt failed: {err}");
                    last_error = Some(err);
                }
            }
        }

        let url = redact_query(prepared.url());
        match last_error {
            Some(err) => Err(GatewayError::Communication {
                url,
                reason: err.to_string(),
            }),
            None => Err(GatewayError::TransportUnavailable { url }),
        }
    }
}

/// Reject header names and values that could inject extra header lines.
fn validate_header(name: &str, value: &str) -> Result<()> {
    let bad = |s: &str| s.contains(['\r', '\n', '\0']);
    if name.is_empty() || bad(name) || name.contains(':') {
        return Err(GatewayError::TransportConfig(format!(
            "invalid header name '{}'",
            name.escape_debug()
        )));
    }
    if bad(value) {
        return Err(GatewayError::TransportConfig(format!(
            "invalid value for header '{}': control characters not allowed",
            name
        )));
    }
    Ok(())
}

/// URL without its query, for error messages.
fn redact_query(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockBackend, MockOutcome};

    fn client_with(backends: Vec<Box<dyn TransportBackend>>) -> HttpClient {
        HttpClient::with_backends(&HttpConfig::default(), backends)
    }

    fn tls_mock(outcome: MockOutcome) -> MockBackend {
        MockBackend::new("mock", true, vec![outcome])
    }

    #[test]
    fn test_missing_scheme_rejected() {
        let client = client_with(vec![]);
        let err = client.prepare(&HttpRequest::get("gateway.example/ws")).unwrap_err();
        assert!(matches!(err, GatewayError::TransportConfig(_)));
    }

    #[test]
    fn test_malformed_url_reports_parse_error() {
        let client = client_with(vec![]);
        let err = client.prepare(&HttpRequest::get("http://bad host/")).unwrap_err();

        assert!(matches!(err, GatewayError::TransportConfig(_)));
        let message = err.to_string();
        assert!(message.contains("invalid URL"));
        assert!(!message.contains("protocol"));
    }

    #[test]
    fn test_missing_scheme_message() {
        let client = client_with(vec![]);
        let err = client.prepare(&HttpRequest::post("/ws/only-a-path")).unwrap_err();
        assert!(err.to_string().contains("name of a protocol"));
    }

    #[test]
    fn test_unknown_scheme_rejected() {
        let client = client_with(vec![]);
        let err = client.prepare(&HttpRequest::get("ftp://gateway.example/")).unwrap_err();
        assert!(matches!(err, GatewayError::TransportConfig(_)));
    }

    #[test]
    fn test_https_requires_tls_backend() {
        let client = client_with(vec![Box::new(StreamBackend::new(Duration::from_secs(1)))]);
        let err = client.prepare(&HttpRequest::post("https://gateway.example/")).unwrap_err();
        assert!(matches!(err, GatewayError::TransportConfig(_)));
        assert!(client.prepare(&HttpRequest::post("http://gateway.example/")).is_ok());
    }

    #[test]
    fn test_get_merges_query_with_params_taking_precedence() {
        let client = client_with(vec![]);
        let request = HttpRequest::get("http://gateway.example/list?lang=LIT&page=1#frag")
            .with_params(ParameterMap::new().with("page", 2).with("q", "a b"));

        let prepared = client.prepare(&request).unwrap();

        assert_eq!(
            prepared.url().as_str(),
            "http://gateway.example/list?lang=LIT&page=2&q=a+b"
        );
        assert!(prepared.body().is_empty());
        assert!(prepared.header("Content-Length").is_none());
    }

    #[test]
    fn test_post_body_and_header_order() {
        let client = client_with(vec![]);
        let request = HttpRequest::post("http://gateway.example/ws")
            .with_params(ParameterMap::new().with("encoded", "abc,,"))
            .with_keep_alive(true)
            .with_header("Content-Type", FORM_CONTENT_TYPE);

        let prepared = client.prepare(&request).unwrap();
        let names: Vec<&str> = prepared.headers().iter().map(|(n, _)| n.as_str()).collect();

        assert_eq!(prepared.body(), b"encoded=abc%2C%2C");
        assert_eq!(prepared.header("content-length"), Some("17"));
        assert_eq!(prepared.header("Connection"), Some("keep-alive"));
        assert_eq!(prepared.header("User-Agent"), Some("OPAY Client"));
        assert_eq!(
            names,
            [
                "User-Agent",
                "Accept",
                "Accept-Language",
                "Accept-Encoding",
                "Accept-Charset",
                "Content-Length",
                "Connection",
                "Content-Type"
            ]
        );
    }

    #[test]
    fn test_connection_close_by_default() {
        let client = client_with(vec![]);
        let prepared = client.prepare(&HttpRequest::get("http://a.example/")).unwrap();
        assert_eq!(prepared.header("Connection"), Some("Close"));
    }

    #[test]
    fn test_header_injection_rejected() {
        let client = client_with(vec![]);
        let request = HttpRequest::post("http://a.example/").with_header("X-Evil", "a\r\nHost: b");
        assert!(matches!(
            client.prepare(&request).unwrap_err(),
            GatewayError::TransportConfig(_)
        ));
    }

    #[test]
    fn test_falls_back_to_secondary_backend() {
        let primary = tls_mock(MockOutcome::Fail);
        let secondary = tls_mock(MockOutcome::Respond(200, b"ok".to_vec()));
        let (primary_calls, secondary_calls) = (primary.calls(), secondary.calls());
        let client = client_with(vec![Box::new(primary), Box::new(secondary)]);

        let response = client.send(&HttpRequest::post("https://gateway.example/ws")).unwrap();

        assert_eq!(response.body, b"ok");
        assert_eq!(primary_calls.count(), 1);
        assert_eq!(secondary_calls.count(), 1);
    }

    #[test]
    fn test_unavailable_primary_is_skipped() {
        let primary = MockBackend::new("primary", true, vec![MockOutcome::Respond(200, b"wrong".to_vec())])
            .unavailable();
        let secondary = tls_mock(MockOutcome::Respond(200, b"ok".to_vec()));
        let (primary_calls, secondary_calls) = (primary.calls(), secondary.calls());
        let client = client_with(vec![Box::new(primary), Box::new(secondary)]);

        let response = client.send(&HttpRequest::post("https://gateway.example/ws")).unwrap();

        assert_eq!(response.body, b"ok");
        assert_eq!(primary_calls.count(), 0);
        assert_eq!(secondary_calls.count(), 1);
    }

    #[test]
    fn test_primary_success_skips_secondary() {
        let primary = tls_mock(MockOutcome::Respond(404, b"missing".to_vec()));
        let secondary = tls_mock(MockOutcome::Respond(200, b"ok".to_vec()));
        let secondary_calls = secondary.calls();
        let client = client_with(vec![Box::new(primary), Box::new(secondary)]);

        let response = client.send(&HttpRequest::get("https://gateway.example/")).unwrap();

        assert_eq!(response.status, 404);
        assert!(!response.is_success());
        assert_eq!(secondary_calls.count(), 0);
    }

    #[test]
    fn test_all_backends_failing_is_communication_error() {
        let client = client_with(vec![
            Box::new(tls_mock(MockOutcome::Fail)),
            Box::new(tls_mock(MockOutcome::Fail)),
        ]);
        let err = client
            .send(&HttpRequest::get("https://gateway.example/?secret=1"))
            .unwrap_err();

        assert!(matches!(err, GatewayError::Communication { .. }));
        assert!(!err.to_string().contains("secret"));
    }

    #[test]
    fn test_no_available_backend() {
        let unavailable = MockBackend::new("down", false, vec![]).unavailable();
        let client = client_with(vec![Box::new(unavailable)]);

        let err = client.send(&HttpRequest::get("http://gateway.example/")).unwrap_err();
        assert!(matches!(err, GatewayError::TransportUnavailable { .. }));
        assert!(err.is_communication_error());
    }

    #[test]
    fn test_default_backend_order() {
        let client = HttpClient::new(&HttpConfig::default());
        let names = client.backend_names();
        assert_eq!(names.last(), Some(&"stream"));
        #[cfg(feature = "reqwest-backend")]
        assert_eq!(names, ["reqwest", "stream"]);
    }
}
