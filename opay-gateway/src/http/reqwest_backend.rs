//! Primary backend built on the blocking reqwest client (rustls TLS).

use std::time::Duration;

use reqwest::blocking::Client;

use super::backend::{TransportBackend, TransportError};
use super::{HttpMethod, HttpResponse, PreparedRequest};

/// Pooled, TLS-capable HTTP backend.
#[derive(Debug)]
pub struct ReqwestBackend {
    client: Client,
    connect_timeout: Duration,
}

impl ReqwestBackend {
    /// Build the backend. Fails if the TLS stack cannot be initialized.
    pub fn new(connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            // a redirect is the response, not something to replay
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| TransportError::Unsupported(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            connect_timeout,
        })
    }

    fn map_reqwest_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.connect_timeout)
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Protocol(e.to_string())
        }
    }
}

impl TransportBackend for ReqwestBackend {
    fn name(&self) -> &'static str {
        "reqwest"
    }

    fn supports_tls(&self) -> bool {
        true
    }

    fn execute(&self, request: &PreparedRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method() {
            HttpMethod::Get => self.client.get(request.url().as_str()),
            HttpMethod::Post => self
                .client
                .post(request.url().as_str())
                .body(request.body().to_vec()),
        };

        for (name, value) in request.headers() {
            // hyper derives the length from the body
            if name.eq_ignore_ascii_case("content-length") {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().map_err(|e| self.map_reqwest_error(e))?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(|e| self.map_reqwest_error(e))?;

        Ok(HttpResponse::new(status, body.to_vec(), self.name()))
    }
}
