//! Shared helpers for integration tests.

#![allow(dead_code)]

use opay_gateway::http::{HttpResponse, PreparedRequest, TransportBackend, TransportError};
use opay_gateway::{GatewayConfig, ParameterMap};

/// Merchant RSA private key (PKCS#1).
pub const MERCHANT_KEY_PEM: &str = include_str!("../fixtures/merchant_key.pem");
/// Self-signed certificate for the merchant key.
pub const MERCHANT_CERT_PEM: &str = include_str!("../fixtures/merchant_cert.pem");
/// Unrelated RSA private key (PKCS#8).
pub const OTHER_KEY_PEM: &str = include_str!("../fixtures/other_key.pem");
/// Certificate for the unrelated key.
pub const OTHER_CERT_PEM: &str = include_str!("../fixtures/other_cert.pem");

/// OpenSSL `dgst -sha1 -sign merchant_key.pem` of `amount10.00order_idA1`, base64.
pub const ORDER_RSA_SIGNATURE: &str = "nkDGrAj67KcZUY0wm0WJeFLX29OQEwuNxh95UQu6UqSviPXg195Pkny0y8jyc5qGpKHQcaVZZzynoO017h771i+xzCiYUUgtYa8Sa/pKOexKiwBWGF8oAPYqZ2lOzYU8ZPuI57LjQPIOlsKSg6TDGqI8da3AXFN/tack2ni/OSc=";

/// `md5("amount10.00order_idA1secret")`.
pub const ORDER_PASSWORD_SIGNATURE: &str = "1a3daeb417518ab569a772ca7edf1e50";

/// The order every signing test starts from.
pub fn order() -> ParameterMap {
    ParameterMap::new().with("amount", "10.00").with("order_id", "A1")
}

/// Configuration with the merchant RSA pair.
pub fn rsa_config() -> GatewayConfig {
    GatewayConfig::new()
        .with_merchant_private_key(MERCHANT_KEY_PEM)
        .with_gateway_certificate(MERCHANT_CERT_PEM)
}

/// Configuration with the shared password `secret`.
pub fn password_config() -> GatewayConfig {
    GatewayConfig::new().with_signature_password("secret")
}

/// Backend that never gets a response.
#[derive(Debug)]
pub struct RefusingBackend;

impl TransportBackend for RefusingBackend {
    fn name(&self) -> &'static str {
        "refusing"
    }

    fn supports_tls(&self) -> bool {
        true
    }

    fn execute(&self, _request: &PreparedRequest) -> Result<HttpResponse, TransportError> {
        Err(TransportError::Connect("connection refused".to_string()))
    }
}

/// An `http://127.0.0.1:<port>` URL nothing listens on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/ws", addr)
}
