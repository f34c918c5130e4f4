//! Fixed key material.
//!
//! Both pairs are 1024-bit throwaway keys. The merchant key is PKCS#1, the
//! other key PKCS#8, so both parsers get exercised.

/// Merchant RSA private key (PKCS#1).
pub const MERCHANT_KEY_PEM: &str = include_str!("../../tests/fixtures/merchant_key.pem");

/// Self-signed certificate for [`MERCHANT_KEY_PEM`].
pub const MERCHANT_CERT_PEM: &str = include_str!("../../tests/fixtures/merchant_cert.pem");

/// Unrelated RSA private key (PKCS#8).
pub const OTHER_KEY_PEM: &str = include_str!("../../tests/fixtures/other_key.pem");

/// Self-signed certificate for [`OTHER_KEY_PEM`].
pub const OTHER_CERT_PEM: &str = include_str!("../../tests/fixtures/other_cert.pem");
