//! Test utilities for OPAY gateway integrations.
//!
//! Available in test builds and with the `test-utils` feature.
//!
//! - PEM fixtures for a merchant key pair and an unrelated key pair
//! - A scripted [`MockBackend`] for exercising the HTTP fallback without a
//!   network
//!
//! ## Usage
//!
//! ```rust,ignore
//! use opay_gateway::test_utils::{MockBackend, MockOutcome};
//! use opay_gateway::http::HttpClient;
//!
//! let primary = MockBackend::new("primary", true, vec![MockOutcome::Fail]);
//! let secondary = MockBackend::new("secondary", true, vec![MockOutcome::Respond(200, b"{}".to_vec())]);
//! let client = HttpClient::with_backends(&Default::default(), vec![Box::new(primary), Box::new(secondary)]);
//! ```

mod fixtures;
mod mock_backend;

pub use fixtures::{MERCHANT_CERT_PEM, MERCHANT_KEY_PEM, OTHER_CERT_PEM, OTHER_KEY_PEM};
pub use mock_backend::{CallLog, MockBackend, MockOutcome};
