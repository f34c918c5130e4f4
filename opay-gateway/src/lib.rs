//! OPAY gateway client library.
//!
//! Produces and checks the signed, encoded parameter maps the OPAY payment
//! gateway exchanges with merchants, and calls its web services over HTTP.
//! Output has to match the gateway byte for byte, so canonicalization and the
//! token format are fixed and not configurable.
//!
//! # Features
//!
//! - **Signing**: RSA-SHA1 with the merchant key, or an MD5 keyed digest with a
//!   shared password, selected from the configured material
//! - **Callback verification**: strip, canonicalize and check the signature of
//!   maps posted back by the gateway
//! - **Transport codec**: form query, base64 and `+/=` to `-_,` substitution
//! - **Web services**: blocking HTTP with a primary and a fallback backend
//!
//! # Example
//!
//! ```
//! use opay_gateway::{GatewayConfig, OpayGateway, ParameterMap};
//!
//! let gateway = OpayGateway::new(GatewayConfig::new().with_signature_password("secret"));
//!
//! let params = ParameterMap::new()
//!     .with("website_id", "WS123")
//!     .with("order_nr", "A1")
//!     .with("amount", 1000)
//!     .with("test", true);
//! let signed = gateway.sign_parameters(params)?;
//!
//! let form = gateway.redirect_form("https://gateway.opay.lt/pay/", &signed, true);
//! assert_eq!(form.fields().len(), 1);
//!
//! // the gateway posts the same token format back
//! let token = gateway.encode_parameters(&signed);
//! let received = gateway.decode_parameters(token.as_str())?;
//! assert!(gateway.verify_signature(&received)?);
//! # Ok::<(), opay_gateway::GatewayError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `rsa-signature` (default): RSA-SHA1 signatures
//! - `reqwest-backend` (default): TLS-capable primary HTTP backend
//! - `tracing`: spans and events through the `tracing` crate
//! - `test-utils`: fixtures and a scripted transport backend

pub mod canonical;
pub mod codec;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod http;
pub mod metadata;
pub mod params;
pub mod prelude;
pub mod redirect;
pub mod signature;
pub mod webservice;

/// Test utilities for gateway integrations.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use codec::EncodedToken;
pub use config::{GatewayConfig, HttpConfig, KeyMaterial};
pub use errors::{GatewayError, GatewayErrorCode};
pub use gateway::{OpayGateway, SignOptions};
pub use params::{ParamValue, ParameterMap};
pub use redirect::{RedirectForm, RedirectRenderer};
pub use signature::SignatureType;
pub use webservice::{WebServiceErrorRecord, WebServiceResponse};

/// Common result alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Version of this library, reported to the gateway in request metadata.
pub const LIB_VERSION: &str = env!("CARGO_PKG_VERSION");
