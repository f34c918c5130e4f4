//! Prelude module for convenient imports.
//!
//! ```rust
//! use opay_gateway::prelude::*;
//! ```
//!
//! ## What's Included
//!
//! - Facade: `OpayGateway`, `SignOptions`
//! - Configuration: `GatewayConfig`, `KeyMaterial`, `HttpConfig`
//! - Data: `ParameterMap`, `ParamValue`, `EncodedToken`, `SignatureType`
//! - Error types: `GatewayError`, `GatewayErrorCode`, `Result`
//! - Redirects and web services: `RedirectForm`, `RedirectRenderer`,
//!   `WebServiceResponse`, `WebServiceErrorRecord`

// Facade
pub use crate::gateway::{OpayGateway, SignOptions};

// Configuration
pub use crate::config::{GatewayConfig, HttpConfig, KeyMaterial};

// Data
pub use crate::codec::EncodedToken;
pub use crate::params::{ParamValue, ParameterMap};
pub use crate::signature::SignatureType;

// Error handling
pub use crate::errors::{GatewayError, GatewayErrorCode};
pub use crate::Result;

// Redirects and web services
pub use crate::redirect::{RedirectForm, RedirectRenderer};
pub use crate::webservice::{WebServiceErrorRecord, WebServiceResponse};

// HTTP
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse};
