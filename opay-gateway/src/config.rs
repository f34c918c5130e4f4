//! Gateway configuration.
//!
//! A [`GatewayConfig`] is built once, either with the `with_*` builders or by
//! deserializing it, and moved into [`crate::OpayGateway::new`]. The gateway
//! never changes its configuration afterwards.
//!
//! # Environment Variables
//!
//! [`GatewayConfig::from_env`] reads:
//! - `OPAY_MERCHANT_PRIVATE_KEY` - merchant RSA private key (PEM)
//! - `OPAY_CERTIFICATE` - gateway certificate (PEM)
//! - `OPAY_SIGNATURE_PASSWORD` - shared signature password
//! - `OPAY_SHARE_DIAGNOSTICS` - `1`/`true` to send runtime diagnostics
//! - `OPAY_CONNECT_TIMEOUT_SECS` - HTTP connect timeout in seconds

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::signature::pem::normalize_pem;

/// Signature key material. Secrets are wiped from memory on drop.
#[derive(Clone, Default, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    /// Merchant RSA private key (PEM), used to sign outgoing requests.
    #[serde(default, deserialize_with = "deserialize_pem")]
    merchant_private_key: Option<String>,

    /// Gateway certificate (PEM), used to verify callbacks.
    #[serde(default, deserialize_with = "deserialize_pem")]
    gateway_certificate: Option<String>,

    /// Shared signature password.
    #[serde(default, deserialize_with = "deserialize_password")]
    signature_password: Option<String>,
}

impl KeyMaterial {
    /// Create empty key material.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the merchant private key. The PEM is normalized.
    pub fn with_merchant_private_key(mut self, pem: impl AsRef<str>) -> Self {
        self.merchant_private_key = clean_pem(pem.as_ref());
        self
    }

    /// Set the gateway certificate. The PEM is normalized.
    pub fn with_gateway_certificate(mut self, pem: impl AsRef<str>) -> Self {
        self.gateway_certificate = clean_pem(pem.as_ref());
        self
    }

    /// Set the signature password. Surrounding whitespace is trimmed.
    pub fn with_signature_password(mut self, password: impl AsRef<str>) -> Self {
        self.signature_password = clean_password(password.as_ref());
        self
    }

    /// Normalized merchant private key, if configured.
    pub fn merchant_private_key(&self) -> Option<&str> {
        self.merchant_private_key.as_deref()
    }

    /// Normalized gateway certificate, if configured.
    pub fn gateway_certificate(&self) -> Option<&str> {
        self.gateway_certificate.as_deref()
    }

    /// Trimmed signature password, if configured.
    pub fn signature_password(&self) -> Option<&str> {
        self.signature_password.as_deref()
    }

    /// True when both halves of the RSA pair are configured.
    pub fn has_rsa_pair(&self) -> bool {
        self.merchant_private_key.is_some() && self.gateway_certificate.is_some()
    }

    /// True when nothing is configured.
    pub fn is_empty(&self) -> bool {
        self.merchant_private_key.is_none()
            && self.gateway_certificate.is_none()
            && self.signature_password.is_none()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: &Option<String>) -> &'static str {
            if value.is_some() {
                "<redacted>"
            } else {
                "<unset>"
            }
        }

        f.debug_struct("KeyMaterial")
            .field("merchant_private_key", &redact(&self.merchant_private_key))
            .field("gateway_certificate", &redact(&self.gateway_certificate))
            .field("signature_password", &redact(&self.signature_password))
            .finish()
    }
}

fn clean_pem(pem: &str) -> Option<String> {
    let normalized = normalize_pem(pem);
    (!normalized.is_empty()).then_some(normalized)
}

fn clean_password(password: &str) -> Option<String> {
    let trimmed = password.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn deserialize_pem<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|pem| clean_pem(&pem)))
}

fn deserialize_password<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|pw| clean_password(&pw)))
}

/// Settings for the HTTP client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Connect timeout per backend attempt, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Value of the `User-Agent` header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    "OPAY Client".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Complete gateway configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct GatewayConfig {
    /// Signature key material.
    #[serde(default)]
    pub keys: KeyMaterial,

    /// Attach library metadata to signed requests.
    #[serde(default = "default_true")]
    pub attach_metadata: bool,

    /// Also send runtime diagnostics in metadata. Off unless the merchant
    /// opts in.
    #[serde(default)]
    pub share_diagnostics: bool,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            keys: KeyMaterial::default(),
            attach_metadata: true,
            share_diagnostics: false,
            http: HttpConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Create a configuration with no key material.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the key material.
    pub fn with_keys(mut self, keys: KeyMaterial) -> Self {
        self.keys = keys;
        self
    }

    /// Set the merchant private key (PEM).
    pub fn with_merchant_private_key(mut self, pem: impl AsRef<str>) -> Self {
        self.keys = std::mem::take(&mut self.keys).with_merchant_private_key(pem);
        self
    }

    /// Set the gateway certificate (PEM).
    pub fn with_gateway_certificate(mut self, pem: impl AsRef<str>) -> Self {
        self.keys = std::mem::take(&mut self.keys).with_gateway_certificate(pem);
        self
    }

    /// Set the signature password.
    pub fn with_signature_password(mut self, password: impl AsRef<str>) -> Self {
        self.keys = std::mem::take(&mut self.keys).with_signature_password(password);
        self
    }

    /// Enable or disable metadata on signed requests.
    pub fn with_metadata(mut self, attach: bool) -> Self {
        self.attach_metadata = attach;
        self
    }

    /// Opt in or out of sending runtime diagnostics.
    pub fn with_share_diagnostics(mut self, share: bool) -> Self {
        self.share_diagnostics = share;
        self
    }

    /// Set the HTTP connect timeout.
    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.http.connect_timeout_secs = secs;
        self
    }

    /// Set the `User-Agent` header value.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.http.user_agent = user_agent.into();
        self
    }

    /// Load configuration from `OPAY_*` environment variables.
    ///
    /// Returns `None` when no key material variable is set.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let mut keys = KeyMaterial::new();
        if let Some(pem) = lookup("OPAY_MERCHANT_PRIVATE_KEY") {
            keys = keys.with_merchant_private_key(pem);
        }
        if let Some(pem) = lookup("OPAY_CERTIFICATE") {
            keys = keys.with_gateway_certificate(pem);
        }
        if let Some(password) = lookup("OPAY_SIGNATURE_PASSWORD") {
            keys = keys.with_signature_password(password);
        }
        if keys.is_empty() {
            return None;
        }

        let mut config = Self::new().with_keys(keys);
        if let Some(flag) = lookup("OPAY_SHARE_DIAGNOSTICS") {
            config.share_diagnostics = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(secs) = lookup("OPAY_CONNECT_TIMEOUT_SECS").and_then(|s| s.trim().parse().ok()) {
            config.http.connect_timeout_secs = secs;
        }
        Some(config)
    }
}
