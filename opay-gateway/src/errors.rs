//! Error types for gateway operations.
//!
//! Every failure carries one of the gateway's numbered error codes so that
//! callers can report them exactly as the remote side documents them.

use std::fmt;

/// Numbered error codes shared with the remote gateway's client libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum GatewayErrorCode {
    /// No usable signature material is configured
    SignatureParametersNotSet = 11101,
    /// RSA material is configured but asymmetric crypto is not compiled in
    AsymmetricCryptoUnavailable = 11102,
    /// Signature verification primitive failed
    CertificateVerification = 11103,
    /// Certificate could not be read or holds no usable public key
    CertificateRead = 11104,
    /// Base64 encoding of a signature failed
    SigningBase64 = 11105,
    /// Signing with the private key failed
    Signing = 11106,
    /// Private key could not be read
    PrivateKeyRead = 11107,
    /// Encoded token from the gateway is not valid base64
    TokenBase64Decode = 11108,
    /// Request could not be sent or no response was received
    CommunicationWithServer = 21101,
    /// Response body is not valid JSON
    JsonDecoding = 21102,
    /// Response JSON is not a mapping or collection
    WrongJsonFormat = 21103,
}

impl GatewayErrorCode {
    /// Numeric value of the code.
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// Error type for all gateway operations.
#[derive(Debug)]
pub enum GatewayError {
    /// No key material satisfies the requested operation.
    SignatureConfig(String),

    /// RSA key and certificate are configured, asymmetric support is missing
    /// and no password is available to fall back to.
    AsymmetricUnavailable,

    /// Merchant private key PEM could not be parsed.
    KeyRead(String),

    /// Gateway certificate PEM could not be parsed or holds no RSA key.
    CertificateRead(String),

    /// The signing primitive failed.
    Signing(String),

    /// The verification primitive failed for a reason other than a mismatch.
    Verification(String),

    /// Base64 encoding of a computed signature failed.
    Encoding(String),

    /// Encoded token could not be decoded.
    Decode(String),

    /// Request is not executable: missing scheme, no TLS capability, bad header.
    TransportConfig(String),

    /// No transport backend is able to execute the request.
    TransportUnavailable {
        /// Target URL
        url: String,
    },

    /// Every available backend failed to produce a response.
    Communication {
        /// Target URL
        url: String,
        /// Failure reported by the last backend tried
        reason: String,
    },

    /// Response body is not valid JSON.
    JsonDecode(String),

    /// Response JSON decoded but the top-level value is not a mapping or list.
    WrongJsonFormat(String),
}

impl GatewayError {
    /// Get the gateway error code.
    pub fn code(&self) -> GatewayErrorCode {
        match self {
            Self::SignatureConfig(_) => GatewayErrorCode::SignatureParametersNotSet,
            Self::AsymmetricUnavailable => GatewayErrorCode::AsymmetricCryptoUnavailable,
            Self::KeyRead(_) => GatewayErrorCode::PrivateKeyRead,
            Self::CertificateRead(_) => GatewayErrorCode::CertificateRead,
            Self::Signing(_) => GatewayErrorCode::Signing,
            Self::Verification(_) => GatewayErrorCode::CertificateVerification,
            Self::Encoding(_) => GatewayErrorCode::SigningBase64,
            Self::Decode(_) => GatewayErrorCode::TokenBase64Decode,
            Self::TransportConfig(_)
            | Self::TransportUnavailable { .. }
            | Self::Communication { .. } => GatewayErrorCode::CommunicationWithServer,
            Self::JsonDecode(_) => GatewayErrorCode::JsonDecoding,
            Self::WrongJsonFormat(_) => GatewayErrorCode::WrongJsonFormat,
        }
    }

    /// Get the error message as an owned String.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns true for every failure the gateway reports as a
    /// communication error (code 21101).
    pub fn is_communication_error(&self) -> bool {
        self.code() == GatewayErrorCode::CommunicationWithServer
    }

    /// Returns true if repeating the same call may succeed.
    ///
    /// The client never retries on its own; callers loop externally.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Communication { .. } | Self::TransportUnavailable { .. }
        )
    }

    pub(crate) fn signature_not_set() -> Self {
        Self::SignatureConfig(
            "signature parameters are not set: configure a merchant private key and gateway \
             certificate for RSA signatures, or a signature password"
                .to_string(),
        )
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignatureConfig(msg) => write!(f, "signature configuration error: {}", msg),
            Self::AsymmetricUnavailable => write!(
                f,
                "RSA signature material is configured but asymmetric crypto support is not \
                 available; enable the `rsa-signature` feature or configure a signature password"
            ),
            Self::KeyRead(msg) => write!(f, "error reading private key: {}", msg),
            Self::CertificateRead(msg) => {
                write!(
                    f,
                    "error reading certificate or extracting a public key from it: {}",
                    msg
                )
            }
            Self::Signing(msg) => write!(f, "error signing with private key: {}", msg),
            Self::Verification(msg) => write!(f, "signature verification failed: {}", msg),
            Self::Encoding(msg) => write!(f, "could not base64-encode signature: {}", msg),
            Self::Decode(msg) => write!(f, "could not decode gateway token: {}", msg),
            Self::TransportConfig(msg) => write!(f, "transport configuration error: {}", msg),
            Self::TransportUnavailable { url } => {
                write!(f, "no transport backend available for {}", url)
            }
            Self::Communication { url, reason } => {
                write!(f, "could not connect to {}: {}", url, reason)
            }
            Self::JsonDecode(msg) => write!(f, "could not decode JSON response: {}", msg),
            Self::WrongJsonFormat(msg) => write!(f, "unexpected JSON response: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonDecode(err.to_string())
    }
}
