//! Transport codec between parameter maps and URL-safe encoded tokens.
//!
//! A token is the form-urlencoded query of the map, base64-encoded, with
//! `+` `/` `=` replaced by `-` `_` `,`. The gateway posts callbacks in the same
//! format under a single `encoded` field.
//!
//! # Example
//!
//! ```
//! use opay_gateway::{codec, ParameterMap};
//!
//! let params = ParameterMap::new().with("order_nr", "A1").with("amount", "10.00");
//! let token = codec::encode(&params);
//! let decoded = codec::decode(token.as_str())?;
//!
//! assert_eq!(decoded, params);
//! # Ok::<(), opay_gateway::GatewayError>(())
//! ```

pub mod query;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;

use crate::params::ParameterMap;
use crate::{GatewayError, Result};

pub use query::{build_query, parse_query};

/// Name of the single form field carrying an encoded token.
pub const ENCODED_FIELD: &str = "encoded";

/// Decoder that accepts tokens with or without padding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// URL-safe single-string representation of a parameter map.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct EncodedToken(String);

impl EncodedToken {
    /// Wrap an already encoded token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the token.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for EncodedToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EncodedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encode `params` into a token. `Null` entries are dropped.
pub fn encode(params: &ParameterMap) -> EncodedToken {
    let raw = STANDARD.encode(build_query(params));
    let token = raw
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            '=' => ',',
            other => other,
        })
        .collect();
    EncodedToken(token)
}

/// Decode a token back into an ordered map of text values.
///
/// Embedded whitespace is ignored. Fails with [`GatewayError::Decode`] when
/// the token is not valid base64 after character substitution.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(token), fields(token_len = token.len())))]
pub fn decode(token: &str) -> Result<ParameterMap> {
    let restored: String = token
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            ',' => '=',
            other => other,
        })
        .collect();

    let bytes = LENIENT
        .decode(restored.as_bytes())
        .map_err(|e| GatewayError::Decode(format!("base64 decoding error: {}", e)))?;

    Ok(parse_query(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;

    #[test]
    fn test_encode_known_vector() {
        let params = ParameterMap::new()
            .with("amount", "10.00")
            .with("order_id", "A1")
            .with("description", "Hello world & co");

        assert_eq!(
            encode(&params).as_str(),
            "YW1vdW50PTEwLjAwJm9yZGVyX2lkPUExJmRlc2NyaXB0aW9uPUhlbGxvK3dvcmxkKyUyNitjbw,,"
        );
    }

    #[test]
    fn test_decode_substituted_characters() {
        // base64 of "k=v~>?" is "az12fj4/"
        let params = decode("az12fj4_").unwrap();
        assert_eq!(params.get_str("k"), Some("v~>?"));
    }

    #[test]
    fn test_decode_ignores_whitespace_and_missing_padding() {
        let params = decode(" YW1vdW50PTEw\nLjAw ").unwrap();
        assert_eq!(params.get_str("amount"), Some("10.00"));

        let unpadded = decode("YT0x").unwrap();
        assert_eq!(unpadded.get_str("a"), Some("1"));
    }

    #[test]
    fn test_decode_rejects_malformed_token() {
        let err = decode("not*valid!base64").unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
        assert_eq!(err.code().as_u32(), 11108);
    }

    #[test]
    fn test_encode_drops_null_and_normalizes_bool() {
        let params = ParameterMap::new()
            .with("a", Option::<&str>::None)
            .with("test", true);
        let decoded = decode(encode(&params).as_str()).unwrap();

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get("test"), Some(&ParamValue::from("1")));
    }

    #[test]
    fn test_empty_map() {
        let token = encode(&ParameterMap::new());
        assert_eq!(token.as_str(), "");
        assert!(decode(token.as_str()).unwrap().is_empty());
    }
}
