//! Canonical string construction for signing and verification.
//!
//! The canonical string is every `key` immediately followed by its wire value,
//! concatenated in map order with no separators. The gateway builds the same
//! string on its side, so any deviation here breaks every signature.

use crate::params::{ParamValue, ParameterMap};

/// Field holding an RSA-SHA1 signature (base64, single line).
pub const RSA_SIGNATURE_FIELD: &str = "rsa_signature";

/// Field holding a password signature (32 lowercase hex characters).
pub const PASSWORD_SIGNATURE_FIELD: &str = "password_signature";

/// Signature values removed from a map by [`strip_signature_fields`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StrippedSignatures {
    /// Value of `rsa_signature`, if present.
    pub rsa: Option<ParamValue>,
    /// Value of `password_signature`, if present.
    pub password: Option<ParamValue>,
}

/// Remove both signature fields, returning what was there.
pub fn strip_signature_fields(params: &mut ParameterMap) -> StrippedSignatures {
    StrippedSignatures {
        rsa: params.remove(RSA_SIGNATURE_FIELD),
        password: params.remove(PASSWORD_SIGNATURE_FIELD),
    }
}

/// Build the canonical string of `params`.
///
/// `Null` entries are skipped and booleans become `1` / `0`. Signature fields
/// are expected to be stripped by the caller beforehand.
///
/// ```
/// use opay_gateway::{canonical::canonical_string, ParameterMap};
///
/// let params = ParameterMap::new()
///     .with("a", Option::<&str>::None)
///     .with("b", true);
/// assert_eq!(canonical_string(&params), "b1");
/// ```
pub fn canonical_string(params: &ParameterMap) -> String {
    let mut out = String::new();
    for (key, value) in params.wire_pairs() {
        out.push_str(key);
        out.push_str(&value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenates_in_map_order() {
        let params = ParameterMap::new()
            .with("order_id", "A1")
            .with("amount", "10.00");
        assert_eq!(canonical_string(&params), "order_idA1amount10.00");
    }

    #[test]
    fn test_null_entry_is_invisible() {
        let with_null = ParameterMap::new()
            .with("a", Option::<String>::None)
            .with("b", true);
        let without = ParameterMap::new().with("b", true);
        assert_eq!(canonical_string(&with_null), canonical_string(&without));
        assert_eq!(canonical_string(&without), "b1");
    }

    #[test]
    fn test_numbers_and_booleans() {
        let params = ParameterMap::new()
            .with("amount", 1500)
            .with("neg", -3)
            .with("test", false);
        assert_eq!(canonical_string(&params), "amount1500neg-3test0");
    }

    #[test]
    fn test_empty_value_keeps_key() {
        let params = ParameterMap::new().with("note", "").with("x", "y");
        assert_eq!(canonical_string(&params), "notexy");
    }

    #[test]
    fn test_strip_signature_fields() {
        let mut params = ParameterMap::new()
            .with("a", "1")
            .with(RSA_SIGNATURE_FIELD, "sig")
            .with("b", "2")
            .with(PASSWORD_SIGNATURE_FIELD, "abc");

        let stripped = strip_signature_fields(&mut params);

        assert_eq!(stripped.rsa, Some(ParamValue::from("sig")));
        assert_eq!(stripped.password, Some(ParamValue::from("abc")));
        assert_eq!(canonical_string(&params), "a1b2");
    }
}
