//! Form-urlencoded query strings.
//!
//! Output matches the gateway's `application/x-www-form-urlencoded` rules:
//! space becomes `+`, only ASCII alphanumerics and `-_.` stay literal.

use url::form_urlencoded;

use crate::params::ParameterMap;

/// Percent-encode one key or value.
pub(crate) fn encode_component(input: &str, out: &mut String) {
    for chunk in form_urlencoded::byte_serialize(input.as_bytes()) {
        // byte_serialize leaves `*` literal, the gateway expects it escaped
        if chunk.contains('*') {
            out.push_str(&chunk.replace('*', "%2A"));
        } else {
            out.push_str(chunk);
        }
    }
}

/// Render `params` as `k1=v1&k2=v2`, skipping `Null` entries.
///
/// ```
/// use opay_gateway::{codec::query::build_query, ParameterMap};
///
/// let params = ParameterMap::new().with("description", "Hello world & co").with("n", 5);
/// assert_eq!(build_query(&params), "description=Hello+world+%26+co&n=5");
/// ```
pub fn build_query(params: &ParameterMap) -> String {
    let mut out = String::new();
    for (key, value) in params.wire_pairs() {
        if !out.is_empty() {
            out.push('&');
        }
        encode_component(key, &mut out);
        out.push('=');
        encode_component(&value, &mut out);
    }
    out
}

/// Parse a form-urlencoded query into an ordered map of text values.
///
/// Repeated keys keep their first position and take the last value. Pairs
/// with an empty key are skipped and invalid UTF-8 is replaced.
pub fn parse_query(input: &[u8]) -> ParameterMap {
    let mut params = ParameterMap::new();
    for (key, value) in form_urlencoded::parse(input) {
        if key.is_empty() {
            continue;
        }
        params.insert(key.into_owned(), value.into_owned());
    }
    params
}
