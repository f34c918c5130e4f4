//! Shared-secret signatures.
//!
//! The signature is the lowercase hex MD5 of the canonical string followed
//! by the password. This is the gateway's legacy scheme and is reproduced
//! bit for bit.

use subtle::ConstantTimeEq;

/// Sign `canonical` with `password`.
///
/// ```
/// use opay_gateway::signature::password;
///
/// let sig = password::sign("amount10.00order_idA1", "secret");
/// assert_eq!(sig, "1a3daeb417518ab569a772ca7edf1e50");
/// ```
pub fn sign(canonical: &str, password: &str) -> String {
    let mut input = Vec::with_capacity(canonical.len() + password.len());
    input.extend_from_slice(canonical.as_bytes());
    input.extend_from_slice(password.as_bytes());
    format!("{:x}", md5::compute(&input))
}

/// Recompute the signature and compare it with `signature` in constant time.
pub fn verify(canonical: &str, signature: &str, password: &str) -> bool {
    let expected = sign(canonical, password);
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}
