//! RSA-SHA1 (PKCS#1 v1.5) signatures.
//!
//! The merchant signs with its private key; the gateway's callbacks are
//! verified against the public key in the gateway's X.509 certificate.
//! Signatures travel base64-encoded on a single line.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use x509_cert::der::{DecodePem, Encode};
use x509_cert::Certificate;

use super::pem::pem_label;
use crate::{GatewayError, Result};

/// Parse a merchant private key in PKCS#1 or PKCS#8 PEM form.
pub fn parse_private_key(pem: &str) -> Result<RsaPrivateKey> {
    match pem_label(pem) {
        Some("RSA PRIVATE KEY") => RsaPrivateKey::from_pkcs1_pem(pem)
            .map_err(|e| GatewayError::KeyRead(format!("invalid PKCS#1 key: {}", e))),
        Some("PRIVATE KEY") => RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|e| GatewayError::KeyRead(format!("invalid PKCS#8 key: {}", e))),
        Some(other) => Err(GatewayError::KeyRead(format!(
            "unsupported PEM block '{}'",
            other
        ))),
        None => Err(GatewayError::KeyRead("input is not PEM encoded".to_string())),
    }
}

/// Extract the RSA public key from a certificate or public key PEM.
pub fn parse_public_key(pem: &str) -> Result<RsaPublicKey> {
    match pem_label(pem) {
        Some("CERTIFICATE") => {
            let cert = Certificate::from_pem(pem.as_bytes())
                .map_err(|e| GatewayError::CertificateRead(format!("invalid certificate: {}", e)))?;
            let spki = cert
                .tbs_certificate
                .subject_public_key_info
                .to_der()
                .map_err(|e| GatewayError::CertificateRead(e.to_string()))?;
            RsaPublicKey::from_public_key_der(&spki).map_err(|e| {
                GatewayError::CertificateRead(format!("certificate holds no RSA key: {}", e))
            })
        }
        Some("PUBLIC KEY") => RsaPublicKey::from_public_key_pem(pem)
            .map_err(|e| GatewayError::CertificateRead(format!("invalid public key: {}", e))),
        Some("RSA PUBLIC KEY") => RsaPublicKey::from_pkcs1_pem(pem)
            .map_err(|e| GatewayError::CertificateRead(format!("invalid PKCS#1 key: {}", e))),
        Some(other) => Err(GatewayError::CertificateRead(format!(
            "unsupported PEM block '{}'",
            other
        ))),
        None => Err(GatewayError::CertificateRead(
            "input is not PEM encoded".to_string(),
        )),
    }
}

/// Sign `canonical` with the PEM private key, returning single-line base64.
pub fn sign(canonical: &str, private_key_pem: &str) -> Result<String> {
    let key = parse_private_key(private_key_pem)?;
    let signing_key = SigningKey::<Sha1>::new(key);
    let signature = signing_key
        .try_sign(canonical.as_bytes())
        .map_err(|e| GatewayError::Signing(e.to_string()))?;

    let encoded: String = STANDARD
        .encode(signature.to_bytes())
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\t'))
        .collect();
    if encoded.is_empty() {
        return Err(GatewayError::Encoding("signature is empty".to_string()));
    }
    Ok(encoded)
}

/// Verify a base64 signature over `canonical` against a certificate PEM.
///
/// Returns `Ok(false)` for a well-formed signature that does not match.
/// Signatures that are not base64 at all fail with
/// [`GatewayError::Verification`].
pub fn verify(canonical: &str, signature_b64: &str, certificate_pem: &str) -> Result<bool> {
    let public_key = parse_public_key(certificate_pem)?;

    let compact: String = signature_b64
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let raw = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| GatewayError::Verification(format!("signature is not base64: {}", e)))?;

    let Ok(signature) = Signature::try_from(raw.as_slice()) else {
        return Ok(false);
    };
    let verifying_key = VerifyingKey::<Sha1>::new(public_key);
    Ok(verifying_key.verify(canonical.as_bytes(), &signature).is_ok())
}
