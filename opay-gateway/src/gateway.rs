//! Gateway facade.
//!
//! [`OpayGateway`] ties the pieces together: it signs outgoing parameter
//! maps, verifies signed callbacks, prepares redirect forms and calls the
//! gateway's web services. It is configured once and never mutated, so a
//! single instance can be shared across threads.

use std::sync::OnceLock;

use crate::canonical::{canonical_string, strip_signature_fields};
use crate::codec::{self, EncodedToken, ENCODED_FIELD};
use crate::config::GatewayConfig;
use crate::http::{HttpClient, HttpRequest, HttpResponse, FORM_CONTENT_TYPE};
use crate::metadata;
use crate::params::{ParamValue, ParameterMap};
use crate::redirect::RedirectForm;
use crate::signature::{self, password, select_signature_type, SignatureType, ASYMMETRIC_SUPPORTED};
use crate::webservice::WebServiceResponse;
use crate::{GatewayError, Result};

/// Per-call signing options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignOptions {
    /// Attach library metadata before signing.
    pub attach_metadata: bool,
    /// Include runtime diagnostics in the metadata.
    pub share_diagnostics: bool,
}

impl SignOptions {
    /// Options taken from a gateway configuration.
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            attach_metadata: config.attach_metadata,
            share_diagnostics: config.share_diagnostics,
        }
    }

    /// Sign the map exactly as given.
    pub fn without_metadata() -> Self {
        Self {
            attach_metadata: false,
            share_diagnostics: false,
        }
    }
}

/// Client for the OPAY payment gateway.
///
/// # Example
///
/// ```
/// use opay_gateway::{GatewayConfig, OpayGateway, ParameterMap, SignOptions};
///
/// let gateway = OpayGateway::new(GatewayConfig::new().with_signature_password("secret"));
///
/// let params = ParameterMap::new().with("amount", "10.00").with("order_id", "A1");
/// let signed = gateway.sign_parameters_with(params, SignOptions::without_metadata())?;
///
/// assert_eq!(
///     signed.get_str("password_signature"),
///     Some("1a3daeb417518ab569a772ca7edf1e50")
/// );
/// assert!(gateway.verify_signature(&signed)?);
/// # Ok::<(), opay_gateway::GatewayError>(())
/// ```
#[derive(Debug)]
pub struct OpayGateway {
    config: GatewayConfig,
    signature_type: Option<SignatureType>,
    http: OnceLock<HttpClient>,
}

impl OpayGateway {
    /// Create a gateway client. The signature type is resolved here, once.
    pub fn new(config: GatewayConfig) -> Self {
        let signature_type = select_signature_type(&config.keys, ASYMMETRIC_SUPPORTED).ok();

        #[cfg(feature = "tracing")]
        match signature_type {
            Some(kind) => tracing::debug!(signature_type = %kind, "gateway configured"),
            None => tracing::debug!("gateway configured without usable signature material"),
        }

        Self {
            config,
            signature_type,
            http: OnceLock::new(),
        }
    }

    /// Create a gateway client that sends requests through `client`.
    pub fn with_http_client(config: GatewayConfig, client: HttpClient) -> Self {
        let gateway = Self::new(config);
        let _ = gateway.http.set(client);
        gateway
    }

    /// Configuration this gateway was built with.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The active signature type.
    ///
    /// Fails with [`GatewayError::SignatureConfig`] when no material is
    /// configured, or [`GatewayError::AsymmetricUnavailable`] when only RSA
    /// material is configured and RSA support is not compiled in.
    pub fn signature_type(&self) -> Result<SignatureType> {
        match self.signature_type {
            Some(kind) => Ok(kind),
            None => Err(select_signature_type(&self.config.keys, ASYMMETRIC_SUPPORTED)
                .err()
                .unwrap_or_else(GatewayError::signature_not_set)),
        }
    }

    /// Sign `params` with the configured options.
    ///
    /// Existing signature fields are dropped, metadata is attached if enabled,
    /// and the signature is appended as the last entry.
    pub fn sign_parameters(&self, params: ParameterMap) -> Result<ParameterMap> {
        self.sign_parameters_with(params, SignOptions::from_config(&self.config))
    }

    /// Sign `params` with explicit options.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, params), fields(entries = params.len())))]
    pub fn sign_parameters_with(&self, mut params: ParameterMap, options: SignOptions) -> Result<ParameterMap> {
        strip_signature_fields(&mut params);

        if options.attach_metadata {
            metadata::enrich(&mut params, options.share_diagnostics);
        }

        let kind = self.signature_type()?;
        let canonical = canonical_string(&params);
        let signature = match kind {
            SignatureType::Rsa => {
                let key = self
                    .config
                    .keys
                    .merchant_private_key()
                    .ok_or_else(GatewayError::signature_not_set)?;
                signature::sign_rsa(&canonical, key)?
            }
            SignatureType::Password => {
                let secret = self
                    .config
                    .keys
                    .signature_password()
                    .ok_or_else(GatewayError::signature_not_set)?;
                password::sign(&canonical, secret)
            }
        };

        params.insert(kind.field_name(), signature);
        Ok(params)
    }

    /// Verify a signed map received from the gateway.
    ///
    /// An RSA signature is checked when a certificate is configured, otherwise
    /// a password signature when a password is configured. Returns `Ok(false)`
    /// on a mismatch and [`GatewayError::SignatureConfig`] when the map carries
    /// no signature this gateway can check.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, params)))]
    pub fn verify_signature(&self, params: &ParameterMap) -> Result<bool> {
        let mut params = params.clone();
        let stripped = strip_signature_fields(&mut params);
        let canonical = canonical_string(&params);

        let rsa_signature = non_empty(stripped.rsa.as_ref());
        let password_signature = non_empty(stripped.password.as_ref());
        let certificate = self.config.keys.gateway_certificate();
        let secret = self.config.keys.signature_password();

        let verified = match (rsa_signature, certificate, password_signature, secret) {
            (Some(sig), Some(cert), _, _) if ASYMMETRIC_SUPPORTED => {
                signature::verify_rsa(&canonical, &sig, cert)?
            }
            (_, _, Some(sig), Some(secret)) => password::verify(&canonical, &sig, secret),
            (Some(_), Some(_), _, _) => return Err(GatewayError::AsymmetricUnavailable),
            _ => {
                return Err(GatewayError::SignatureConfig(
                    "could not verify a signature: the parameters carry no signature matching \
                     the configured certificate or password"
                        .to_string(),
                ))
            }
        };

        #[cfg(feature = "tracing")]
        if !verified {
            tracing::warn!("signature mismatch");
        }
        Ok(verified)
    }

    /// Encode `params` into a URL-safe token.
    pub fn encode_parameters(&self, params: &ParameterMap) -> EncodedToken {
        codec::encode(params)
    }

    /// Decode a token posted by the gateway.
    pub fn decode_parameters(&self, token: &str) -> Result<ParameterMap> {
        codec::decode(token)
    }

    /// Prepare a self-submitting redirect form. `params` should already be
    /// signed.
    pub fn redirect_form(&self, url: &str, params: &ParameterMap, send_encoded: bool) -> RedirectForm {
        RedirectForm::new(url, params, send_encoded)
    }

    /// Send a raw request through the HTTP client.
    pub fn send_request(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.http_client().send(request)
    }

    /// Call a web service.
    ///
    /// With `send_encoded` the parameters travel as a single `encoded` token.
    /// The body is posted as a form; the response body is trimmed and, with
    /// `decode_json`, parsed as JSON. The HTTP status is not interpreted.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, params), fields(entries = params.len())))]
    pub fn web_service_request(
        &self,
        url: &str,
        params: &ParameterMap,
        send_encoded: bool,
        decode_json: bool,
    ) -> Result<WebServiceResponse> {
        let body = if send_encoded {
            ParameterMap::new().with(ENCODED_FIELD, codec::encode(params).into_string())
        } else {
            params.clone()
        };

        let request = HttpRequest::post(url)
            .with_params(body)
            .with_header("Content-Type", FORM_CONTENT_TYPE);
        let response = self.send_request(&request)?;

        WebServiceResponse::from_body(&response.body, decode_json)
    }

    fn http_client(&self) -> &HttpClient {
        self.http.get_or_init(|| HttpClient::new(&self.config.http))
    }
}

fn non_empty(value: Option<&ParamValue>) -> Option<String> {
    value
        .and_then(ParamValue::to_wire)
        .filter(|v| !v.is_empty())
        .map(|v| v.into_owned())
}
