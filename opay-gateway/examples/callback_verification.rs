//! Callback Verification Example
//!
//! Plays both sides of a gateway callback: a "gateway" signs an encoded
//! status report with its key, and the merchant decodes and verifies it
//! against the gateway certificate.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example callback_verification
//! ```

use opay_gateway::prelude::*;

const GATEWAY_KEY_PEM: &str = include_str!("../tests/fixtures/merchant_key.pem");
const GATEWAY_CERT_PEM: &str = include_str!("../tests/fixtures/merchant_cert.pem");

fn main() -> Result<()> {
    // gateway side
    let gateway_signer = OpayGateway::new(
        GatewayConfig::new()
            .with_merchant_private_key(GATEWAY_KEY_PEM)
            .with_gateway_certificate(GATEWAY_CERT_PEM),
    );
    let report = ParameterMap::new()
        .with("status", "1")
        .with("order_nr", "2024-000123")
        .with("p_amount", "12550")
        .with("p_currency", "EUR");
    let signed = gateway_signer.sign_parameters_with(report, SignOptions::without_metadata())?;
    let posted = gateway_signer.encode_parameters(&signed);
    println!("POST encoded={posted}\n");

    // merchant side
    let merchant = OpayGateway::new(GatewayConfig::new().with_gateway_certificate(GATEWAY_CERT_PEM));
    let received = merchant.decode_parameters(posted.as_str())?;

    if merchant.verify_signature(&received)? {
        println!(
            "Verified callback: order {} status {}",
            received.get_str("order_nr").unwrap_or("?"),
            received.get_str("status").unwrap_or("?")
        );
    } else {
        println!("Signature mismatch, ignoring callback");
    }

    let mut forged = received.clone();
    forged.insert("p_amount", "1");
    println!("Forged amount verifies: {}", merchant.verify_signature(&forged)?);

    Ok(())
}
