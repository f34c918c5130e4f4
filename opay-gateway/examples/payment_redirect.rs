//! Payment Redirect Example
//!
//! Signs a payment request with a shared password and prepares the
//! auto-submitting form that sends the customer to the gateway.
//!
//! # Usage
//!
//! ```bash
//! OPAY_SIGNATURE_PASSWORD=secret cargo run --example payment_redirect
//! ```

use opay_gateway::prelude::*;

const GATEWAY_URL: &str = "https://gateway.opay.lt/pay/";

/// Minimal HTML renderer standing in for the shop's templating engine.
struct PlainHtml;

impl RedirectRenderer for PlainHtml {
    fn render(&self, form: &RedirectForm) -> String {
        let mut html = format!(
            "<html lang=\"{}\"><body onload=\"document.forms[0].submit()\">\n<form method=\"post\" action=\"{}\">\n",
            form.language(),
            escape(form.action())
        );
        for (name, value) in form.fields() {
            html.push_str(&format!(
                "  <input type=\"hidden\" name=\"{}\" value=\"{}\" />\n",
                escape(name),
                escape(value)
            ));
        }
        html.push_str("</form>\n</body></html>\n");
        html
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn main() -> Result<()> {
    let config = GatewayConfig::from_env()
        .unwrap_or_else(|| GatewayConfig::new().with_signature_password("secret"));
    let gateway = OpayGateway::new(config);

    println!("Signature type: {}", gateway.signature_type()?);

    let order = ParameterMap::new()
        .with("website_id", "WS123")
        .with("order_nr", "2024-000123")
        .with("redirect_url", "https://shop.example/return")
        .with("web_service_url", "https://shop.example/opay/callback")
        .with("standard", "opay_8.1")
        .with("language", "LIT")
        .with("amount", 12550)
        .with("currency", "EUR")
        .with("test", true);

    let signed = gateway.sign_parameters(order)?;
    for (key, value) in signed.iter() {
        println!("  {key} = {}", value.to_wire().unwrap_or_default());
    }

    let form = gateway.redirect_form(GATEWAY_URL, &signed, true);
    println!("\n{}", form.render(&PlainHtml));

    Ok(())
}
