//! Redirect form preparation.
//!
//! A payment starts with the customer's browser auto-submitting a form to the
//! gateway. This module prepares everything that form needs. Producing the
//! HTML is left to a [`RedirectRenderer`] supplied by the application.

use serde::Serialize;

use crate::codec::{self, ENCODED_FIELD};
use crate::params::ParameterMap;

/// Parameter carrying the customer's language.
pub const LANGUAGE_FIELD: &str = "language";

/// Language reported when the parameters carry none.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Turns a prepared form into a page. Implemented by the application's
/// templating layer.
pub trait RedirectRenderer {
    /// Render `form` as a page that submits itself.
    fn render(&self, form: &RedirectForm) -> String;
}

impl<F> RedirectRenderer for F
where
    F: Fn(&RedirectForm) -> String,
{
    fn render(&self, form: &RedirectForm) -> String {
        self(form)
    }
}

/// Action URL and hidden fields of a self-submitting `POST` form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RedirectForm {
    action: String,
    fields: Vec<(String, String)>,
    language: String,
}

impl RedirectForm {
    /// Prepare a form posting `params` to `action`.
    ///
    /// With `send_encoded` the form has a single `encoded` field holding the
    /// token of the whole map. Otherwise every non-null entry becomes a field.
    pub fn new(action: impl Into<String>, params: &ParameterMap, send_encoded: bool) -> Self {
        let fields = if send_encoded {
            vec![(ENCODED_FIELD.to_string(), codec::encode(params).into_string())]
        } else {
            params
                .wire_pairs()
                .map(|(k, v)| (k.to_string(), v.into_owned()))
                .collect()
        };

        let language = params
            .get_str(LANGUAGE_FIELD)
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Self {
            action: action.into(),
            fields,
            language,
        }
    }

    /// Form action URL.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Hidden fields in submission order.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Lowercased `language` parameter, or `en`.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Render the form with `renderer`.
    pub fn render(&self, renderer: &dyn RedirectRenderer) -> String {
        renderer.render(self)
    }
}
