//! Library metadata attached to signed requests.
//!
//! The gateway accepts a `metadata` parameter holding a JSON object. Before
//! signing, the library adds its own version to it and, only when the
//! merchant opted in, the version of the compiler that built it. Enrichment is
//! best-effort: whenever the existing value cannot be enriched the map is
//! left exactly as it was.

use serde_json::{Map, Value};

use crate::params::{ParamValue, ParameterMap};

/// Name of the metadata parameter.
pub const METADATA_FIELD: &str = "metadata";

/// Key holding this library's version.
pub const LIBRARY_VERSION_KEY: &str = "rust_library_version";

/// Key holding the compiler version, sent only with diagnostics enabled.
pub const RUNTIME_KEY: &str = "rust_version";

/// Caller-provided application version, dropped unless diagnostics are shared.
pub const APP_VERSION_KEY: &str = "app_version";

/// Enrich the `metadata` entry of `params`.
///
/// - no entry: a new one is appended;
/// - a string holding a JSON object: the object is enriched and written back
///   in place;
/// - anything else: left untouched.
///
/// Returns `true` if the map was changed.
pub fn enrich(params: &mut ParameterMap, share_diagnostics: bool) -> bool {
    let mut object = match params.get(METADATA_FIELD) {
        None | Some(ParamValue::Null) => Map::new(),
        Some(ParamValue::Str(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(object)) => object,
            _ => {
                #[cfg(feature = "tracing")]
                tracing::debug!("metadata is not a JSON object, leaving it untouched");
                return false;
            }
        },
        Some(_) => return false,
    };

    object.insert(
        LIBRARY_VERSION_KEY.to_string(),
        Value::String(crate::LIB_VERSION.to_string()),
    );

    if share_diagnostics {
        if let Some(runtime) = runtime_description() {
            object.insert(RUNTIME_KEY.to_string(), Value::String(runtime));
        }
    } else {
        object.remove(APP_VERSION_KEY);
    }

    match serde_json::to_string(&Value::Object(object)) {
        Ok(json) => {
            params.insert(METADATA_FIELD, json);
            true
        }
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!("failed to serialize metadata: {_err}");
            false
        }
    }
}

/// Version of the `rustc` that compiled the crate, captured by the build
/// script. `None` when it could not be determined or looks implausible.
fn runtime_description() -> Option<String> {
    version_within_bounds(option_env!("OPAY_RUSTC_VERSION")?)
}

fn version_within_bounds(version: &str) -> Option<String> {
    let version = version.trim();
    (3..=20).contains(&version.len()).then(|| version.to_string())
}
