use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde_json::Value;

use crate::browserslist::{find_config, parse_config};
use crate::context::ProcessorConfig;
use crate::errors::{PrefixError, Result};
use crate::options::Options;

/// Key holding the browser query list.
pub const BROWSERS: &str = "browsers";

/// Directory used for config discovery when a call gives no `from`.
pub fn default_from(config: &ProcessorConfig) -> PathBuf {
    match &config.asset_root {
        Some(root) => root.join("app").join("assets").join("stylesheets"),
        None => PathBuf::from("."),
    }
}

/// Arguments used to construct one engine instance.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineParams {
    options: Options,
}

impl EngineParams {
    /// Start from `options` and, unless they already carry `browsers`, add the
    /// queries of the nearest browserslist config above `from`.
    ///
    /// Only the presence of the key counts: an explicit empty list still
    /// disables discovery.
    pub fn build(options: &Options, from: &Path) -> Result<Self> {
        if options.contains_key(BROWSERS) {
            return Ok(Self { options: options.clone() });
        }
        let mut options = options.clone();
        if let Some(config) = find_config(from)? {
            let queries = parse_config(&config);
            tracing::debug!(?queries, "using browserslist queries");
            options.insert(
                BROWSERS.to_string(),
                Value::Array(queries.into_iter().map(Value::String).collect()),
            );
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The browser queries, if any were given or discovered.
    pub fn browsers(&self) -> Option<Vec<&str>> {
        self.options
            .get(BROWSERS)
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(Value::as_str).collect())
    }

    /// Render as a script object literal, `{ key: value, ... }`.
    pub fn to_literal(&self) -> Result<String> {
        let body = self
            .options
            .iter()
            .map(|(key, value)| Ok(format!("{}: {}", render_key(key)?, to_js_literal(value)?)))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .join(", ");
        if body.is_empty() {
            Ok("{}".to_string())
        } else {
            Ok(format!("{{ {body} }}"))
        }
    }
}

/// Largest integer a script number holds exactly.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Fail if `value` holds something that would not evaluate back unchanged,
/// which is any integer beyond `MAX_SAFE_INTEGER` in magnitude.
pub fn check_representable(value: &Value) -> Result<()> {
    match value {
        Value::Number(n) => {
            let unsafe_int = match (n.as_u64(), n.as_i64()) {
                (Some(u), _) => u > MAX_SAFE_INTEGER,
                (None, Some(i)) => i.unsigned_abs() > MAX_SAFE_INTEGER,
                (None, None) => false,
            };
            if unsafe_int {
                return Err(PrefixError::Serialization(format!(
                    "integer {n} cannot be represented exactly by the engine"
                )));
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(check_representable),
        Value::Object(map) => map.values().try_for_each(check_representable),
        _ => Ok(()),
    }
}

/// Encode a value as a script literal that evaluates back to the same value.
///
/// JSON is used as the literal syntax; the two line separators JSON allows
/// raw inside strings are escaped so older parsers accept them too.
pub fn to_js_literal(value: &Value) -> Result<String> {
    check_representable(value)?;
    let json = serde_json::to_string(value)?;
    Ok(json.replace('\u{2028}', "\\u2028").replace('\u{2029}', "\\u2029"))
}

fn render_key(key: &str) -> Result<String> {
    if is_identifier(key) {
        Ok(key.to_string())
    } else {
        to_js_literal(&Value::String(key.to_string()))
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
