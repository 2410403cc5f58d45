use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{PrefixError, Result};

/// Option mapping as handed over by the caller: keys are names, values are
/// scalars, arrays or nested mappings.
pub type Options = Map<String, Value>;

/// Rewrite `snake_case` into `camelCase`.
///
/// Each underscore followed by a word character is dropped and that
/// character upper-cased; `__` collapses to nothing and a trailing `_` stays.
pub fn camelize(key: &str) -> String {
    if !key.contains('_') {
        return key.to_string();
    }
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '_' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('_') => {
                chars.next();
            }
            Some(next) if next.is_ascii_alphanumeric() => {
                chars.next();
                out.push(next.to_ascii_uppercase());
            }
            _ => out.push(c),
        }
    }
    out
}

/// Translate every key of `options`, recursing into nested mappings.
/// The input is left as it was.
pub fn translate(options: &Options) -> Options {
    options
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Object(nested) => Value::Object(translate(nested)),
                other => other.clone(),
            };
            (camelize(key), value)
        })
        .collect()
}

/// Turn any serializable value into an option mapping.
pub fn options_from<T: Serialize>(value: &T) -> Result<Options> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Options::new()),
        other => Err(PrefixError::Serialization(format!(
            "options must be a mapping, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn obj(v: Value) -> Options {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn camelize_rules() {
        assert_eq!(camelize("foo_bar"), "fooBar");
        assert_eq!(camelize("foo_bar_baz"), "fooBarBaz");
        assert_eq!(camelize("from"), "from");
        assert_eq!(camelize("a_1"), "a1");
        assert_eq!(camelize("a___b"), "aB");
        assert_eq!(camelize("trailing_"), "trailing_");
        assert_eq!(camelize("foo_Bar"), "fooBar");
    }

    #[test]
    fn translate_nested() {
        let input = obj(json!({"a_b": {"c_d": 1}, "list_val": [{"x_y": 1}], "flag": true}));
        let out = translate(&input);
        assert_eq!(
            Value::Object(out),
            json!({"aB": {"cD": 1}, "listVal": [{"x_y": 1}], "flag": true})
        );
        // input untouched
        assert!(input.contains_key("a_b"));
    }

    #[test]
    fn options_from_struct() {
        #[derive(Serialize)]
        struct Opts {
            remove: bool,
            flexbox_mode: &'static str,
        }
        let map = options_from(&Opts { remove: false, flexbox_mode: "no-2009" }).unwrap();
        assert_eq!(map.get("flexbox_mode"), Some(&json!("no-2009")));
    }

    #[test]
    fn options_from_rejects_scalars() {
        assert!(matches!(options_from(&3), Err(PrefixError::Serialization(_))));
    }
}
