use autoprefixer_bridge::params::{to_js_literal, EngineParams, MAX_SAFE_INTEGER};
use autoprefixer_bridge::runtime::{QuickJs, ScriptRuntime, ScriptSession};
use autoprefixer_bridge::Options;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::path::Path;

const SAFE: i64 = MAX_SAFE_INTEGER as i64;

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        (-SAFE..=SAFE).prop_map(|n| json!(n)),
        prop_oneof![Just(0.5f64), Just(-1.25), Just(1e21), Just(3.0e-7)].prop_map(|f| json!(f)),
        any::<String>().prop_map(Value::String),
        "[\"'\\\\\n\r\t\u{2028}\u{2029}</>a-z]{0,12}".prop_map(Value::String),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z][a-z_0-9-]{0,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn literal_evaluates_back_to_value(v in value()) {
        let mut session = QuickJs.compile("").unwrap();
        let literal = to_js_literal(&v).unwrap();
        let back = session.eval(&literal).unwrap();
        prop_assert_eq!(back, v);
    }

    #[test]
    fn params_literal_round_trips(entries in prop::collection::btree_map("[a-z][a-zA-Z_-]{0,8}", value(), 0..5)) {
        let mut options: Options = entries.into_iter().collect();
        options.insert("browsers".into(), json!(["ie 8", "> 1%"]));
        let params = EngineParams::build(&options, Path::new(".")).unwrap();

        let mut session = QuickJs.compile("").unwrap();
        let back = session.eval(&params.to_literal().unwrap()).unwrap();
        prop_assert_eq!(back, Value::Object(options));
    }
}

#[test]
fn quotes_cannot_break_out() {
    let mut session = QuickJs.compile("var hit = false;").unwrap();
    let sneaky = json!("\"}); hit = true; ({\"");
    let literal = to_js_literal(&sneaky).unwrap();
    assert_eq!(session.eval(&literal).unwrap(), sneaky);
    assert_eq!(session.eval("hit").unwrap(), json!(false));
}

#[test]
fn safe_integer_edges_round_trip() {
    let mut session = QuickJs.compile("").unwrap();
    for n in [SAFE, -SAFE, SAFE - 1] {
        let literal = to_js_literal(&json!(n)).unwrap();
        assert_eq!(session.eval(&literal).unwrap(), json!(n));
    }
    assert!(to_js_literal(&json!(SAFE + 2)).is_err());
}
