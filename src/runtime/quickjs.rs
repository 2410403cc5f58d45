//! QuickJS backend via `rquickjs`.

use rquickjs::{CatchResultExt, CaughtError, Context, Runtime};
use serde_json::Value;

use super::{ScriptError, ScriptResult, ScriptRuntime, ScriptSession};
use crate::params::to_js_literal;

/// In-process QuickJS interpreter.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickJs;

impl ScriptRuntime for QuickJs {
    fn name(&self) -> &'static str {
        "quickjs"
    }

    fn compile(&self, source: &str) -> ScriptResult<Box<dyn ScriptSession>> {
        let runtime = Runtime::new().map_err(|e| ScriptError::new(e.to_string()))?;
        let context = Context::full(&runtime).map_err(|e| ScriptError::new(e.to_string()))?;
        let session = QuickJsSession { context, _runtime: runtime };
        session.exec_source(source)?;
        Ok(Box::new(session))
    }
}

struct QuickJsSession {
    context: Context,
    _runtime: Runtime,
}

impl QuickJsSession {
    fn exec_source(&self, code: &str) -> ScriptResult<()> {
        self.context.with(|ctx| {
            ctx.eval::<(), _>(code)
                .catch(&ctx)
                .map_err(|err| ScriptError(caught_message(err)))
        })
    }

    // Results are stringified on the script side and decoded here.
    fn eval_json(&self, expr: &str) -> ScriptResult<Value> {
        let script = format!(
            "(function () {{ var r = ({expr}); var j = r === undefined ? undefined : JSON.stringify(r); return j === undefined ? 'null' : j; }})()"
        );
        let text = self.context.with(|ctx| {
            ctx.eval::<String, _>(script)
                .catch(&ctx)
                .map_err(|err| ScriptError(caught_message(err)))
        })?;
        serde_json::from_str(&text)
            .map_err(|e| ScriptError::new(format!("cannot decode script result: {e}")))
    }
}

impl ScriptSession for QuickJsSession {
    fn exec(&mut self, code: &str) -> ScriptResult<()> {
        self.exec_source(code)
    }

    fn eval(&mut self, expr: &str) -> ScriptResult<Value> {
        self.eval_json(expr)
    }

    fn call(&mut self, name: &str, args: &[Value]) -> ScriptResult<Value> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
            return Err(ScriptError::new(format!("invalid function name `{name}`")));
        }
        let args = args
            .iter()
            .map(|arg| to_js_literal(arg).map_err(|e| ScriptError::new(e.to_string())))
            .collect::<ScriptResult<Vec<_>>>()?;
        self.eval_json(&format!("{name}({})", args.join(", ")))
    }
}

fn caught_message(err: CaughtError<'_>) -> String {
    match err {
        CaughtError::Exception(ex) => ex
            .message()
            .unwrap_or_else(|| "uncaught exception".to_string()),
        CaughtError::Value(value) => value
            .as_string()
            .and_then(|s| s.to_string().ok())
            .unwrap_or_else(|| format!("uncaught {value:?}")),
        CaughtError::Error(err) => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn keeps_state_between_calls() {
        let mut session = QuickJs.compile("var n = 0; function bump(by) { n += by; return n; }").unwrap();
        assert_eq!(session.call("bump", &[json!(2)]).unwrap(), json!(2));
        assert_eq!(session.call("bump", &[json!(3)]).unwrap(), json!(5));
        session.exec("n = 100").unwrap();
        assert_eq!(session.eval("n").unwrap(), json!(100));
    }

    #[test]
    fn undefined_is_null() {
        let mut session = QuickJs.compile("var x;").unwrap();
        assert_eq!(session.eval("x").unwrap(), Value::Null);
    }

    #[test]
    fn thrown_errors_keep_message() {
        let mut session = QuickJs.compile("function boom() { throw new Error('Unclosed block'); }").unwrap();
        let err = session.call("boom", &[]).unwrap_err();
        assert_eq!(err.0, "Unclosed block");
    }

    #[test]
    fn syntax_error_fails_compile() {
        assert!(QuickJs.compile("var = ;").is_err());
    }

    #[test]
    fn rejects_bad_function_name() {
        let mut session = QuickJs.compile("").unwrap();
        assert!(session.call("a(); b", &[]).is_err());
    }
}
