//! Embedded script execution.
//!
//! The adapter only needs to compile one blob of script into a stateful
//! environment and then run statements, evaluate expressions and call named
//! functions in it. Values cross the boundary as `serde_json::Value`, so a
//! backend never leaks its own value types.

pub mod quickjs;

use serde_json::Value;
use thiserror::Error;

pub use quickjs::QuickJs;

/// Error raised by a backend, carrying the script-side message.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{0}")]
pub struct ScriptError(pub String);

impl ScriptError {
    pub fn new(msg: impl Into<String>) -> Self {
        ScriptError(msg.into())
    }
}

pub type ScriptResult<T> = std::result::Result<T, ScriptError>;

/// A way of turning script source into a live session.
pub trait ScriptRuntime {
    fn name(&self) -> &'static str;

    /// Compile and run `source` in a fresh global environment.
    fn compile(&self, source: &str) -> ScriptResult<Box<dyn ScriptSession>>;
}

/// A compiled, stateful script environment.
pub trait ScriptSession {
    /// Run statements for their side effects.
    fn exec(&mut self, code: &str) -> ScriptResult<()>;

    /// Evaluate an expression and marshal its result back.
    /// `undefined` comes back as `Value::Null`.
    fn eval(&mut self, expr: &str) -> ScriptResult<Value>;

    /// Call the global function `name` with marshaled arguments.
    fn call(&mut self, name: &str, args: &[Value]) -> ScriptResult<Value>;
}
