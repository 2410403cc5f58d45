use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use serde::Serialize;
use serde_json::Value;

use crate::errors::{PrefixError, Result};
use crate::options::Options;
use crate::params::{check_representable, EngineParams};
use crate::runtime::{ScriptRuntime, ScriptSession};

// =========================
// Engine source
// =========================

/// Where the engine script is read from.
#[derive(Debug, Clone)]
pub enum EngineSource {
    /// A script file, read once per process and shared afterwards.
    File(PathBuf),
    /// Script text supplied directly.
    Inline(Arc<str>),
}

impl EngineSource {
    pub fn inline(text: impl Into<Arc<str>>) -> Self {
        EngineSource::Inline(text.into())
    }

    fn load(&self) -> Result<Arc<str>> {
        match self {
            EngineSource::Inline(text) => Ok(Arc::clone(text)),
            EngineSource::File(path) => read_cached(path),
        }
    }
}

fn read_cached(path: &Path) -> Result<Arc<str>> {
    static SOURCES: OnceLock<Mutex<HashMap<PathBuf, Arc<str>>>> = OnceLock::new();

    let cache = SOURCES.get_or_init(Default::default);
    let mut cache = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(text) = cache.get(path) {
        return Ok(Arc::clone(text));
    }
    let text: Arc<str> = std::fs::read_to_string(path)
        .map_err(|source| PrefixError::EngineSource { path: path.to_path_buf(), source })?
        .into();
    cache.insert(path.to_path_buf(), Arc::clone(&text));
    Ok(text)
}

// =========================
// Compiled session
// =========================

const GLOBAL_SHIM: &str = "var global = this;\n";

// Holds the constructed engine and normalizes its result to `{css, map}`.
const PROCESS_PROXY: &str = r#"
var processor;
var process = function () {
  var result = processor.process.apply(processor, arguments);
  var map = result.map ? result.map.toString() : null;
  return { css: result.css, map: map };
};
"#;

/// Output of one `process` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessResult {
    pub css: String,
    pub map: Option<String>,
}

impl std::fmt::Display for ProcessResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.css)
    }
}

enum State {
    Pending,
    Ready(Box<dyn ScriptSession>),
    Failed(String),
}

/// One lazily compiled engine, reused for every call.
pub struct EngineSession {
    runtime: Box<dyn ScriptRuntime>,
    source: EngineSource,
    state: State,
}

impl EngineSession {
    pub fn new(runtime: Box<dyn ScriptRuntime>, source: EngineSource) -> Self {
        Self { runtime, source, state: State::Pending }
    }

    pub fn is_compiled(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Compile on first use. A failed compile is remembered and reported on
    /// every later call.
    fn session(&mut self) -> Result<&mut dyn ScriptSession> {
        if let State::Pending = self.state {
            self.state = match self.build_script().and_then(|script| self.compile(&script)) {
                Ok(session) => State::Ready(session),
                Err(err) => {
                    tracing::warn!(error = %err, "engine failed to compile");
                    match err {
                        PrefixError::EngineCompile(msg) => State::Failed(msg),
                        // a missing file is not cached; it may show up later
                        other => return Err(other),
                    }
                }
            };
        }
        match &mut self.state {
            State::Ready(session) => Ok(session.as_mut()),
            State::Failed(msg) => Err(PrefixError::EngineCompile(msg.clone())),
            State::Pending => unreachable!("session state resolved above"),
        }
    }

    fn build_script(&self) -> Result<String> {
        let engine = self.source.load()?;
        Ok([GLOBAL_SHIM, &*engine, PROCESS_PROXY].concat())
    }

    fn compile(&self, script: &str) -> Result<Box<dyn ScriptSession>> {
        tracing::info!(runtime = self.runtime.name(), bytes = script.len(), "compiling engine");
        self.runtime
            .compile(script)
            .map_err(|err| PrefixError::EngineCompile(err.0))
    }

    /// Describe the browsers and prefixes selected by `params`, using a
    /// freshly constructed engine instance.
    pub fn info(&mut self, params: &EngineParams) -> Result<String> {
        let literal = params.to_literal()?;
        let session = self.session()?;
        let value = session
            .eval(&format!("autoprefixer({literal}).info()"))
            .map_err(|err| PrefixError::Engine(err.0))?;
        match value {
            Value::String(text) => Ok(text),
            other => Err(PrefixError::UnexpectedResult(format!("info() returned {other}"))),
        }
    }

    /// Rebuild the engine instance from `params`, then run it over `css`.
    pub fn process(&mut self, css: &str, params: &EngineParams, options: &Options) -> Result<ProcessResult> {
        let literal = params.to_literal()?;
        let options = Value::Object(options.clone());
        check_representable(&options)?;
        tracing::debug!(params = %literal, "constructing engine instance");
        let session = self.session()?;
        session
            .exec(&format!("processor = autoprefixer({literal});"))
            .map_err(|err| PrefixError::Engine(err.0))?;
        let result = session
            .call("process", &[Value::String(css.to_string()), options])
            .map_err(|err| PrefixError::Engine(err.0))?;
        into_result(result)
    }
}

fn into_result(value: Value) -> Result<ProcessResult> {
    let Value::Object(mut fields) = value else {
        return Err(PrefixError::UnexpectedResult(format!("expected an object, got {value}")));
    };
    let css = match fields.remove("css") {
        Some(Value::String(css)) => css,
        other => {
            return Err(PrefixError::UnexpectedResult(format!(
                "css field is {}",
                other.unwrap_or(Value::Null)
            )))
        }
    };
    let map = match fields.remove("map") {
        Some(Value::String(map)) => Some(map),
        Some(Value::Null) | None => None,
        Some(other) => return Err(PrefixError::UnexpectedResult(format!("map field is {other}"))),
    };
    Ok(ProcessResult { css, map })
}
