pub mod errors;
pub mod context;
pub mod browserslist;
pub mod options;
pub mod params;
pub mod engine;
pub mod runtime; // pluggable script backends

use std::path::PathBuf;

use context::ProcessorConfig;
use errors::Result;
use params::{default_from, EngineParams, BROWSERS};
use runtime::{QuickJs, ScriptRuntime};

pub use engine::{EngineSession, EngineSource, ProcessResult};
pub use errors::PrefixError;
pub use options::{options_from, translate, Options};

/// Runs the prefixing engine with browserslist-aware defaults.
///
/// Constructor params are the base of every engine instance. Per-call
/// options go to the engine's `process`, except `browsers`, which replaces
/// the constructor's list for that call.
pub struct Processor {
    params: Options,
    config: ProcessorConfig,
    engine: EngineSession,
}

impl Processor {
    pub fn with_config(params: Options, config: ProcessorConfig) -> Self {
        Self::with_runtime(params, config, Box::new(QuickJs))
    }

    /// Build a processor on top of a specific script backend. Nothing is
    /// compiled until the first `process` or `info` call.
    pub fn with_runtime(params: Options, config: ProcessorConfig, runtime: Box<dyn ScriptRuntime>) -> Self {
        let engine = EngineSession::new(runtime, config.engine_source.clone());
        Self { params: translate(&params), config, engine }
    }

    /// Constructor params after key translation.
    pub fn params(&self) -> &Options {
        &self.params
    }

    /// Add prefixes to `css`.
    ///
    /// Recognized options include `from` (source path, also where config
    /// discovery starts), `to`, `map` and `browsers`; anything else is passed
    /// to the engine after key translation.
    pub fn process(&mut self, css: &str, opts: &Options) -> Result<ProcessResult> {
        let mut opts = translate(opts);
        let mut params = self.params.clone();
        if let Some(browsers) = opts.remove(BROWSERS) {
            params.insert(BROWSERS.to_string(), browsers);
        }
        let from = match opts.get("from").and_then(|v| v.as_str()) {
            Some(from) => PathBuf::from(from),
            None => default_from(&self.config),
        };
        let params = EngineParams::build(&params, &from)?;
        self.engine.process(css, &params, &opts)
    }

    /// Which browsers and prefixes the current params select.
    pub fn info(&mut self) -> Result<String> {
        let params = EngineParams::build(&self.params, &default_from(&self.config))?;
        self.engine.info(&params)
    }
}
