use std::path::{Path, PathBuf};

use crate::engine::EngineSource;

/// Per-processor settings that are not engine options.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Where the engine script comes from.
    pub engine_source: EngineSource,
    /// Root of an enclosing web application. When set, config discovery
    /// defaults to its stylesheet directory instead of the working directory.
    pub asset_root: Option<PathBuf>,
}

impl ProcessorConfig {
    pub fn new(engine_source: EngineSource) -> Self {
        Self { engine_source, asset_root: None }
    }

    pub fn with_asset_root(mut self, root: impl AsRef<Path>) -> Self {
        self.asset_root = Some(root.as_ref().to_path_buf());
        self
    }
}
