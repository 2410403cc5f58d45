use std::path::PathBuf;
use thiserror::Error;

// Everything the adapter can report back to its caller
#[derive(Debug, Error)]
pub enum PrefixError {
    // A browserslist file was found but could not be read
    #[error("cannot read browserslist config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // The engine script itself could not be loaded from disk
    #[error("cannot load engine source {}: {source}", .path.display())]
    EngineSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("engine compile error: {0}")]
    EngineCompile(String),

    // Raised inside the engine; the message is passed through untouched
    #[error("{0}")]
    Engine(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("unexpected engine result: {0}")]
    UnexpectedResult(String),
}

impl From<serde_json::Error> for PrefixError {
    fn from(err: serde_json::Error) -> Self {
        PrefixError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PrefixError>;
