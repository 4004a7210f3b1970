use barrierforest::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to serialize output: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Failed to write table: {0}")]
    Table(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
