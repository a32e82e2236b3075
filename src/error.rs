//! Error types for the tidings application

use thiserror::Error;

/// Errors that can occur in the tidings application
#[derive(Error, Debug)]
pub enum TidingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize {path}: {source}")]
    Serialize {
        path: String,
        #[source]
        source: toml::ser::Error,
    },
}

pub type Result<T> = std::result::Result<T, TidingsError>;
