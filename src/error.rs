use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the learning pipeline.
///
/// Rejected structural mutations are not represented here: the graph
/// operations report them through their return values and the search
/// engine simply drops the candidate.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// A probability was requested from a table with no rows.
    #[error("data table has no rows; at least one sample is required")]
    EmptyDataset,

    /// The input file does not follow the expected layout.
    #[error("malformed input at line {line}: {message}")]
    MalformedInput { line: usize, message: String },

    /// Reading or writing a file failed.
    #[error("i/o failure on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A parent name was used that was never declared as a variable.
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    /// The same variable name was declared twice.
    #[error("variable '{0}' declared more than once")]
    DuplicateVariable(String),

    /// The search configuration cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NetworkError {
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        NetworkError::MalformedInput {
            line,
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        NetworkError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, NetworkError>;
