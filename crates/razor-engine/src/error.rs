use razor_parser::DirectiveError;
use smol_str::SmolStr;
use thiserror::Error;

/// Engine setup errors.
///
/// Problems in the documents being processed are never errors; they are
/// reported as diagnostics on the resulting code document.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("directive '{0}' is registered more than once")]
    DuplicateDirective(SmolStr),

    #[error(transparent)]
    InvalidDirective(#[from] DirectiveError),

    #[error("failed to read configuration {path}: {source}")]
    ReadConfiguration {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read document {path}: {source}")]
    ReadDocument {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] serde_json::Error),
}
