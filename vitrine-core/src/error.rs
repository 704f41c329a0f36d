use thiserror::Error;

#[derive(Error, Debug)]
pub enum VitrineError {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Stored value under '{key}' is not valid JSON: {source}")]
    CorruptValue {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Element '{0}' not found in document")]
    MissingElement(String),

    #[error("Element '{id}' is not {expected}")]
    WrongElement { id: String, expected: &'static str },

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

pub type Result<T> = std::result::Result<T, VitrineError>;
