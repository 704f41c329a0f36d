use thiserror::Error;

/// Everything that can go wrong while fetching a resource.
///
/// The `Display` output is what ends up in the profile error panel, so the
/// status variant keeps the terse `error: <code>` wording.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("error: {0}")]
    Status(u16),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Status(code) => Some(*code),
            FetchError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
