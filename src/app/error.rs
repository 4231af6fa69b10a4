use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShortlineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },

    #[error("Response decoding error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

/// Coarse classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a response.
    Network,
    /// 4xx rejection carrying validation details.
    Validation,
    /// 401/403: treated as an expired or invalid token.
    Unauthorized,
    /// 404 on update or delete.
    NotFound,
    Server,
    Other,
}

impl ShortlineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShortlineError::Http(_) => ErrorKind::Network,
            ShortlineError::Api { status, .. } => match *status {
                401 | 403 => ErrorKind::Unauthorized,
                404 => ErrorKind::NotFound,
                400..=499 => ErrorKind::Validation,
                500..=599 => ErrorKind::Server,
                _ => ErrorKind::Other,
            },
            _ => ErrorKind::Other,
        }
    }

    /// Server-provided message when there is one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ShortlineError::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShortlineError>;
