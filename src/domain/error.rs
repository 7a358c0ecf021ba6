use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Please enter a valid YouTube URL")]
    InvalidUrl,

    /// Failure reported by the conversion service, shown verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("An unknown error occurred.")]
    Unknown,

    #[error("Network error or server issue. Please try again.")]
    Transport,

    #[error("I/O error: {0}")]
    Io(String),
}

impl AppError {
    /// Maps a server-supplied message, treating a missing or blank one as unknown.
    pub fn rejected(message: Option<String>) -> Self {
        match message {
            Some(message) if !message.is_empty() => AppError::Rejected(message),
            _ => AppError::Unknown,
        }
    }
}
