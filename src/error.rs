use thiserror::Error;

/// The only failure text a user ever sees.
pub const USER_ERROR_MESSAGE: &str =
    "Üzgünüz, bir hata oluştu. Lütfen API anahtarınızı kontrol edin ve tekrar deneyin.";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("failed to reach text-generation service: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("text-generation service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse text-generation response: {0}")]
    Decode(String),
    #[error("text-generation service returned no text")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub enum ReadingError {
    #[error("credential not found")]
    Configuration,
    #[error(transparent)]
    ExternalService(#[from] GenerationError),
}

impl ReadingError {
    /// Every kind collapses to the same message for display.
    pub fn user_message(&self) -> &'static str {
        USER_ERROR_MESSAGE
    }
}
