use thiserror::Error;

#[derive(Error, Debug)]
pub enum CribError {
    #[error("Invalid rank: {0}")]
    InvalidRank(char),

    #[error("Invalid suit: {0}")]
    InvalidSuit(char),

    #[error("Invalid card notation: {0}")]
    InvalidCardNotation(String),

    #[error("Invalid hand notation: {0}")]
    InvalidHandNotation(String),

    #[error("{what} must be exactly {expected} cards, got {got}")]
    InvalidHandSize {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Card {0} is not in the current deal")]
    CardNotDealt(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl CribError {
    /// True for failures that happened at the scoring-service boundary.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CribError::Transport(_) | CribError::Status { .. } | CribError::MalformedResponse(_)
        )
    }
}

pub type CribResult<T> = Result<T, CribError>;
