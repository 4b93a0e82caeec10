use thiserror::Error;

/// Feedback device failures.
///
/// Feedback is cosmetic: callers log these and move on, they never gate an
/// access decision.
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("led error: {message}")]
    Led { message: String },

    #[error("buzzer error: {message}")]
    Buzzer { message: String },

    #[error("display error: {message}")]
    Display { message: String },
}

impl FeedbackError {
    pub fn led(message: impl Into<String>) -> Self {
        FeedbackError::Led {
            message: message.into(),
        }
    }

    pub fn buzzer(message: impl Into<String>) -> Self {
        FeedbackError::Buzzer {
            message: message.into(),
        }
    }

    pub fn display(message: impl Into<String>) -> Self {
        FeedbackError::Display {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedbackError>;
