//! Error types and handling for the travel planner

use thiserror::Error;

/// Main error type for the travel planner
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Configuration-related errors (missing keys, bad settings)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Transport-level failures talking to an external service
    #[error("Network error: {message}")]
    Network { message: String },

    /// An external service answered, but not with something usable
    #[error("API error: {message}")]
    Api { message: String },

    /// A lookup completed without a match
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Failures of the hosted language model call
    #[error("LLM error: {message}")]
    Llm { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl PlannerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new LLM error
    pub fn llm<S: Into<String>>(message: S) -> Self {
        Self::Llm {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file and API keys.")
            }
            PlannerError::Network { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            PlannerError::Api { message } => format!("An external service failed: {message}"),
            PlannerError::NotFound { message } => message.clone(),
            PlannerError::Validation { message } => format!("Invalid input: {message}"),
            PlannerError::Llm { message } => format!("The planning model failed: {message}"),
            PlannerError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for PlannerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PlannerError::api(format!("Malformed response: {err}"))
        } else {
            PlannerError::network(err.to_string())
        }
    }
}
