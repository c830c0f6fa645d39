//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Page automation error
    #[error("{0}")]
    Pilot(#[from] mda_pilot::PilotError),

    /// Result serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod error_tests {
        use super::*;

        #[test]
        fn test_config_error() {
            let err = CliError::config("no grid source");
            assert_eq!(err.to_string(), "Configuration error: no grid source");
        }

        #[test]
        fn test_pilot_error_is_transparent() {
            let err: CliError = mda_pilot::PilotError::row_not_found("Fabrikam").into();
            assert_eq!(
                err.to_string(),
                "No record with the name 'Fabrikam' exists in the grid."
            );
        }

        #[test]
        fn test_invalid_argument() {
            let err = CliError::invalid_argument("--url needs the browser feature");
            assert!(err.to_string().starts_with("Invalid argument:"));
        }
    }
}
