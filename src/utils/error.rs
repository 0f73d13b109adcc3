use thiserror::Error;

/// One failed fetch attempt, kept so the terminal error can report every try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    /// Zero-based attempt index.
    pub attempt: u32,
    pub cause: String,
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "attempt {}: {}", self.attempt + 1, self.cause)
    }
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Fetch attempt {} failed: {cause}", .attempt + 1)]
    TransientFetchError { attempt: u32, cause: String },

    #[error(
        "Fetch failed after {attempts} attempts; last error: {}",
        .failures.last().map(|f| f.cause.as_str()).unwrap_or("unknown")
    )]
    ExhaustedRetriesError {
        attempts: u32,
        failures: Vec<AttemptFailure>,
    },

    #[error("Schema error: {message}")]
    SchemaError { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit status for a run that failed with this severity.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl EtlError {
    pub fn schema(message: impl Into<String>) -> Self {
        EtlError::SchemaError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_)
            | EtlError::TransientFetchError { .. }
            | EtlError::ExhaustedRetriesError { .. } => ErrorCategory::Network,
            EtlError::SchemaError { .. } => ErrorCategory::Data,
            EtlError::CsvError(_) | EtlError::IoError(_) => ErrorCategory::Storage,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::TransientFetchError { .. }
            | EtlError::ExhaustedRetriesError { .. }
            | EtlError::ApiError(_) => ErrorSeverity::Medium,
            EtlError::SchemaError { .. }
            | EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            EtlError::CsvError(_) | EtlError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// Only transport-level failures are worth another attempt; a bad body is deterministic.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            EtlError::TransientFetchError { .. } | EtlError::ApiError(_)
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check the source URL and network connectivity, or raise --max-attempts"
            }
            ErrorCategory::Data => {
                "The source returned records that do not match the employee schema; inspect the response body"
            }
            ErrorCategory::Configuration => "Review the command-line flags and config file values",
            ErrorCategory::Storage => "Check that the output path is writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ExhaustedRetriesError { attempts, failures } => {
                let mut message = format!("Could not fetch employee data after {} attempts", attempts);
                for failure in failures {
                    message.push_str(&format!("\n  - {}", failure));
                }
                message
            }
            EtlError::SchemaError { message } => format!("Employee data is malformed: {}", message),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
