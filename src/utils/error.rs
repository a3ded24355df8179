use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned HTTP {status} for {url}")]
    HttpStatusError { status: u16, url: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

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

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code for an aborted run; every variant is a failure.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::HttpStatusError { .. } => ErrorCategory::Network,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
            EtlError::IoError(_) => ErrorCategory::Storage,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 上游暫時性錯誤，重跑通常可以恢復
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::ApiError(_) => "Check network connectivity and that the API endpoint is reachable",
            EtlError::HttpStatusError { status, .. } if *status >= 500 => {
                "The upstream service is failing; retry the run later"
            }
            EtlError::HttpStatusError { .. } => "Check the API endpoint and the city id filter",
            EtlError::CsvError(_) | EtlError::SerializationError(_) => {
                "Inspect the API payload; the response shape may have changed"
            }
            EtlError::IoError(_) => "Make sure the output directory exists or can be created and is writable",
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => "Fix the configuration file or command-line flags",
            EtlError::ProcessingError { .. } => "Inspect the fetched records for malformed fields",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not fetch medical centers: {}", self),
            ErrorCategory::Data => format!("Could not process medical center records: {}", self),
            ErrorCategory::Storage => format!("Could not write output files: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_are_critical() {
        let err = EtlError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        ));
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("read-only"));
    }

    #[test]
    fn test_http_status_suggestion_depends_on_status() {
        let server_side = EtlError::HttpStatusError {
            status: 503,
            url: "http://api".to_string(),
        };
        let client_side = EtlError::HttpStatusError {
            status: 404,
            url: "http://api".to_string(),
        };
        assert_eq!(server_side.severity(), ErrorSeverity::Medium);
        assert_ne!(
            server_side.recovery_suggestion(),
            client_side.recovery_suggestion()
        );
    }

    #[test]
    fn test_every_failure_exits_non_zero() {
        let errors = [
            EtlError::HttpStatusError {
                status: 500,
                url: "http://api".to_string(),
            },
            EtlError::ConfigError {
                message: "cannot read config file".to_string(),
            },
            EtlError::ProcessingError {
                message: "record has no id".to_string(),
            },
            EtlError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk full")),
        ];
        let codes: Vec<i32> = errors.iter().map(|e| e.severity().exit_code()).collect();

        assert_eq!(codes, vec![2, 1, 1, 3]);
    }
}
