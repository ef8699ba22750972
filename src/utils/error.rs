use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Authentication failed with HTTP {status}")]
    AuthenticationError {
        status: u16,
        body_preview: Option<String>,
    },

    #[error("API returned HTTP {status} on the first page")]
    HttpStatusError {
        status: u16,
        body_preview: Option<String>,
    },

    #[error("Unexpected Content-Type: {content_type}")]
    UnexpectedContentType {
        content_type: String,
        body_preview: Option<String>,
    },

    #[error("Failed to parse JSON response: {message}")]
    JsonParseError {
        message: String,
        body_preview: Option<String>,
    },

    #[error("Unexpected response structure: keys {keys:?}")]
    UnexpectedStructure { keys: Vec<String> },

    #[error("Unexpected response type: {kind}")]
    UnexpectedType { kind: String },

    #[error("Stopped after {max_pages} pages without reaching the end of the listing")]
    PageLimitReached { max_pages: u32 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Response,
    Output,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::AuthenticationError { .. } => ErrorCategory::Authentication,
            EtlError::HttpStatusError { .. }
            | EtlError::UnexpectedContentType { .. }
            | EtlError::JsonParseError { .. }
            | EtlError::UnexpectedStructure { .. }
            | EtlError::UnexpectedType { .. }
            | EtlError::PageLimitReached { .. } => ErrorCategory::Response,
            EtlError::CsvError(_) | EtlError::IoError(_) => {
                ErrorCategory::Output
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // transient, a later run may succeed
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Authentication | ErrorCategory::Response => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    /// First 500 characters of the response body, when the error captured one.
    pub fn body_preview(&self) -> Option<&str> {
        match self {
            EtlError::AuthenticationError { body_preview, .. }
            | EtlError::HttpStatusError { body_preview, .. }
            | EtlError::UnexpectedContentType { body_preview, .. }
            | EtlError::JsonParseError { body_preview, .. } => body_preview.as_deref(),
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::ApiError(e) if e.is_timeout() => {
                "The API did not answer in time; retry later or raise --timeout-seconds".to_string()
            }
            EtlError::ApiError(_) => {
                "Check network connectivity and that --api-endpoint is reachable".to_string()
            }
            EtlError::AuthenticationError { .. } => "Verify that the API key is valid and active, \
                 that it has not expired, and that it has permission to access camp data"
                .to_string(),
            EtlError::HttpStatusError { .. } => {
                "Check the endpoint and year; the API rejected the first request".to_string()
            }
            EtlError::UnexpectedContentType { .. } | EtlError::JsonParseError { .. } => {
                "The endpoint did not return JSON; confirm --api-endpoint points at the listing API"
                    .to_string()
            }
            EtlError::UnexpectedStructure { .. } | EtlError::UnexpectedType { .. } => {
                "The API response format changed; compare it with the keys listed in the error"
                    .to_string()
            }
            EtlError::PageLimitReached { .. } => {
                "Raise --max-pages if the listing really is that large".to_string()
            }
            EtlError::CsvError(_) | EtlError::IoError(_) => {
                "Check that the output directory is writable and has free space".to_string()
            }
            EtlError::MissingConfigError { field } => {
                format!("Provide a value for {} via CLI flag, environment or config file", field)
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the camp API: {}", self),
            ErrorCategory::Authentication => format!("The API key was rejected: {}", self),
            ErrorCategory::Response => format!("The camp API returned an unusable response: {}", self),
            ErrorCategory::Output => format!("Writing the export failed: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
