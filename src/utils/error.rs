use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Upload rejected by server (status {status}): {message}")]
    UploadRejected { status: u16, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Storage,
    Network,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IntakeError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } | Self::CsvError(_) | Self::SerializationError(_) => {
                ErrorCategory::Input
            }
            Self::StorageError { .. } | Self::DatabaseError(_) => ErrorCategory::Storage,
            Self::ApiError(_) | Self::UploadRejected { .. } => ErrorCategory::Network,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Storage | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ValidationError { .. } => "Check the request body: it needs a `candidates` array",
            Self::StorageError { .. } => "Check the candidate fields and that the database is reachable",
            Self::DatabaseError(_) => "Verify DATABASE_URL and that PostgreSQL is running",
            Self::ApiError(_) => "Verify the server URL and that candidate-intake is running",
            Self::UploadRejected { .. } => "Inspect the server logs for the rejected batch",
            Self::CsvError(_) => "Make sure the file is a comma-separated CSV with a header row",
            Self::IoError(_) => "Check file paths and permissions",
            Self::SerializationError(_) => "Make sure the payload is valid JSON",
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => {
                "Review the command line flags and the TOML config file"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ValidationError { message } => format!("Invalid input: {}", message),
            Self::StorageError { message } => format!("Could not save candidates: {}", message),
            Self::DatabaseError(e) => format!("Database unavailable: {}", e),
            Self::ApiError(e) => format!("Could not reach the server: {}", e),
            Self::UploadRejected { message, .. } => format!("Upload failed: {}", message),
            Self::MissingConfigError { field } => format!("Missing required setting: {}", field),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IntakeError>;
