use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Database(String),
    Network(String),
    Storage(String),
    StorageQuota(String),
    Auth(String),
    Unauthorized(String),
    NotFound(String),
    InvalidInput(String),
    ValidationError(String),
    RemoteRejection { status: u16, message: String },
    SerializationError(String),
    DeserializationError(String),
    InvalidTransition(String),
    Internal(String),
}

impl AppError {
    /// Failures that should degrade the write to the offline queue instead
    /// of failing the user action.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Network(_) => true,
            AppError::RemoteRejection { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            _ => false,
        }
    }

    /// Permanent remote validation rejections require a corrected payload
    /// before the record is replayed again.
    pub fn requires_correction(&self) -> bool {
        matches!(
            self,
            AppError::RemoteRejection { status, .. }
                if (400..500).contains(status)
                    && !matches!(*status, 401 | 403 | 408 | 429)
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::StorageQuota(msg) => write!(f, "Storage quota exceeded: {}", msg),
            AppError::Auth(msg) => write!(f, "Auth error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::RemoteRejection { status, message } => {
                write!(f, "Remote rejection ({}): {}", status, message)
            }
            AppError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppError::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            AppError::InvalidTransition(msg) => write!(f, "Invalid transition: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Internal(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        let err = AppError::RemoteRejection {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(err.is_retryable());
        assert!(!err.requires_correction());
    }

    #[test]
    fn validation_rejections_require_correction() {
        let err = AppError::RemoteRejection {
            status: 422,
            message: "bad cycle number".into(),
        };
        assert!(!err.is_retryable());
        assert!(err.requires_correction());
    }

    #[test]
    fn auth_statuses_are_neither() {
        let err = AppError::RemoteRejection {
            status: 401,
            message: "expired".into(),
        };
        assert!(!err.is_retryable());
        assert!(!err.requires_correction());
    }
}
