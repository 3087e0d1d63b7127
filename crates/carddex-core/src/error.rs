//! Error types for carddex operations.
//!
//! Provides a structured error hierarchy with error codes so callers can
//! distinguish "contact missing" from "version missing" from storage
//! failures programmatically.

use thiserror::Error;

/// Result type alias for carddex operations.
pub type CarddexResult<T> = Result<T, CarddexError>;

/// Main error type for all carddex operations.
#[derive(Error, Debug)]
pub enum CarddexError {
    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
    },

    /// Contact not found.
    #[error("Contact not found: {message}")]
    ContactNotFound {
        message: String,
        code: ErrorCode,
        contact_id: Option<String>,
    },

    /// A requested version snapshot does not exist.
    #[error("Version not found: {message}")]
    VersionNotFound {
        message: String,
        code: ErrorCode,
        contact_id: String,
        version: u32,
    },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Import source could not be parsed.
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        code: ErrorCode,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValInvalidInput,
    ValMissingField,
    ValInvalidSortField,

    // Contact (CON_xxx)
    ConNotFound,
    ConInactive,

    // Versioning (VER_xxx)
    VerNotFound,
    VerSnapshotWriteFailed,

    // Database (DB_xxx)
    DbConnectionFailed,
    DbOperationFailed,

    // Parse (PARSE_xxx)
    ParseInvalidCsv,
    ParseMissingColumn,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValMissingField => "VAL_002",
            ErrorCode::ValInvalidSortField => "VAL_003",
            ErrorCode::ConNotFound => "CON_001",
            ErrorCode::ConInactive => "CON_002",
            ErrorCode::VerNotFound => "VER_001",
            ErrorCode::VerSnapshotWriteFailed => "VER_002",
            ErrorCode::DbConnectionFailed => "DB_001",
            ErrorCode::DbOperationFailed => "DB_002",
            ErrorCode::ParseInvalidCsv => "PARSE_001",
            ErrorCode::ParseMissingColumn => "PARSE_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl CarddexError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
        }
    }

    /// Create a contact-not-found error.
    pub fn contact_not_found(contact_id: impl Into<String>) -> Self {
        let id = contact_id.into();
        Self::ContactNotFound {
            message: format!("Contact with id '{}' not found", id),
            code: ErrorCode::ConNotFound,
            contact_id: Some(id),
        }
    }

    /// Create a version-not-found error.
    pub fn version_not_found(contact_id: impl Into<String>, version: u32) -> Self {
        let id = contact_id.into();
        Self::VersionNotFound {
            message: format!("Version {} of contact '{}' not found", version, id),
            code: ErrorCode::VerNotFound,
            contact_id: id,
            version,
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidCsv,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::ContactNotFound { code, .. } => *code,
            Self::VersionNotFound { code, .. } => *code,
            Self::Database { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Whether this error is one of the two not-found kinds.
    ///
    /// Callers surfacing errors over a transport typically map these to a
    /// 404-style response and everything else to a generic failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ContactNotFound { .. } | Self::VersionNotFound { .. }
        )
    }
}

impl From<rusqlite::Error> for CarddexError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            code: ErrorCode::DbOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}

impl From<csv::Error> for CarddexError {
    fn from(err: csv::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
            code: ErrorCode::ParseInvalidCsv,
        }
    }
}
