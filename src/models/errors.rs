//! Centralized Error Handling Module
//!
//! Every failure in a scan carries a unique error code so logs can be
//! filtered by outcome without parsing messages.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - VALIDATION_xxx: rejected input
//! - PROVIDER_xxx: external data source failures
//! - CFG_xxx: configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Input
    // ============================================
    /// Raw text is not a plausible identifier
    ValidationRejected,

    // ============================================
    // Provider outcomes
    // ============================================
    /// Provider did not answer within its timeout
    ProviderTimeout,
    /// Provider returned a non-success status or the request failed
    ProviderError,
    /// Provider answered with a body we could not parse
    ProviderInvalidResponse,

    // ============================================
    // Outer surfaces
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,
    /// Chat transport could not deliver a message
    TransportError,

    // ============================================
    // Generic
    // ============================================
    /// Anything not anticipated (caught at the request boundary)
    InternalUnexpected,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationRejected => "VALIDATION_REJECTED",
            Self::ProviderTimeout => "PROVIDER_TIMEOUT",
            Self::ProviderError => "PROVIDER_ERROR",
            Self::ProviderInvalidResponse => "PROVIDER_INVALID_RESPONSE",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::TransportError => "TRANSPORT_ERROR",
            Self::InternalUnexpected => "INTERNAL_UNEXPECTED",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ValidationRejected | Self::ConfigInvalidValue => 400,
            Self::ProviderTimeout => 504,
            Self::ProviderError | Self::ProviderInvalidResponse => 502,
            Self::TransportError | Self::InternalUnexpected => 500,
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Input rejected by the identifier validator
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationRejected, msg)
    }

    /// Provider timeout
    pub fn provider_timeout(provider: &str, after: std::time::Duration) -> Self {
        Self::new(
            ErrorCode::ProviderTimeout,
            format!("{} did not respond within {}ms", provider, after.as_millis()),
        )
    }

    /// Provider returned an error status or the request failed
    pub fn provider_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProviderError, msg)
    }

    /// Provider body could not be decoded
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProviderInvalidResponse, msg)
    }

    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    /// Transport failure
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::TransportError, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::ProviderTimeout, "Request timeout")
        } else if err.is_decode() {
            Self::with_source(ErrorCode::ProviderInvalidResponse, "Malformed response body", err)
        } else {
            let message = match err.status() {
                Some(status) => format!("HTTP {}", status),
                None => "Request failed".to_string(),
            };
            Self::with_source(ErrorCode::ProviderError, message, err)
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::ProviderInvalidResponse, "JSON parse error", err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::TransportError, "IO error", err)
    }
}
