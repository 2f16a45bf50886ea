//! Core error types for thanos.
//!
//! [`ThanosError`] covers HTTP errors, store errors, field lookup errors,
//! validation errors, routing errors, configuration and template errors.
//! Every variant maps to an HTTP status code via [`ThanosError::status_code`].

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// A validation error with optional per-field errors.
///
/// # Examples
///
/// ```
/// use thanos_core::error::ValidationError;
///
/// let err = ValidationError::new("This field is required.", "required");
/// assert_eq!(err.to_string(), "This field is required.");
///
/// let mut fields = std::collections::BTreeMap::new();
/// fields.insert("email".to_string(), vec!["Enter a valid email address.".to_string()]);
/// let err = ValidationError::with_field_errors(fields);
/// assert!(err.to_string().contains("email"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidationError {
    /// The primary error message.
    pub message: String,
    /// A short code identifying the failure (e.g. "required", "invalid").
    pub code: String,
    /// Per-field error messages, keyed by field name.
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            field_errors: BTreeMap::new(),
        }
    }

    /// Creates a `ValidationError` containing per-field errors.
    pub fn with_field_errors(field_errors: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            message: String::new(),
            code: "invalid".to_string(),
            field_errors,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.message.is_empty() {
            return write!(f, "{}", self.message);
        }
        let mut first = true;
        for (field, errors) in &self.field_errors {
            for error in errors {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {error}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for thanos.
#[derive(Error, Debug)]
pub enum ThanosError {
    // ── HTTP errors ──────────────────────────────────────────────────

    /// HTTP 400 Bad Request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 404 Not Found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP 405 Method Not Allowed.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    // ── Store errors ─────────────────────────────────────────────────

    /// A lookup expected a record that does not exist.
    #[error("Object does not exist: {0}")]
    DoesNotExist(String),

    /// A generic store error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A filter or form referenced a field the model does not have, or a
    /// value that cannot be coerced to the field's type.
    #[error("Field error: {0}")]
    FieldError(String),

    // ── Validation ───────────────────────────────────────────────────

    /// One or more fields failed validation.
    #[error("Validation error: {0}")]
    ValidationError(ValidationError),

    // ── Routing ──────────────────────────────────────────────────────

    /// No named route matched a reverse lookup.
    #[error("Reverse for '{0}' not found")]
    NoReverseMatch(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The console is improperly configured (bad registration, duplicate route, ...).
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    // ── Templates ────────────────────────────────────────────────────

    /// A template failed to load or render.
    #[error("Template error: {0}")]
    TemplateError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ThanosError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `BadRequest`, `FieldError`, `ValidationError` -> 400
    /// - `NotFound`, `DoesNotExist` -> 404
    /// - `MethodNotAllowed` -> 405
    /// - everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::FieldError(_) | Self::ValidationError(_) => 400,
            Self::NotFound(_) | Self::DoesNotExist(_) => 404,
            Self::MethodNotAllowed(_) => 405,
            Self::DatabaseError(_)
            | Self::NoReverseMatch(_)
            | Self::ConfigurationError(_)
            | Self::ImproperlyConfigured(_)
            | Self::TemplateError(_)
            | Self::IoError(_) => 500,
        }
    }
}

/// A convenience type alias for `Result<T, ThanosError>`.
pub type ThanosResult<T> = Result<T, ThanosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_simple() {
        let err = ValidationError::new("This field is required.", "required");
        assert_eq!(err.to_string(), "This field is required.");
        assert_eq!(err.code, "required");
    }

    #[test]
    fn test_validation_error_display_field_errors() {
        let mut fields = BTreeMap::new();
        fields.insert("age".to_string(), vec!["Enter a whole number.".to_string()]);
        fields.insert("email".to_string(), vec!["Invalid email.".to_string()]);
        let err = ValidationError::with_field_errors(fields);
        assert_eq!(
            err.to_string(),
            "age: Enter a whole number.; email: Invalid email."
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ThanosError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(ThanosError::FieldError("x".into()).status_code(), 400);
        assert_eq!(
            ThanosError::ValidationError(ValidationError::new("x", "y")).status_code(),
            400
        );
        assert_eq!(ThanosError::NotFound("x".into()).status_code(), 404);
        assert_eq!(ThanosError::DoesNotExist("x".into()).status_code(), 404);
        assert_eq!(ThanosError::MethodNotAllowed("x".into()).status_code(), 405);
        assert_eq!(ThanosError::DatabaseError("x".into()).status_code(), 500);
        assert_eq!(ThanosError::NoReverseMatch("x".into()).status_code(), 500);
        assert_eq!(ThanosError::TemplateError("x".into()).status_code(), 500);
    }

    #[test]
    fn test_display() {
        let err = ThanosError::NoReverseMatch("crm_customer_add".into());
        assert_eq!(err.to_string(), "Reverse for 'crm_customer_add' not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: ThanosError = io_err.into();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("file missing"));
    }
}
