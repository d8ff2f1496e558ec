//! Shared validation utilities
//!
//! Common validation functions for input data across commands and queries.

use thiserror::Error;

/// Errors that can occur during SKU validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SkuValidationError {
    #[error("SKU is required and cannot be empty")]
    Required,

    #[error("SKU must be between 1 and {max_length} characters")]
    TooLong { max_length: usize },
}

/// Errors that can occur during name validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameValidationError {
    #[error("Name is required and cannot be empty")]
    Required,

    #[error("Name must be between 1 and {max_length} characters")]
    TooLong { max_length: usize },
}

/// Errors that can occur during URL validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("{field_name} URL is invalid: must start with http:// or https://")]
    InvalidFormat { field_name: String },
}

/// Validate a SKU
///
/// # Rules
/// - Must not be empty (after trimming whitespace)
/// - Must not exceed max_length characters
pub fn validate_sku(sku: &str, max_length: usize) -> Result<(), SkuValidationError> {
    if sku.trim().is_empty() {
        return Err(SkuValidationError::Required);
    }

    if sku.len() > max_length {
        return Err(SkuValidationError::TooLong { max_length });
    }

    Ok(())
}

/// Validate a name field
///
/// # Rules
/// - Must not be empty (after trimming whitespace)
/// - Must not exceed max_length characters
pub fn validate_name(name: &str, max_length: usize) -> Result<(), NameValidationError> {
    if name.trim().is_empty() {
        return Err(NameValidationError::Required);
    }

    if name.len() > max_length {
        return Err(NameValidationError::TooLong { max_length });
    }

    Ok(())
}

/// Validate a URL field
///
/// # Rules
/// - Must start with http:// or https://, with a non-empty host part
pub fn validate_url(url: &str, field_name: &str) -> Result<(), UrlValidationError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));

    match rest {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlValidationError::InvalidFormat {
            field_name: field_name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("WDG-1", 255).is_ok());
        assert_eq!(validate_sku("  ", 255), Err(SkuValidationError::Required));
        assert_eq!(
            validate_sku(&"x".repeat(300), 255),
            Err(SkuValidationError::TooLong { max_length: 255 })
        );
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Widget", 255).is_ok());
        assert_eq!(validate_name("", 255), Err(NameValidationError::Required));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/hook", "url").is_ok());
        assert!(validate_url("http://localhost:9000", "url").is_ok());
        assert!(validate_url("ftp://example.com", "url").is_err());
        assert!(validate_url("https://", "url").is_err());
        assert!(validate_url("", "url").is_err());
    }
}
