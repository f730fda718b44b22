//! Result type alias for catalog-export
//!
//! This module provides a convenient Result type alias that uses CatalogError
//! as the error type.

use super::errors::CatalogError;

/// Result type alias for catalog-export operations
///
/// # Examples
///
/// ```
/// use catalog_export::domain::result::Result;
/// use catalog_export::domain::errors::CatalogError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(CatalogError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, CatalogError>;
