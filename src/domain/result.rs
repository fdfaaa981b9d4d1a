//! Result type alias for Tablecast
//!
//! This module provides a convenient Result type alias that uses
//! TablecastError as the error type.

use super::errors::TablecastError;

/// Result type alias for Tablecast operations
///
/// This is a convenience type alias that uses `TablecastError` as the error
/// type. Use this throughout the codebase for fallible operations.
///
/// # Examples
///
/// ```
/// use tablecast::domain::result::Result;
/// use tablecast::domain::errors::TablecastError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(TablecastError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, TablecastError>;
