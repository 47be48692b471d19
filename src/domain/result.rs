//! Result type alias for the ingest pipeline

use super::errors::IngestError;

/// Result type alias for ingest operations
///
/// # Examples
///
/// ```
/// use occurrence_ingest::domain::result::Result;
/// use occurrence_ingest::domain::errors::IngestError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(IngestError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::IngestError;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(IngestError::Validation("test error".to_string()));
        assert!(result.is_err());
    }
}
