//! Error types for coursepath
//!
//! - **CoreError**: the user-presentable error every service returns, tagged
//!   with a [`CoreErrorKind`] so API layers can map it to a status.
//! - **PathwayError**: pathway rule violations raised by the graph engine,
//!   converted into `CoreError` at the service boundary.
//!
//! ```rust
//! use coursepath::errors::{CoreError, CoreErrorKind};
//!
//! let err = CoreError::not_found("Pathway", "7");
//! assert_eq!(err.kind(), CoreErrorKind::NotFound);
//! ```

pub mod core_error;
pub mod pathway;

pub use core_error::{CoreError, CoreErrorKind};
pub use pathway::PathwayError;

/// Result type alias for service operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type alias for pure pathway rule checks
pub type PathwayResult<T> = Result<T, PathwayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_result_alias() {
        let result: CoreResult<i32> = Err(CoreError::not_found("Course", "1"));
        assert!(result.is_err());
    }

    #[test]
    fn test_pathway_result_alias() {
        let result: PathwayResult<()> = Err(PathwayError::ImmersiveTarget("A".to_string()));
        assert!(result.is_err());
    }
}
