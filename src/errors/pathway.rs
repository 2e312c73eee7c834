//! Pathway rule violations
//!
//! These are raised by the pure graph engine in [`crate::pathway_graph`] before
//! anything is written to the store. Each variant carries display names so the
//! message can be shown to an administrator as is.
//!
//! ```rust
//! use coursepath::errors::{CoreErrorKind, PathwayError};
//!
//! let err = PathwayError::ImmersiveTarget("Java Developer".to_string());
//! assert_eq!(err.error_code(), "IMMERSIVE_TARGET");
//! assert_eq!(coursepath::errors::CoreError::from(err).kind(), CoreErrorKind::InvalidOperation);
//! ```

use thiserror::Error;

use super::{CoreError, CoreErrorKind};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathwayError {
    /// The exact prerequisite/next pair is already linked
    #[error("This pathway already exists: \"{prerequisite}\" → \"{next}\" (order: {order})")]
    DuplicateEdge {
        prerequisite: String,
        next: String,
        order: i32,
    },

    #[error("Cannot add \"{0}\" as a next step. Immersive courses can only be entry points in a pathway.")]
    ImmersiveTarget(String),

    #[error("Cannot create pathway: \"{next}\" is already in the prerequisite chain for \"{prerequisite}\". This would create a circular dependency.")]
    CycleDetected { prerequisite: String, next: String },

    #[error("Cannot create pathway: \"{course}\" is already {depth} levels deep, which would exceed the maximum pathway depth of {max_depth} levels.")]
    DepthExceeded {
        course: String,
        depth: usize,
        max_depth: usize,
    },

    #[error("Cannot create pathway: \"{0}\" does not have a path to an immersive course. All career accelerator courses must eventually trace back to an immersive entry point.")]
    UnreachableFromImmersive(String),

    #[error("Cannot delete this pathway: \"{course}\" is a prerequisite for other courses ({dependents}) and has no alternative incoming pathways. Remove those pathways first or add an alternative pathway.")]
    DownstreamDependents { course: String, dependents: String },
}

impl PathwayError {
    pub fn error_code(&self) -> &'static str {
        match self {
            PathwayError::DuplicateEdge { .. } => "DUPLICATE_PATHWAY",
            PathwayError::ImmersiveTarget(_) => "IMMERSIVE_TARGET",
            PathwayError::CycleDetected { .. } => "CYCLE_DETECTED",
            PathwayError::DepthExceeded { .. } => "DEPTH_EXCEEDED",
            PathwayError::UnreachableFromImmersive(_) => "UNREACHABLE_FROM_IMMERSIVE",
            PathwayError::DownstreamDependents { .. } => "DOWNSTREAM_DEPENDENTS",
        }
    }

    pub fn kind(&self) -> CoreErrorKind {
        match self {
            PathwayError::DuplicateEdge { .. } => CoreErrorKind::Conflict,
            _ => CoreErrorKind::InvalidOperation,
        }
    }
}

impl From<PathwayError> for CoreError {
    fn from(err: PathwayError) -> Self {
        let code = err.error_code();
        CoreError::new(err.kind(), err.to_string()).with_field("rule", code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_maps_to_conflict() {
        let err = PathwayError::DuplicateEdge {
            prerequisite: "Cloud Immersive".to_string(),
            next: "AWS Architect".to_string(),
            order: 2,
        };
        let core: CoreError = err.into();
        assert_eq!(core.kind(), CoreErrorKind::Conflict);
        assert_eq!(core.field("rule"), Some("DUPLICATE_PATHWAY"));
        assert!(core.message().contains("\"Cloud Immersive\" → \"AWS Architect\""));
    }

    #[test]
    fn test_rule_violations_are_invalid_operations() {
        let errors = vec![
            PathwayError::ImmersiveTarget("A".to_string()),
            PathwayError::CycleDetected {
                prerequisite: "A".to_string(),
                next: "B".to_string(),
            },
            PathwayError::DepthExceeded {
                course: "A".to_string(),
                depth: 10,
                max_depth: 10,
            },
            PathwayError::UnreachableFromImmersive("A".to_string()),
            PathwayError::DownstreamDependents {
                course: "A".to_string(),
                dependents: "\"B\"".to_string(),
            },
        ];

        for err in errors {
            assert_eq!(CoreError::from(err).kind(), CoreErrorKind::InvalidOperation);
        }
    }
}
