use tracing::debug;

use super::{CourseNode, PathwayEdge, PathwayGraph};
use crate::errors::{PathwayError, PathwayResult};

pub const MAX_PATHWAY_DEPTH: usize = 10;

/// Invariants every new pathway edge must satisfy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathwayRules {
    pub max_depth: usize,
}

impl Default for PathwayRules {
    fn default() -> Self {
        Self {
            max_depth: MAX_PATHWAY_DEPTH,
        }
    }
}

impl PathwayRules {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Check a proposed `prerequisite → next` edge against the snapshot.
    ///
    /// Checks run in a fixed order and the first failure wins: duplicate pair,
    /// immersive target, cycle, depth, reachability to an immersive root.
    pub fn validate_new_edge(
        &self,
        graph: &PathwayGraph,
        prerequisite: &CourseNode,
        next: &CourseNode,
    ) -> PathwayResult<()> {
        if let Some(existing) = graph.find_edge(prerequisite.id, next.id) {
            return Err(PathwayError::DuplicateEdge {
                prerequisite: prerequisite.name.clone(),
                next: next.name.clone(),
                order: existing.order,
            });
        }

        if next.is_immersive() {
            return Err(PathwayError::ImmersiveTarget(next.name.clone()));
        }

        if graph.is_in_prerequisite_chain(prerequisite.id, next.id) {
            return Err(PathwayError::CycleDetected {
                prerequisite: prerequisite.name.clone(),
                next: next.name.clone(),
            });
        }

        let depth = graph.depth_from_root_within(prerequisite.id, self.max_depth);
        debug!(
            "Pathway depth of course {} is {} (max {})",
            prerequisite.id, depth, self.max_depth
        );
        if depth >= self.max_depth {
            return Err(PathwayError::DepthExceeded {
                course: prerequisite.name.clone(),
                depth,
                max_depth: self.max_depth,
            });
        }

        if !next.is_immersive() && !graph.has_path_to_immersive(prerequisite.id) {
            return Err(PathwayError::UnreachableFromImmersive(
                prerequisite.name.clone(),
            ));
        }

        Ok(())
    }
}

/// An edge may go if its target has nothing depending on it, or if another
/// incoming edge keeps the target attached.
pub fn validate_edge_removal(graph: &PathwayGraph, edge: &PathwayEdge) -> PathwayResult<()> {
    let downstream: Vec<&PathwayEdge> = graph.next_steps_of(edge.next_course_id).collect();
    if downstream.is_empty() {
        return Ok(());
    }

    let has_alternative = graph
        .prerequisites_of(edge.next_course_id)
        .any(|incoming| incoming.id != edge.id);
    if has_alternative {
        return Ok(());
    }

    let dependents = downstream
        .iter()
        .map(|dependent| format!("\"{}\"", graph.display_name(dependent.next_course_id)))
        .collect::<Vec<_>>()
        .join(", ");

    Err(PathwayError::DownstreamDependents {
        course: graph.display_name(edge.next_course_id),
        dependents,
    })
}
