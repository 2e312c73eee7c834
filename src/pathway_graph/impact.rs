use serde::{Deserialize, Serialize};

use super::{CourseNode, PathwayGraph};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedPathway {
    pub pathway_id: i32,
    pub prerequisite_course_id: i32,
    pub next_course_id: i32,
    pub description: String,
}

/// What deleting a course would do to the pathway graph
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteImpact {
    pub course_id: i32,
    pub can_delete: bool,
    pub requires_cascade: bool,
    pub affected_pathways: Vec<AffectedPathway>,
    /// Non-immersive courses left without any path back to an immersive root
    pub orphaned_courses: Vec<CourseNode>,
}

/// Every edge touching `course_id`, in store order, with readable descriptions
pub fn affected_pathways(graph: &PathwayGraph, course_id: i32) -> Vec<AffectedPathway> {
    graph
        .edges_touching(course_id)
        .into_iter()
        .map(|edge| AffectedPathway {
            pathway_id: edge.id,
            prerequisite_course_id: edge.prerequisite_course_id,
            next_course_id: edge.next_course_id,
            description: graph.describe_edge(edge),
        })
        .collect()
}

pub fn delete_impact(graph: &PathwayGraph, course_id: i32) -> DeleteImpact {
    let affected = affected_pathways(graph, course_id);
    let remaining = graph.without_course(course_id);

    let mut orphaned_courses: Vec<CourseNode> = Vec::new();
    for pathway in affected
        .iter()
        .filter(|pathway| pathway.prerequisite_course_id == course_id)
    {
        let Some(next) = graph.course(pathway.next_course_id) else {
            continue;
        };
        if next.is_immersive() || orphaned_courses.iter().any(|course| course.id == next.id) {
            continue;
        }
        // Only courses that were rooted before the deletion count as orphaned
        if graph.has_path_to_immersive(next.id) && !remaining.has_path_to_immersive(next.id) {
            orphaned_courses.push(next.clone());
        }
    }

    DeleteImpact {
        course_id,
        can_delete: affected.is_empty(),
        requires_cascade: !affected.is_empty(),
        affected_pathways: affected,
        orphaned_courses,
    }
}
