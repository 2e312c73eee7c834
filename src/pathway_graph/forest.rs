use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::{CourseNode, CourseType, PathwayEdge};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwayTree {
    pub course: CourseNode,
    /// Edge that led here, `None` for an immersive root
    pub pathway_id: Option<i32>,
    pub order: Option<i32>,
    pub depth: usize,
    pub children: Vec<PathwayTree>,
}

impl PathwayTree {
    /// Number of nodes in this subtree, including itself
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(PathwayTree::size).sum::<usize>()
    }
}

/// Per-entry-point summary for the catalogue landing page
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwayOverview {
    pub immersive: CourseNode,
    /// Distinct courses reachable from the entry point, the entry point included
    pub total_courses: usize,
    pub direct_next_steps: usize,
    /// Distinct non-immersive course types reachable, in discovery order
    pub course_types: Vec<CourseType>,
}

struct ForestIndex<'a> {
    courses: HashMap<i32, &'a CourseNode>,
    by_prerequisite: IndexMap<i32, Vec<&'a PathwayEdge>>,
}

impl<'a> ForestIndex<'a> {
    fn new(courses: &'a [CourseNode], edges: &'a [PathwayEdge]) -> Self {
        let mut by_prerequisite: IndexMap<i32, Vec<&PathwayEdge>> = IndexMap::new();
        for edge in edges {
            by_prerequisite
                .entry(edge.prerequisite_course_id)
                .or_default()
                .push(edge);
        }
        // Stable sort keeps insertion order among equal orders
        for siblings in by_prerequisite.values_mut() {
            siblings.sort_by_key(|edge| edge.order);
        }

        Self {
            courses: courses.iter().map(|course| (course.id, course)).collect(),
            by_prerequisite,
        }
    }

    fn children(&self, course_id: i32) -> &[&'a PathwayEdge] {
        self.by_prerequisite
            .get(&course_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn expand(
        &self,
        course: &CourseNode,
        via: Option<&PathwayEdge>,
        depth: usize,
        on_path: &mut HashSet<i32>,
    ) -> Option<PathwayTree> {
        if !on_path.insert(course.id) {
            return None;
        }

        let mut children = Vec::new();
        for edge in self.children(course.id) {
            let Some(child) = self.courses.get(&edge.next_course_id) else {
                continue;
            };
            if let Some(subtree) = self.expand(child, Some(*edge), depth + 1, on_path) {
                children.push(subtree);
            }
        }

        on_path.remove(&course.id);

        Some(PathwayTree {
            course: course.clone(),
            pathway_id: via.map(|edge| edge.id),
            order: via.map(|edge| edge.order),
            depth,
            children,
        })
    }
}

/// Build the display forest: one tree per immersive course, children ordered
/// by ascending `order`. A course already on the current descent path is
/// pruned, so stored cycles cannot recurse forever.
pub fn build_forest(courses: &[CourseNode], edges: &[PathwayEdge]) -> Vec<PathwayTree> {
    let index = ForestIndex::new(courses, edges);

    courses
        .iter()
        .filter(|course| course.is_immersive())
        .filter_map(|root| index.expand(root, None, 0, &mut HashSet::new()))
        .collect()
}

pub fn overview(courses: &[CourseNode], edges: &[PathwayEdge]) -> Vec<PathwayOverview> {
    let index = ForestIndex::new(courses, edges);

    courses
        .iter()
        .filter(|course| course.is_immersive())
        .map(|root| {
            let mut visited = HashSet::new();
            let mut course_types = IndexSet::new();
            let mut stack = vec![root.id];

            while let Some(course_id) = stack.pop() {
                if !visited.insert(course_id) {
                    continue;
                }
                if let Some(course) = index.courses.get(&course_id) {
                    if !course.is_immersive() {
                        course_types.insert(course.course_type);
                    }
                }
                for edge in index.children(course_id).iter().rev() {
                    stack.push(edge.next_course_id);
                }
            }

            PathwayOverview {
                immersive: root.clone(),
                total_courses: visited.len(),
                direct_next_steps: index.children(root.id).len(),
                course_types: course_types.into_iter().collect(),
            }
        })
        .collect()
}

/// Indented text rendering with sibling order numbers
pub fn render_forest(forest: &[PathwayTree]) -> String {
    fn render(tree: &PathwayTree, out: &mut String) {
        let indent = "  ".repeat(tree.depth);
        let code = tree.course.code.as_deref().unwrap_or("-");
        let _ = match tree.order {
            Some(order) => writeln!(
                out,
                "{}{}. {} [{}] ({})",
                indent, order, tree.course.name, code, tree.course.course_type
            ),
            None => writeln!(
                out,
                "{}{} [{}] ({})",
                indent, tree.course.name, code, tree.course.course_type
            ),
        };
        for child in &tree.children {
            render(child, out);
        }
    }

    let mut out = String::new();
    for tree in forest {
        render(tree, &mut out);
    }
    out
}
