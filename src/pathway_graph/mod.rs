//! Pathway graph engine
//!
//! Pure functions over an immutable snapshot of courses and pathway edges.
//! A snapshot is loaded once per request and every traversal (cycle, depth,
//! reachability, orphan analysis, forest building) walks it in memory.
//!
//! The expected shape is a forest of prerequisite chains rooted at immersive
//! courses. Stored data may still violate that shape (rows written by hand,
//! concurrent writers), so every walk carries a visited set and terminates on
//! cyclic input.

pub mod forest;
pub mod impact;
pub mod rules;
pub mod types;

use std::collections::{HashMap, HashSet, VecDeque};

pub use forest::{build_forest, overview, render_forest, PathwayOverview, PathwayTree};
pub use impact::{affected_pathways, delete_impact, AffectedPathway, DeleteImpact};
pub use rules::{validate_edge_removal, PathwayRules, MAX_PATHWAY_DEPTH};
pub use types::{display_code_for, CourseNode, CourseType, PathwayEdge};

#[derive(Clone, Debug, Default)]
pub struct PathwayGraph {
    courses: HashMap<i32, CourseNode>,
    edges: Vec<PathwayEdge>,
    outgoing: HashMap<i32, Vec<usize>>,
    incoming: HashMap<i32, Vec<usize>>,
}

impl PathwayGraph {
    pub fn new<C, E>(courses: C, edges: E) -> Self
    where
        C: IntoIterator<Item = CourseNode>,
        E: IntoIterator<Item = PathwayEdge>,
    {
        let courses: HashMap<i32, CourseNode> =
            courses.into_iter().map(|course| (course.id, course)).collect();
        let edges: Vec<PathwayEdge> = edges.into_iter().collect();

        let mut outgoing: HashMap<i32, Vec<usize>> = HashMap::new();
        let mut incoming: HashMap<i32, Vec<usize>> = HashMap::new();
        for (index, edge) in edges.iter().enumerate() {
            outgoing
                .entry(edge.prerequisite_course_id)
                .or_default()
                .push(index);
            incoming.entry(edge.next_course_id).or_default().push(index);
        }

        Self {
            courses,
            edges,
            outgoing,
            incoming,
        }
    }

    pub fn course(&self, course_id: i32) -> Option<&CourseNode> {
        self.courses.get(&course_id)
    }

    pub fn courses(&self) -> impl Iterator<Item = &CourseNode> {
        self.courses.values()
    }

    pub fn edges(&self) -> &[PathwayEdge] {
        &self.edges
    }

    pub fn edge(&self, pathway_id: i32) -> Option<&PathwayEdge> {
        self.edges.iter().find(|edge| edge.id == pathway_id)
    }

    pub fn find_edge(&self, prerequisite_course_id: i32, next_course_id: i32) -> Option<&PathwayEdge> {
        self.next_steps_of(prerequisite_course_id)
            .find(|edge| edge.next_course_id == next_course_id)
    }

    /// Edges pointing into `course_id`
    pub fn prerequisites_of(&self, course_id: i32) -> impl Iterator<Item = &PathwayEdge> + '_ {
        self.incoming
            .get(&course_id)
            .into_iter()
            .flatten()
            .map(move |&index| &self.edges[index])
    }

    /// Edges leaving `course_id`
    pub fn next_steps_of(&self, course_id: i32) -> impl Iterator<Item = &PathwayEdge> + '_ {
        self.outgoing
            .get(&course_id)
            .into_iter()
            .flatten()
            .map(move |&index| &self.edges[index])
    }

    pub fn edges_touching(&self, course_id: i32) -> Vec<&PathwayEdge> {
        self.edges
            .iter()
            .filter(|edge| edge.touches(course_id))
            .collect()
    }

    pub fn is_immersive(&self, course_id: i32) -> bool {
        self.course(course_id)
            .map(CourseNode::is_immersive)
            .unwrap_or(false)
    }

    /// Readable name for messages, never the bare surrogate key when avoidable
    pub fn display_name(&self, course_id: i32) -> String {
        match self.course(course_id) {
            Some(course) if !course.name.trim().is_empty() => course.name.clone(),
            Some(CourseNode {
                code: Some(code), ..
            }) => code.clone(),
            _ => format!("Course {}", course_id),
        }
    }

    pub fn describe_edge(&self, edge: &PathwayEdge) -> String {
        format!(
            "\"{}\" → \"{}\"",
            self.display_name(edge.prerequisite_course_id),
            self.display_name(edge.next_course_id)
        )
    }

    /// Snapshot with the course and every edge touching it removed
    pub fn without_course(&self, course_id: i32) -> PathwayGraph {
        PathwayGraph::new(
            self.courses
                .values()
                .filter(|course| course.id != course_id)
                .cloned(),
            self.edges
                .iter()
                .filter(|edge| !edge.touches(course_id))
                .cloned(),
        )
    }

    /// Whether `target` is `start` or one of its prerequisite ancestors
    pub fn is_in_prerequisite_chain(&self, start: i32, target: i32) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([start]);

        while let Some(course_id) = queue.pop_front() {
            if course_id == target {
                return true;
            }
            if !visited.insert(course_id) {
                continue;
            }
            for edge in self.prerequisites_of(course_id) {
                if !visited.contains(&edge.prerequisite_course_id) {
                    queue.push_back(edge.prerequisite_course_id);
                }
            }
        }

        false
    }

    /// Longest backward chain from `course_id` to an immersive root.
    ///
    /// Immersive courses and courses without prerequisites sit at depth 0.
    /// A course revisited within the same upward path contributes 0.
    pub fn depth_from_root(&self, course_id: i32) -> usize {
        self.depth_from_root_within(course_id, usize::MAX)
    }

    /// [`PathwayGraph::depth_from_root`] capped at `limit`. The walk stops as
    /// soon as one branch reaches the cap.
    pub fn depth_from_root_within(&self, course_id: i32, limit: usize) -> usize {
        let mut walk = DepthWalk {
            limit,
            settled: HashMap::new(),
            on_path: HashSet::new(),
        };
        self.depth_along_path(course_id, &mut walk)
    }

    fn depth_along_path(&self, course_id: i32, walk: &mut DepthWalk) -> usize {
        if let Some(&depth) = walk.settled.get(&course_id) {
            return depth;
        }
        if !walk.on_path.insert(course_id) {
            return 0;
        }

        let depth = match self.course(course_id) {
            None => 0,
            Some(course) if course.is_immersive() => 0,
            Some(_) => {
                let prerequisites: Vec<i32> = self
                    .prerequisites_of(course_id)
                    .map(|edge| edge.prerequisite_course_id)
                    .collect();

                let mut deepest = 0;
                for prerequisite in prerequisites {
                    let depth = self
                        .depth_along_path(prerequisite, walk)
                        .saturating_add(1);
                    deepest = deepest.max(depth);
                    if deepest >= walk.limit {
                        break;
                    }
                }
                deepest.min(walk.limit)
            }
        };

        walk.on_path.remove(&course_id);
        walk.settled.insert(course_id, depth);
        depth
    }

    /// Whether any backward path from `course_id` reaches an immersive course
    pub fn has_path_to_immersive(&self, course_id: i32) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([course_id]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            match self.course(current) {
                None => continue,
                Some(course) if course.is_immersive() => return true,
                Some(_) => {}
            }
            queue.extend(
                self.prerequisites_of(current)
                    .map(|edge| edge.prerequisite_course_id),
            );
        }

        false
    }
}

/// Per-call state of the depth walk. `settled` holds finished courses, and
/// `on_path` breaks stored cycles.
struct DepthWalk {
    limit: usize,
    settled: HashMap<i32, usize>,
    on_path: HashSet<i32>,
}
