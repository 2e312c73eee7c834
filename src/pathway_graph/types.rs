use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseType {
    Immersive,
    SkillBased,
    ExamCert,
    CompletionCert,
    Paid,
}

impl CourseType {
    pub const ALL: [CourseType; 5] = [
        CourseType::Immersive,
        CourseType::SkillBased,
        CourseType::ExamCert,
        CourseType::CompletionCert,
        CourseType::Paid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CourseType::Immersive => "immersive",
            CourseType::SkillBased => "skill_based",
            CourseType::ExamCert => "exam_cert",
            CourseType::CompletionCert => "completion_cert",
            CourseType::Paid => "paid",
        }
    }

    /// Only immersive courses may root a pathway
    pub fn is_immersive(&self) -> bool {
        matches!(self, CourseType::Immersive)
    }
}

impl FromStr for CourseType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CourseType::ALL
            .iter()
            .copied()
            .find(|course_type| course_type.as_str() == s.trim())
            .ok_or_else(|| CoreError::validation(format!("Invalid course type: {}", s)))
    }
}

impl fmt::Display for CourseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display key of a course, `CRS-<id>`
pub fn display_code_for(id: i32) -> String {
    format!("CRS-{}", id)
}

/// The slice of a course the graph engine needs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseNode {
    pub id: i32,
    pub code: Option<String>,
    pub name: String,
    pub course_type: CourseType,
}

impl CourseNode {
    pub fn new(id: i32, name: impl Into<String>, course_type: CourseType) -> Self {
        Self {
            id,
            code: Some(display_code_for(id)),
            name: name.into(),
            course_type,
        }
    }

    pub fn is_immersive(&self) -> bool {
        self.course_type.is_immersive()
    }
}

/// A directed prerequisite → next-course link
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwayEdge {
    pub id: i32,
    pub prerequisite_course_id: i32,
    pub next_course_id: i32,
    pub order: i32,
    pub created_by: String,
}

impl PathwayEdge {
    pub fn new(id: i32, prerequisite_course_id: i32, next_course_id: i32, order: i32) -> Self {
        Self {
            id,
            prerequisite_course_id,
            next_course_id,
            order,
            created_by: String::new(),
        }
    }

    pub fn touches(&self, course_id: i32) -> bool {
        self.prerequisite_course_id == course_id || self.next_course_id == course_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_type_round_trips_through_str() {
        for course_type in CourseType::ALL {
            assert_eq!(course_type.as_str().parse::<CourseType>().unwrap(), course_type);
        }
        assert!("bootcamp".parse::<CourseType>().is_err());
    }

    #[test]
    fn test_course_type_serde_uses_snake_case() {
        let json = serde_json::to_string(&CourseType::CompletionCert).unwrap();
        assert_eq!(json, "\"completion_cert\"");
    }

    #[test]
    fn test_course_node_uses_shared_display_code() {
        let node = CourseNode::new(12, "Network Defense", CourseType::SkillBased);
        assert_eq!(node.code.as_deref(), Some("CRS-12"));
        assert_eq!(node.code, Some(display_code_for(12)));
    }

    #[test]
    fn test_edge_touches_both_endpoints() {
        let edge = PathwayEdge::new(1, 10, 20, 1);
        assert!(edge.touches(10));
        assert!(edge.touches(20));
        assert!(!edge.touches(30));
    }
}
