use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::pathway_graph::PathwayEdge;

/// Prerequisite → next-course link. Graph invariants are enforced by the
/// pathway engine, not by the schema.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pathways")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub prerequisite_course_id: i32,
    pub next_course_id: i32,
    pub order: i32,
    pub created_by: String,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::PrerequisiteCourseId",
        to = "super::courses::Column::Id"
    )]
    PrerequisiteCourse,
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::NextCourseId",
        to = "super::courses::Column::Id"
    )]
    NextCourse,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for PathwayEdge {
    fn from(model: &Model) -> Self {
        PathwayEdge {
            id: model.id,
            prerequisite_course_id: model.prerequisite_course_id,
            next_course_id: model.next_course_id,
            order: model.order,
            created_by: model.created_by.clone(),
        }
    }
}

impl From<Model> for PathwayEdge {
    fn from(model: Model) -> Self {
        PathwayEdge::from(&model)
    }
}
