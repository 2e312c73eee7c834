use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Join row; a course has at most a primary and a secondary role
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course_job_roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub course_id: i32,
    pub job_role_id: i32,
    pub is_primary: bool,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id",
        on_delete = "Cascade"
    )]
    Courses,
    #[sea_orm(
        belongs_to = "super::job_roles::Entity",
        from = "Column::JobRoleId",
        to = "super::job_roles::Column::Id"
    )]
    JobRoles,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Courses.def()
    }
}

impl Related<super::job_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
