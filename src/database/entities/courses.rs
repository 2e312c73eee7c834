use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::CoreResult;
use crate::pathway_graph::{display_code_for, CourseNode, CourseType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Display key, `CRS-<id>`, set right after the row exists
    #[sea_orm(unique)]
    pub course_code: Option<String>,
    pub course_name: String,
    pub course_type: String, // 'immersive', 'skill_based', 'exam_cert', 'completion_cert', 'paid'
    pub course_objectives: String,
    pub weeks: i32,
    pub certifications_badges: Option<String>,
    pub domain_id: i32,
    pub created_by: String,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::domains::Entity",
        from = "Column::DomainId",
        to = "super::domains::Column::Id"
    )]
    Domains,
    #[sea_orm(has_many = "super::course_job_roles::Entity")]
    CourseJobRoles,
}

impl Related<super::domains::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Domains.def()
    }
}

impl Related<super::course_job_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseJobRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn course_type(&self) -> CoreResult<CourseType> {
        self.course_type.parse()
    }

    pub fn display_code(&self) -> String {
        self.course_code
            .clone()
            .unwrap_or_else(|| display_code_for(self.id))
    }

    pub fn to_node(&self) -> CoreResult<CourseNode> {
        Ok(CourseNode {
            id: self.id,
            code: self.course_code.clone(),
            name: self.course_name.clone(),
            course_type: self.course_type()?,
        })
    }
}
