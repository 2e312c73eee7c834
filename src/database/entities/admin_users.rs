use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::auth::{Actor, AdminRole};
use crate::errors::CoreResult;

/// Administrator directory. Credentials are verified elsewhere; the catalog
/// only needs the username and role.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin_users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub email: String,
    pub role: String, // 'global_admin', 'admin'
    pub is_active: bool,
    pub created_by: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn role(&self) -> CoreResult<AdminRole> {
        self.role.parse()
    }

    pub fn to_actor(&self) -> CoreResult<Actor> {
        Ok(Actor::new(self.username.clone(), self.role()?))
    }
}
