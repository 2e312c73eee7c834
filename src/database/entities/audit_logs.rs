use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};

/// Append-only record of a successful mutation. Rows are never updated.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub admin_username: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: i32,
    pub entity_name: Option<String>,
    pub change_description: Option<String>,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn action(&self) -> CoreResult<AuditAction> {
        self.action.parse()
    }

    pub fn entity_type(&self) -> CoreResult<AuditEntityType> {
        self.entity_type.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }
}

impl From<AuditAction> for String {
    fn from(action: AuditAction) -> Self {
        action.as_str().to_string()
    }
}

impl FromStr for AuditAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(AuditAction::Create),
            "update" => Ok(AuditAction::Update),
            "delete" => Ok(AuditAction::Delete),
            other => Err(CoreError::internal(format!("Unknown audit action in store: {}", other))
                .with_field("action", other)),
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEntityType {
    Course,
    Pathway,
    Domain,
    JobRole,
}

impl AuditEntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEntityType::Course => "course",
            AuditEntityType::Pathway => "pathway",
            AuditEntityType::Domain => "domain",
            AuditEntityType::JobRole => "job_role",
        }
    }
}

impl From<AuditEntityType> for String {
    fn from(entity_type: AuditEntityType) -> Self {
        entity_type.as_str().to_string()
    }
}

impl FromStr for AuditEntityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "course" => Ok(AuditEntityType::Course),
            "pathway" => Ok(AuditEntityType::Pathway),
            "domain" => Ok(AuditEntityType::Domain),
            "job_role" => Ok(AuditEntityType::JobRole),
            other => Err(
                CoreError::internal(format!("Unknown audit entity type in store: {}", other))
                    .with_field("entity_type", other),
            ),
        }
    }
}

impl fmt::Display for AuditEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::errors::CoreErrorKind;

    fn record(action: &str, entity_type: &str) -> Model {
        Model {
            id: 1,
            admin_username: "alice".to_string(),
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: 7,
            entity_name: None,
            change_description: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_entity_type_strings() {
        assert_eq!(String::from(AuditEntityType::JobRole), "job_role");
        assert_eq!("pathway".parse::<AuditEntityType>().unwrap(), AuditEntityType::Pathway);
        assert_eq!("course".parse::<AuditEntityType>().unwrap(), AuditEntityType::Course);
    }

    #[test]
    fn test_action_strings() {
        assert_eq!(String::from(AuditAction::Delete), "delete");
        assert_eq!("create".parse::<AuditAction>().unwrap(), AuditAction::Create);
        assert_eq!("update".parse::<AuditAction>().unwrap(), AuditAction::Update);
    }

    #[test]
    fn test_unknown_stored_values_are_errors() {
        let row = record("archive", "curriculum");

        let err = row.action().unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Internal);
        assert!(err.message().contains("archive"));

        let err = row.entity_type().unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Internal);
        assert!(err.message().contains("curriculum"));
    }

    #[test]
    fn test_known_stored_values_read_back() {
        let row = record("delete", "job_role");
        assert_eq!(row.action().unwrap(), AuditAction::Delete);
        assert_eq!(row.entity_type().unwrap(), AuditEntityType::JobRole);
    }
}
