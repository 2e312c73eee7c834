use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::{debug, warn};

use crate::auth::Actor;
use crate::config::DEFAULT_AUDIT_LOG_LIMIT;
use crate::database::entities::audit_logs::{self, AuditAction, AuditEntityType};
use crate::errors::CoreResult;

/// A mutation to be recorded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditEntry {
    pub admin_username: String,
    pub action: AuditAction,
    pub entity_type: AuditEntityType,
    pub entity_id: i32,
    pub entity_name: Option<String>,
    pub change_description: Option<String>,
}

impl AuditEntry {
    pub fn new(
        actor: &Actor,
        action: AuditAction,
        entity_type: AuditEntityType,
        entity_id: i32,
        entity_name: impl Into<String>,
    ) -> Self {
        Self {
            admin_username: actor.username.clone(),
            action,
            entity_type,
            entity_id,
            entity_name: Some(entity_name.into()),
            change_description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.change_description = Some(description.into());
        self
    }
}

#[derive(Clone)]
pub struct AuditService {
    db: DatabaseConnection,
}

impl AuditService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Append an audit record. A failed write is logged and swallowed so it
    /// can never undo or block the mutation it describes.
    pub async fn record(&self, entry: AuditEntry) -> Option<audit_logs::Model> {
        let record = audit_logs::ActiveModel {
            admin_username: Set(entry.admin_username.clone()),
            action: Set(entry.action.into()),
            entity_type: Set(entry.entity_type.into()),
            entity_id: Set(entry.entity_id),
            entity_name: Set(entry.entity_name.clone()),
            change_description: Set(entry.change_description.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        match record.insert(&self.db).await {
            Ok(model) => {
                debug!(
                    "Audit {} {} {} by {}",
                    entry.action, entry.entity_type, entry.entity_id, entry.admin_username
                );
                Some(model)
            }
            Err(e) => {
                warn!(
                    "Failed to write audit record for {} {} {}: {}",
                    entry.action, entry.entity_type, entry.entity_id, e
                );
                None
            }
        }
    }

    /// Newest first
    pub async fn recent(&self, limit: Option<u64>) -> CoreResult<Vec<audit_logs::Model>> {
        let records = audit_logs::Entity::find()
            .order_by_desc(audit_logs::Column::Id)
            .limit(limit.unwrap_or(DEFAULT_AUDIT_LOG_LIMIT))
            .all(&self.db)
            .await?;
        Ok(records)
    }

    pub async fn for_entity(
        &self,
        entity_type: AuditEntityType,
        entity_id: i32,
    ) -> CoreResult<Vec<audit_logs::Model>> {
        let records = audit_logs::Entity::find()
            .filter(audit_logs::Column::EntityType.eq(entity_type.as_str()))
            .filter(audit_logs::Column::EntityId.eq(entity_id))
            .order_by_desc(audit_logs::Column::Id)
            .all(&self.db)
            .await?;
        Ok(records)
    }
}
