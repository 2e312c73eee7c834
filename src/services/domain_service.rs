use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{info, warn};

use super::audit_service::{AuditEntry, AuditService};
use crate::auth::{Actor, Authorizer, CapabilityAuthorizer, OwnedResource, ResourceKind};
use crate::database::entities::audit_logs::{AuditAction, AuditEntityType};
use crate::database::entities::{courses, domains};
use crate::errors::{CoreError, CoreResult};

#[derive(Clone)]
pub struct DomainService {
    db: DatabaseConnection,
    authorizer: CapabilityAuthorizer,
    audit: AuditService,
}

impl DomainService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            audit: AuditService::new(db.clone()),
            db,
            authorizer: CapabilityAuthorizer::default(),
        }
    }

    pub async fn list_active(&self) -> CoreResult<Vec<domains::Model>> {
        let domains = domains::Entity::find()
            .filter(domains::Column::IsActive.eq(true))
            .order_by_asc(domains::Column::Name)
            .all(&self.db)
            .await?;
        Ok(domains)
    }

    pub async fn get_domain(&self, id: i32) -> CoreResult<domains::Model> {
        domains::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("Domain", id.to_string()))
    }

    pub async fn create_domain(
        &self,
        actor: &Actor,
        name: &str,
        description: Option<String>,
    ) -> CoreResult<domains::Model> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("Domain name is required"));
        }

        let now = Utc::now();
        let domain = domains::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description),
            is_active: Set(true),
            created_by: Set(actor.username.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let domain = domain.insert(&self.db).await?;

        info!("Created domain {} ({}) by {}", domain.id, domain.name, actor.username);
        self.audit
            .record(
                AuditEntry::new(
                    actor,
                    AuditAction::Create,
                    AuditEntityType::Domain,
                    domain.id,
                    domain.name.clone(),
                )
                .with_description(format!("Created domain \"{}\"", domain.name)),
            )
            .await;

        Ok(domain)
    }

    pub async fn update_domain(
        &self,
        actor: &Actor,
        id: i32,
        name: &str,
        description: Option<String>,
    ) -> CoreResult<domains::Model> {
        let domain = self.active_domain(id).await?;
        self.authorizer.authorize(
            actor,
            &OwnedResource::new(ResourceKind::Domain, &domain.name, &domain.created_by),
        )?;

        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("Domain name is required"));
        }

        let previous_name = domain.name.clone();
        let mut active: domains::ActiveModel = domain.into();
        active.name = Set(name.to_string());
        active.description = Set(description);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await?;

        info!("Updated domain {} by {}", id, actor.username);
        let description = if previous_name == updated.name {
            format!("Updated domain \"{}\"", updated.name)
        } else {
            format!("Updated domain: name: \"{}\" → \"{}\"", previous_name, updated.name)
        };
        self.audit
            .record(
                AuditEntry::new(actor, AuditAction::Update, AuditEntityType::Domain, id, updated.name.clone())
                    .with_description(description),
            )
            .await;

        Ok(updated)
    }

    /// Soft delete, refused while any course still references the domain
    pub async fn delete_domain(&self, actor: &Actor, id: i32) -> CoreResult<()> {
        let txn = self.db.begin().await?;
        let domain = domains::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .filter(|domain| domain.is_active)
            .ok_or_else(|| CoreError::not_found("Domain", id.to_string()))?;

        self.authorizer.authorize(
            actor,
            &OwnedResource::new(ResourceKind::Domain, &domain.name, &domain.created_by),
        )?;

        let course_count = courses::Entity::find()
            .filter(courses::Column::DomainId.eq(id))
            .count(&txn)
            .await?;
        if course_count > 0 {
            warn!("Blocked delete of domain {}: {} courses attached", id, course_count);
            return Err(CoreError::invalid_operation(format!(
                "Cannot delete domain \"{}\": {} course(s) are using this domain",
                domain.name, course_count
            ))
            .with_field("courses", course_count.to_string()));
        }

        let name = domain.name.clone();
        let mut active: domains::ActiveModel = domain.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;
        txn.commit().await?;

        info!("Deactivated domain {} ({}) by {}", id, name, actor.username);
        self.audit
            .record(
                AuditEntry::new(actor, AuditAction::Delete, AuditEntityType::Domain, id, name.clone())
                    .with_description(format!("Deleted domain \"{}\"", name)),
            )
            .await;

        Ok(())
    }

    async fn active_domain(&self, id: i32) -> CoreResult<domains::Model> {
        domains::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .filter(|domain| domain.is_active)
            .ok_or_else(|| CoreError::not_found("Domain", id.to_string()))
    }
}
