use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::audit_service::{AuditEntry, AuditService};
use crate::auth::{Actor, Authorizer, CapabilityAuthorizer, OwnedResource, ResourceKind};
use crate::database::entities::audit_logs::{AuditAction, AuditEntityType};
use crate::database::entities::{course_job_roles, courses, job_roles};
use crate::errors::{CoreError, CoreResult};

/// A course carries at most a primary and a secondary role
pub const MAX_JOB_ROLES_PER_COURSE: usize = 2;

/// A job role as attached to a course
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseJobRole {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub salary_range: Option<String>,
    pub is_primary: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRoleUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub salary_range: Option<String>,
}

#[derive(Clone)]
pub struct JobRoleService {
    db: DatabaseConnection,
    authorizer: CapabilityAuthorizer,
    audit: AuditService,
}

impl JobRoleService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            audit: AuditService::new(db.clone()),
            db,
            authorizer: CapabilityAuthorizer::default(),
        }
    }

    pub fn with_authorizer(mut self, authorizer: CapabilityAuthorizer) -> Self {
        self.authorizer = authorizer;
        self
    }

    pub async fn list_active(&self) -> CoreResult<Vec<job_roles::Model>> {
        let roles = job_roles::Entity::find()
            .filter(job_roles::Column::IsActive.eq(true))
            .order_by_asc(job_roles::Column::Title)
            .all(&self.db)
            .await?;
        Ok(roles)
    }

    pub async fn get_job_role(&self, id: i32) -> CoreResult<job_roles::Model> {
        job_roles::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("Job role", id.to_string()))
    }

    pub async fn create_job_role(
        &self,
        actor: &Actor,
        title: &str,
        description: Option<String>,
        salary_range: Option<String>,
    ) -> CoreResult<job_roles::Model> {
        let title = title.trim();
        self.authorizer
            .authorize(actor, &OwnedResource::unowned(ResourceKind::JobRole, title))?;
        if title.is_empty() {
            return Err(CoreError::validation("Title is required"));
        }

        let txn = self.db.begin().await?;
        ensure_unique_title(&txn, title, None).await?;

        let now = Utc::now();
        let role = job_roles::ActiveModel {
            title: Set(title.to_string()),
            description: Set(description),
            salary_range: Set(salary_range),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let role = role.insert(&txn).await?;
        txn.commit().await?;

        info!("Created job role {} ({}) by {}", role.id, role.title, actor.username);
        self.audit
            .record(
                AuditEntry::new(
                    actor,
                    AuditAction::Create,
                    AuditEntityType::JobRole,
                    role.id,
                    role.title.clone(),
                )
                .with_description(format!("Created job role: {}", role.title)),
            )
            .await;

        Ok(role)
    }

    pub async fn update_job_role(
        &self,
        actor: &Actor,
        id: i32,
        update: JobRoleUpdate,
    ) -> CoreResult<job_roles::Model> {
        let txn = self.db.begin().await?;
        let role = job_roles::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| CoreError::not_found("Job role", id.to_string()))?;

        self.authorizer
            .authorize(actor, &OwnedResource::unowned(ResourceKind::JobRole, &role.title))?;

        let mut changes = Vec::new();
        let mut active: job_roles::ActiveModel = role.clone().into();
        if let Some(title) = update.title.as_deref().map(str::trim) {
            if title.is_empty() {
                return Err(CoreError::validation("Title is required"));
            }
            if title != role.title {
                ensure_unique_title(&txn, title, Some(id)).await?;
                changes.push(format!("title: \"{}\" → \"{}\"", role.title, title));
                active.title = Set(title.to_string());
            }
        }
        if let Some(description) = update.description {
            changes.push("description".to_string());
            active.description = Set(Some(description));
        }
        if let Some(salary_range) = update.salary_range {
            changes.push("salary range".to_string());
            active.salary_range = Set(Some(salary_range));
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!("Updated job role {} by {}", id, actor.username);
        self.audit
            .record(
                AuditEntry::new(
                    actor,
                    AuditAction::Update,
                    AuditEntityType::JobRole,
                    id,
                    updated.title.clone(),
                )
                .with_description(format!("Updated job role: {}", changes.join(", "))),
            )
            .await;

        Ok(updated)
    }

    /// Soft delete; existing course associations are kept
    pub async fn delete_job_role(&self, actor: &Actor, id: i32) -> CoreResult<()> {
        let role = self.get_job_role(id).await?;
        self.authorizer
            .authorize(actor, &OwnedResource::unowned(ResourceKind::JobRole, &role.title))?;

        let title = role.title.clone();
        let mut active: job_roles::ActiveModel = role.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;

        info!("Deactivated job role {} ({}) by {}", id, title, actor.username);
        self.audit
            .record(
                AuditEntry::new(actor, AuditAction::Delete, AuditEntityType::JobRole, id, title.clone())
                    .with_description(format!("Deleted job role: {}", title)),
            )
            .await;

        Ok(())
    }

    /// Roles for a course, primary first
    pub async fn roles_for_course(&self, course_id: i32) -> CoreResult<Vec<CourseJobRole>> {
        load_course_job_roles(&self.db, course_id).await
    }

    /// Replace a course's roles; the first id becomes the primary role
    pub async fn assign_to_course(
        &self,
        actor: &Actor,
        course_id: i32,
        job_role_ids: &[i32],
    ) -> CoreResult<Vec<CourseJobRole>> {
        let txn = self.db.begin().await?;
        let course = courses::Entity::find_by_id(course_id)
            .one(&txn)
            .await?
            .ok_or_else(|| CoreError::not_found("Course", course_id.to_string()))?;

        self.authorizer.authorize(
            actor,
            &OwnedResource::new(ResourceKind::Course, &course.course_name, &course.created_by),
        )?;

        replace_course_job_roles(&txn, course_id, job_role_ids).await?;
        let roles = load_course_job_roles(&txn, course_id).await?;
        txn.commit().await?;

        let titles = roles.iter().map(|role| role.title.as_str()).collect::<Vec<_>>();
        info!("Assigned job roles {:?} to course {} by {}", titles, course_id, actor.username);
        self.audit
            .record(
                AuditEntry::new(
                    actor,
                    AuditAction::Update,
                    AuditEntityType::Course,
                    course_id,
                    course.course_name.clone(),
                )
                .with_description(format!("Updated course job roles: {}", titles.join(", "))),
            )
            .await;

        Ok(roles)
    }
}

async fn ensure_unique_title<C: ConnectionTrait>(
    conn: &C,
    title: &str,
    exclude_id: Option<i32>,
) -> CoreResult<()> {
    let existing = job_roles::Entity::find()
        .filter(job_roles::Column::Title.eq(title))
        .one(conn)
        .await?;

    match existing {
        Some(role) if Some(role.id) != exclude_id => Err(CoreError::conflict(
            "A job role with this title already exists",
        )
        .with_field("title", title)),
        _ => Ok(()),
    }
}

/// Drop every role link for the course and insert `job_role_ids` in order
pub(crate) async fn replace_course_job_roles<C: ConnectionTrait>(
    conn: &C,
    course_id: i32,
    job_role_ids: &[i32],
) -> CoreResult<()> {
    let mut ids: Vec<i32> = Vec::with_capacity(job_role_ids.len());
    for id in job_role_ids {
        if !ids.contains(id) {
            ids.push(*id);
        }
    }
    if ids.len() > MAX_JOB_ROLES_PER_COURSE {
        return Err(CoreError::validation(format!(
            "A course can have at most {} job roles (primary and secondary), got {}",
            MAX_JOB_ROLES_PER_COURSE,
            ids.len()
        )));
    }

    for id in &ids {
        let role = job_roles::Entity::find_by_id(*id).one(conn).await?;
        match role {
            Some(role) if role.is_active => {}
            _ => return Err(CoreError::not_found("Job role", id.to_string())),
        }
    }

    course_job_roles::Entity::delete_many()
        .filter(course_job_roles::Column::CourseId.eq(course_id))
        .exec(conn)
        .await?;

    let now = Utc::now();
    for (position, id) in ids.iter().enumerate() {
        course_job_roles::ActiveModel {
            course_id: Set(course_id),
            job_role_id: Set(*id),
            is_primary: Set(position == 0),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;
    }

    Ok(())
}

pub(crate) async fn load_course_job_roles<C: ConnectionTrait>(
    conn: &C,
    course_id: i32,
) -> CoreResult<Vec<CourseJobRole>> {
    let links = course_job_roles::Entity::find()
        .filter(course_job_roles::Column::CourseId.eq(course_id))
        .order_by_desc(course_job_roles::Column::IsPrimary)
        .order_by_asc(course_job_roles::Column::Id)
        .find_also_related(job_roles::Entity)
        .all(conn)
        .await?;

    Ok(links
        .into_iter()
        .filter_map(|(link, role)| {
            role.map(|role| CourseJobRole {
                id: role.id,
                title: role.title,
                description: role.description,
                salary_range: role.salary_range,
                is_primary: link.is_primary,
            })
        })
        .collect())
}
