use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::audit_service::{AuditEntry, AuditService};
use super::job_role_service::replace_course_job_roles;
use crate::auth::{Actor, Authorizer, CapabilityAuthorizer, OwnedResource, ResourceKind};
use crate::database::entities::audit_logs::{AuditAction, AuditEntityType};
use crate::database::entities::{courses, domains, pathways};
use crate::errors::{CoreError, CoreResult};
use crate::pathway_graph::{display_code_for, CourseType};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourse {
    pub course_name: String,
    pub course_type: CourseType,
    pub domain_id: i32,
    pub course_objectives: String,
    pub weeks: i32,
    pub certifications_badges: Option<String>,
    /// First id is the primary role
    #[serde(default)]
    pub job_role_ids: Vec<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseUpdate {
    pub course_name: Option<String>,
    pub course_type: Option<CourseType>,
    pub course_objectives: Option<String>,
    pub weeks: Option<i32>,
    pub certifications_badges: Option<String>,
    /// `Some` replaces the course's roles, `Some(vec![])` clears them
    pub job_role_ids: Option<Vec<i32>>,
}

#[derive(Clone)]
pub struct CourseService {
    db: DatabaseConnection,
    authorizer: CapabilityAuthorizer,
    audit: AuditService,
}

impl CourseService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            audit: AuditService::new(db.clone()),
            db,
            authorizer: CapabilityAuthorizer::default(),
        }
    }

    pub async fn list_courses(&self) -> CoreResult<Vec<courses::Model>> {
        let courses = courses::Entity::find()
            .order_by_asc(courses::Column::Id)
            .all(&self.db)
            .await?;
        Ok(courses)
    }

    pub async fn get_course(&self, id: i32) -> CoreResult<courses::Model> {
        courses::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("Course", id.to_string()))
    }

    /// Look up by display key, e.g. `CRS-12`
    pub async fn get_course_by_code(&self, code: &str) -> CoreResult<courses::Model> {
        courses::Entity::find()
            .filter(courses::Column::CourseCode.eq(code.trim()))
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("Course", code))
    }

    /// Case-insensitive name match
    pub async fn check_duplicate_name(&self, course_name: &str) -> CoreResult<Option<courses::Model>> {
        find_by_name(&self.db, course_name, None).await
    }

    pub async fn create_course(&self, actor: &Actor, input: NewCourse) -> CoreResult<courses::Model> {
        let course_name = input.course_name.trim().to_string();
        if course_name.is_empty() {
            return Err(CoreError::validation("Course name is required"));
        }
        validate_weeks(input.weeks)?;

        let txn = self.db.begin().await?;

        if let Some(duplicate) = find_by_name(&txn, &course_name, None).await? {
            return Err(CoreError::conflict(format!(
                "A course with the name \"{}\" already exists (ID: {})",
                course_name,
                duplicate.display_code()
            ))
            .with_field("course_id", duplicate.display_code()));
        }

        let domain = domains::Entity::find_by_id(input.domain_id).one(&txn).await?;
        match domain {
            Some(domain) if domain.is_active => {}
            _ => return Err(CoreError::not_found("Domain", input.domain_id.to_string())),
        }

        let now = Utc::now();
        let course = courses::ActiveModel {
            course_code: Set(None),
            course_name: Set(course_name.clone()),
            course_type: Set(input.course_type.as_str().to_string()),
            course_objectives: Set(input.course_objectives),
            weeks: Set(input.weeks),
            certifications_badges: Set(input.certifications_badges),
            domain_id: Set(input.domain_id),
            created_by: Set(actor.username.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let course = course.insert(&txn).await?;

        // The display key needs the generated id
        let mut active: courses::ActiveModel = course.clone().into();
        active.course_code = Set(Some(display_code_for(course.id)));
        let course = active.update(&txn).await?;

        if !input.job_role_ids.is_empty() {
            replace_course_job_roles(&txn, course.id, &input.job_role_ids).await?;
        }
        txn.commit().await?;

        info!(
            "Created course {} ({}) by {}",
            course.display_code(),
            course.course_name,
            actor.username
        );
        self.audit
            .record(
                AuditEntry::new(
                    actor,
                    AuditAction::Create,
                    AuditEntityType::Course,
                    course.id,
                    course.course_name.clone(),
                )
                .with_description(format!(
                    "Created course \"{}\" ({}, {} weeks)",
                    course.course_name, input.course_type, course.weeks
                )),
            )
            .await;

        Ok(course)
    }

    pub async fn update_course(
        &self,
        actor: &Actor,
        id: i32,
        update: CourseUpdate,
    ) -> CoreResult<courses::Model> {
        let txn = self.db.begin().await?;
        let course = courses::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| CoreError::not_found("Course", id.to_string()))?;

        self.authorizer.authorize(
            actor,
            &OwnedResource::new(ResourceKind::Course, &course.course_name, &course.created_by),
        )?;

        let mut changes = Vec::new();
        let mut active: courses::ActiveModel = course.clone().into();

        if let Some(name) = update.course_name.as_deref().map(str::trim) {
            if name.is_empty() {
                return Err(CoreError::validation("Course name is required"));
            }
            if name != course.course_name {
                if let Some(duplicate) = find_by_name(&txn, name, Some(id)).await? {
                    return Err(CoreError::conflict(format!(
                        "A course with the name \"{}\" already exists (ID: {})",
                        name,
                        duplicate.display_code()
                    )));
                }
                changes.push(format!("name: \"{}\" → \"{}\"", course.course_name, name));
                active.course_name = Set(name.to_string());
            }
        }

        if let Some(weeks) = update.weeks {
            validate_weeks(weeks)?;
            if weeks != course.weeks {
                changes.push(format!("weeks: {} → {}", course.weeks, weeks));
                active.weeks = Set(weeks);
            }
        }

        if let Some(course_type) = update.course_type {
            let current = course.course_type()?;
            if course_type != current {
                ensure_type_change_keeps_shape(&txn, &course, course_type).await?;
                changes.push(format!("type: {} → {}", current, course_type));
                active.course_type = Set(course_type.as_str().to_string());
            }
        }

        if let Some(objectives) = update.course_objectives {
            active.course_objectives = Set(objectives);
        }
        if let Some(certifications) = update.certifications_badges {
            active.certifications_badges = Set(Some(certifications));
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        if let Some(job_role_ids) = &update.job_role_ids {
            replace_course_job_roles(&txn, id, job_role_ids).await?;
        }
        txn.commit().await?;

        info!("Updated course {} by {}", updated.display_code(), actor.username);
        let description = if changes.is_empty() {
            format!("Updated course \"{}\"", updated.course_name)
        } else {
            format!("Updated course: {}", changes.join(", "))
        };
        self.audit
            .record(
                AuditEntry::new(
                    actor,
                    AuditAction::Update,
                    AuditEntityType::Course,
                    id,
                    updated.course_name.clone(),
                )
                .with_description(description),
            )
            .await;

        Ok(updated)
    }
}

fn validate_weeks(weeks: i32) -> CoreResult<()> {
    if weeks < 1 {
        return Err(CoreError::validation(format!("Weeks must be at least 1, got {}", weeks))
            .with_field("weeks", weeks.to_string()));
    }
    Ok(())
}

async fn find_by_name<C: ConnectionTrait>(
    conn: &C,
    course_name: &str,
    exclude_id: Option<i32>,
) -> CoreResult<Option<courses::Model>> {
    let mut query = courses::Entity::find().filter(
        Expr::expr(Func::lower(Expr::col(courses::Column::CourseName)))
            .eq(course_name.trim().to_lowercase()),
    );
    if let Some(id) = exclude_id {
        query = query.filter(courses::Column::Id.ne(id));
    }
    Ok(query.one(conn).await?)
}

/// Immersive courses are roots only: a course that is an edge target cannot
/// become immersive, and an immersive course with next steps cannot stop being
/// one without stranding them.
async fn ensure_type_change_keeps_shape<C: ConnectionTrait>(
    conn: &C,
    course: &courses::Model,
    new_type: CourseType,
) -> CoreResult<()> {
    if new_type.is_immersive() {
        let incoming = pathways::Entity::find()
            .filter(pathways::Column::NextCourseId.eq(course.id))
            .count(conn)
            .await?;
        if incoming > 0 {
            warn!("Rejected immersive type change for course {}", course.id);
            return Err(CoreError::invalid_operation(format!(
                "Cannot make \"{}\" immersive: it is the next step of {} pathway(s) and immersive courses can only be entry points",
                course.course_name, incoming
            )));
        }
    } else if course.course_type()?.is_immersive() {
        let outgoing = pathways::Entity::find()
            .filter(pathways::Column::PrerequisiteCourseId.eq(course.id))
            .count(conn)
            .await?;
        if outgoing > 0 {
            warn!("Rejected non-immersive type change for course {}", course.id);
            return Err(CoreError::invalid_operation(format!(
                "Cannot change the type of \"{}\": it is the entry point of {} pathway(s)",
                course.course_name, outgoing
            )));
        }
    }
    Ok(())
}
