use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::audit_service::{AuditEntry, AuditService};
use super::snapshot::load_pathway_graph;
use crate::auth::{Actor, Authorizer, CapabilityAuthorizer, OwnedResource, ResourceKind};
use crate::database::entities::audit_logs::{AuditAction, AuditEntityType};
use crate::database::entities::{course_job_roles, courses, pathways};
use crate::errors::{CoreError, CoreResult};
use crate::pathway_graph::{
    affected_pathways, delete_impact, validate_edge_removal, AffectedPathway, DeleteImpact,
    PathwayEdge, PathwayGraph, PathwayRules,
};

/// Result of a course deletion, with the edges the cascade removed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CourseDeletion {
    pub course: courses::Model,
    pub removed_pathways: Vec<AffectedPathway>,
}

/// Mutations of the prerequisite graph.
///
/// Every mutation reads one snapshot of all courses and edges inside a
/// transaction, validates against it in memory, and writes within the same
/// transaction. Audit records are appended after commit and never fail the
/// mutation.
#[derive(Clone)]
pub struct PathwayService {
    db: DatabaseConnection,
    rules: PathwayRules,
    authorizer: CapabilityAuthorizer,
    audit: AuditService,
}

impl PathwayService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            audit: AuditService::new(db.clone()),
            db,
            rules: PathwayRules::default(),
            authorizer: CapabilityAuthorizer::default(),
        }
    }

    pub fn with_rules(mut self, rules: PathwayRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_authorizer(mut self, authorizer: CapabilityAuthorizer) -> Self {
        self.authorizer = authorizer;
        self
    }

    pub async fn list_pathways(&self) -> CoreResult<Vec<pathways::Model>> {
        let pathways = pathways::Entity::find()
            .order_by_asc(pathways::Column::Id)
            .all(&self.db)
            .await?;
        Ok(pathways)
    }

    pub async fn create_pathway(
        &self,
        actor: &Actor,
        prerequisite_course_id: i32,
        next_course_id: i32,
        order: i32,
    ) -> CoreResult<pathways::Model> {
        validate_order(order)?;

        let txn = self.db.begin().await?;
        let graph = load_pathway_graph(&txn).await?;

        let prerequisite = graph
            .course(prerequisite_course_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("Course", prerequisite_course_id.to_string()))?;
        let next = graph
            .course(next_course_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("Course", next_course_id.to_string()))?;

        self.rules
            .validate_new_edge(&graph, &prerequisite, &next)
            .map_err(|e| {
                warn!(
                    "Rejected pathway {} -> {} for {}: {}",
                    prerequisite.id, next.id, actor.username, e
                );
                CoreError::from(e)
            })?;

        let pathway = pathways::ActiveModel {
            prerequisite_course_id: Set(prerequisite.id),
            next_course_id: Set(next.id),
            order: Set(order),
            created_by: Set(actor.username.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let pathway = pathway.insert(&txn).await?;
        txn.commit().await?;

        let label = format!("{} → {}", prerequisite.name, next.name);
        info!("Created pathway {} ({}) by {}", pathway.id, label, actor.username);
        self.audit
            .record(
                AuditEntry::new(
                    actor,
                    AuditAction::Create,
                    AuditEntityType::Pathway,
                    pathway.id,
                    label.clone(),
                )
                .with_description(format!("Created pathway: {} (order: {})", label, order)),
            )
            .await;

        Ok(pathway)
    }

    pub async fn delete_pathway(&self, actor: &Actor, pathway_id: i32) -> CoreResult<()> {
        let txn = self.db.begin().await?;
        let graph = load_pathway_graph(&txn).await?;

        let edge = graph
            .edge(pathway_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("Pathway", pathway_id.to_string()))?;
        let label = edge_label(&graph, &edge);

        self.authorizer.authorize(
            actor,
            &OwnedResource::new(ResourceKind::Pathway, &label, &edge.created_by),
        )?;

        validate_edge_removal(&graph, &edge).map_err(|e| {
            warn!("Rejected delete of pathway {} for {}: {}", pathway_id, actor.username, e);
            CoreError::from(e)
        })?;

        pathways::Entity::delete_by_id(pathway_id).exec(&txn).await?;
        txn.commit().await?;

        info!("Deleted pathway {} ({}) by {}", pathway_id, label, actor.username);
        self.audit
            .record(
                AuditEntry::new(
                    actor,
                    AuditAction::Delete,
                    AuditEntityType::Pathway,
                    pathway_id,
                    label.clone(),
                )
                .with_description(format!("Deleted pathway: {}", label)),
            )
            .await;

        Ok(())
    }

    pub async fn update_pathway_order(
        &self,
        actor: &Actor,
        pathway_id: i32,
        order: i32,
    ) -> CoreResult<pathways::Model> {
        validate_order(order)?;

        let txn = self.db.begin().await?;
        let pathway = pathways::Entity::find_by_id(pathway_id)
            .one(&txn)
            .await?
            .ok_or_else(|| CoreError::not_found("Pathway", pathway_id.to_string()))?;

        let prerequisite_name = course_name(&txn, pathway.prerequisite_course_id).await?;
        let next_name = course_name(&txn, pathway.next_course_id).await?;
        let label = format!("{} → {}", prerequisite_name, next_name);

        self.authorizer.authorize(
            actor,
            &OwnedResource::new(ResourceKind::Pathway, &label, &pathway.created_by),
        )?;

        let previous_order = pathway.order;
        let mut active: pathways::ActiveModel = pathway.into();
        active.order = Set(order);
        let pathway = active.update(&txn).await?;
        txn.commit().await?;

        info!(
            "Reordered pathway {} ({}) from {} to {} by {}",
            pathway_id, label, previous_order, order, actor.username
        );
        self.audit
            .record(
                AuditEntry::new(
                    actor,
                    AuditAction::Update,
                    AuditEntityType::Pathway,
                    pathway_id,
                    label.clone(),
                )
                .with_description(format!("Updated pathway order: {} (order: {})", label, order)),
            )
            .await;

        Ok(pathway)
    }

    /// Read-only preview of what deleting a course would touch
    pub async fn get_delete_impact(&self, course_id: i32) -> CoreResult<DeleteImpact> {
        let graph = load_pathway_graph(&self.db).await?;
        if graph.course(course_id).is_none() {
            return Err(CoreError::not_found("Course", course_id.to_string()));
        }

        let impact = delete_impact(&graph, course_id);
        debug!(
            "Delete impact for course {}: {} pathways, {} orphaned",
            course_id,
            impact.affected_pathways.len(),
            impact.orphaned_courses.len()
        );
        Ok(impact)
    }

    /// Delete a course. Edges touching it block the delete unless `cascade`
    /// is set, in which case they are removed first without the downstream
    /// check used by [`PathwayService::delete_pathway`].
    ///
    /// The edges to remove are re-derived from the current snapshot on every
    /// call, so a retry after a failure picks up whatever is left.
    pub async fn delete_course_cascade(
        &self,
        actor: &Actor,
        course_id: i32,
        cascade: bool,
    ) -> CoreResult<CourseDeletion> {
        let txn = self.db.begin().await?;
        let course = courses::Entity::find_by_id(course_id)
            .one(&txn)
            .await?
            .ok_or_else(|| CoreError::not_found("Course", course_id.to_string()))?;

        self.authorizer.authorize(
            actor,
            &OwnedResource::new(ResourceKind::Course, &course.course_name, &course.created_by),
        )?;

        let graph = load_pathway_graph(&txn).await?;
        let affected = affected_pathways(&graph, course_id);

        if !affected.is_empty() && !cascade {
            let descriptions = affected
                .iter()
                .map(|pathway| pathway.description.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            warn!(
                "Blocked delete of course {} for {}: {} pathways attached",
                course_id,
                actor.username,
                affected.len()
            );
            return Err(CoreError::precondition_failed(format!(
                "Cannot delete course \"{}\": It is used in {} pathway(s): {}. Enable cascade delete to remove these pathways automatically, or remove them manually first.",
                course.course_name,
                affected.len(),
                descriptions
            ))
            .with_field("course_id", course_id.to_string())
            .with_field("pathways", affected.len().to_string()));
        }

        for pathway in &affected {
            pathways::Entity::delete_by_id(pathway.pathway_id)
                .exec(&txn)
                .await?;
        }
        course_job_roles::Entity::delete_many()
            .filter(course_job_roles::Column::CourseId.eq(course_id))
            .exec(&txn)
            .await?;
        courses::Entity::delete_by_id(course_id).exec(&txn).await?;
        txn.commit().await?;

        info!(
            "Deleted course {} ({}) with {} pathways by {}",
            course_id,
            course.course_name,
            affected.len(),
            actor.username
        );

        for pathway in &affected {
            let label = graph
                .edge(pathway.pathway_id)
                .map(|edge| edge_label(&graph, edge))
                .unwrap_or_else(|| pathway.description.clone());
            self.audit
                .record(
                    AuditEntry::new(
                        actor,
                        AuditAction::Delete,
                        AuditEntityType::Pathway,
                        pathway.pathway_id,
                        label.clone(),
                    )
                    .with_description(format!(
                        "Deleted pathway (cascade from course deletion): {}",
                        label
                    )),
                )
                .await;
        }
        self.audit
            .record(
                AuditEntry::new(
                    actor,
                    AuditAction::Delete,
                    AuditEntityType::Course,
                    course_id,
                    course.course_name.clone(),
                )
                .with_description(format!("Deleted course \"{}\"", course.course_name)),
            )
            .await;

        Ok(CourseDeletion {
            course,
            removed_pathways: affected,
        })
    }
}

fn validate_order(order: i32) -> CoreResult<()> {
    if order < 1 {
        return Err(CoreError::validation(format!(
            "Pathway order must be a positive integer, got {}",
            order
        ))
        .with_field("order", order.to_string()));
    }
    Ok(())
}

fn edge_label(graph: &PathwayGraph, edge: &PathwayEdge) -> String {
    format!(
        "{} → {}",
        graph.display_name(edge.prerequisite_course_id),
        graph.display_name(edge.next_course_id)
    )
}

async fn course_name<C: sea_orm::ConnectionTrait>(conn: &C, course_id: i32) -> CoreResult<String> {
    Ok(courses::Entity::find_by_id(course_id)
        .one(conn)
        .await?
        .map(|course| course.course_name)
        .unwrap_or_else(|| format!("Course {}", course_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoreErrorKind;

    #[test]
    fn test_order_must_be_positive() {
        assert!(validate_order(1).is_ok());
        let err = validate_order(0).unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Validation);
        assert_eq!(err.field("order"), Some("0"));
    }
}
