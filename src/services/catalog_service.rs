use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use super::job_role_service::{load_course_job_roles, CourseJobRole};
use super::snapshot::{load_course_nodes, load_pathway_edges};
use crate::database::entities::{courses, pathways};
use crate::errors::{CoreError, CoreResult};
use crate::pathway_graph::{self, PathwayOverview, PathwayTree};

/// One hop along a pathway, joined with the course on the far end
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathwayLink {
    pub pathway: pathways::Model,
    pub course: courses::Model,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CourseDetail {
    pub course: courses::Model,
    pub prerequisites: Vec<PathwayLink>,
    pub next_steps: Vec<PathwayLink>,
    pub job_roles: Vec<CourseJobRole>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CourseListing {
    pub course: courses::Model,
    pub next_steps_count: usize,
    pub job_roles: Vec<CourseJobRole>,
}

/// Read side of the catalogue. No authorization and no invariant checks.
#[derive(Clone)]
pub struct CatalogService {
    db: DatabaseConnection,
}

impl CatalogService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Incoming edges of `course_id` with their prerequisite courses
    pub async fn prerequisites(&self, course_id: i32) -> CoreResult<Vec<PathwayLink>> {
        let edges = pathways::Entity::find()
            .filter(pathways::Column::NextCourseId.eq(course_id))
            .order_by_asc(pathways::Column::Order)
            .order_by_asc(pathways::Column::Id)
            .all(&self.db)
            .await?;
        join_courses(&self.db, edges, |edge| edge.prerequisite_course_id).await
    }

    /// Outgoing edges of `course_id` with their next courses, by ascending order
    pub async fn next_steps(&self, course_id: i32) -> CoreResult<Vec<PathwayLink>> {
        let edges = pathways::Entity::find()
            .filter(pathways::Column::PrerequisiteCourseId.eq(course_id))
            .order_by_asc(pathways::Column::Order)
            .order_by_asc(pathways::Column::Id)
            .all(&self.db)
            .await?;
        join_courses(&self.db, edges, |edge| edge.next_course_id).await
    }

    pub async fn course_detail(&self, course_id: i32) -> CoreResult<CourseDetail> {
        let course = courses::Entity::find_by_id(course_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("Course", course_id.to_string()))?;
        self.detail_for(course).await
    }

    pub async fn course_detail_by_code(&self, code: &str) -> CoreResult<CourseDetail> {
        let course = courses::Entity::find()
            .filter(courses::Column::CourseCode.eq(code.trim()))
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("Course", code))?;
        self.detail_for(course).await
    }

    pub async fn list_courses(&self) -> CoreResult<Vec<CourseListing>> {
        let courses = courses::Entity::find()
            .order_by_asc(courses::Column::Id)
            .all(&self.db)
            .await?;
        let edges = load_pathway_edges(&self.db).await?;

        let mut next_steps_count: HashMap<i32, usize> = HashMap::new();
        for edge in &edges {
            *next_steps_count.entry(edge.prerequisite_course_id).or_default() += 1;
        }

        let mut listings = Vec::with_capacity(courses.len());
        for course in courses {
            let job_roles = load_course_job_roles(&self.db, course.id).await?;
            listings.push(CourseListing {
                next_steps_count: next_steps_count.get(&course.id).copied().unwrap_or(0),
                course,
                job_roles,
            });
        }
        Ok(listings)
    }

    pub async fn pathway_forest(&self) -> CoreResult<Vec<PathwayTree>> {
        let courses = load_course_nodes(&self.db).await?;
        let edges = load_pathway_edges(&self.db).await?;
        Ok(pathway_graph::build_forest(&courses, &edges))
    }

    pub async fn pathway_overview(&self) -> CoreResult<Vec<PathwayOverview>> {
        let courses = load_course_nodes(&self.db).await?;
        let edges = load_pathway_edges(&self.db).await?;
        Ok(pathway_graph::overview(&courses, &edges))
    }

    async fn detail_for(&self, course: courses::Model) -> CoreResult<CourseDetail> {
        let prerequisites = self.prerequisites(course.id).await?;
        let next_steps = self.next_steps(course.id).await?;
        let job_roles = load_course_job_roles(&self.db, course.id).await?;

        Ok(CourseDetail {
            course,
            prerequisites,
            next_steps,
            job_roles,
        })
    }
}

/// Edges whose far-end course no longer exists are dropped
async fn join_courses<C, F>(conn: &C, edges: Vec<pathways::Model>, far_end: F) -> CoreResult<Vec<PathwayLink>>
where
    C: ConnectionTrait,
    F: Fn(&pathways::Model) -> i32,
{
    let ids: Vec<i32> = edges.iter().map(&far_end).collect();
    let courses: HashMap<i32, courses::Model> = courses::Entity::find()
        .filter(courses::Column::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|course| (course.id, course))
        .collect();

    Ok(edges
        .into_iter()
        .filter_map(|pathway| {
            let course = courses.get(&far_end(&pathway)).cloned()?;
            Some(PathwayLink { pathway, course })
        })
        .collect())
}
