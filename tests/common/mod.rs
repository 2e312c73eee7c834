#![allow(dead_code)]

use anyhow::Result;
use coursepath::auth::Actor;
use coursepath::database::entities::{courses, domains, pathways};
use coursepath::database::{establish_connection, get_database_url, setup_database};
use coursepath::pathway_graph::CourseType;
use coursepath::services::{
    AuditService, CatalogService, CourseService, DomainService, JobRoleService, NewCourse,
    PathwayService,
};
use sea_orm::DatabaseConnection;

/// In-memory SQLite database with the schema applied
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = establish_connection(&get_database_url(Some(":memory:"))).await?;
    setup_database(&db).await?;
    Ok(db)
}

pub fn owner() -> Actor {
    Actor::admin("alice")
}

pub fn other_admin() -> Actor {
    Actor::admin("bob")
}

pub fn global_admin() -> Actor {
    Actor::global_admin("admin-global")
}

pub struct Catalog {
    pub db: DatabaseConnection,
    pub courses: CourseService,
    pub pathways: PathwayService,
    pub domains: DomainService,
    pub job_roles: JobRoleService,
    pub catalog: CatalogService,
    pub audit: AuditService,
    pub domain: domains::Model,
}

impl Catalog {
    pub async fn new() -> Result<Self> {
        let db = setup_test_db().await?;
        let domains = DomainService::new(db.clone());
        let domain = domains
            .create_domain(&owner(), "Cybersecurity", Some("Security tracks".to_string()))
            .await?;

        Ok(Self {
            courses: CourseService::new(db.clone()),
            pathways: PathwayService::new(db.clone()),
            job_roles: JobRoleService::new(db.clone()),
            catalog: CatalogService::new(db.clone()),
            audit: AuditService::new(db.clone()),
            domains,
            domain,
            db,
        })
    }

    pub fn new_course(&self, name: &str, course_type: CourseType) -> NewCourse {
        NewCourse {
            course_name: name.to_string(),
            course_type,
            domain_id: self.domain.id,
            course_objectives: format!("Objectives for {}", name),
            weeks: 4,
            certifications_badges: None,
            job_role_ids: Vec::new(),
        }
    }

    /// Course created by `owner()`
    pub async fn course(&self, name: &str, course_type: CourseType) -> Result<courses::Model> {
        Ok(self
            .courses
            .create_course(&owner(), self.new_course(name, course_type))
            .await?)
    }

    pub async fn immersive(&self, name: &str) -> Result<courses::Model> {
        self.course(name, CourseType::Immersive).await
    }

    pub async fn skill(&self, name: &str) -> Result<courses::Model> {
        self.course(name, CourseType::SkillBased).await
    }

    /// Pathway created by `owner()` with order 1
    pub async fn link(&self, from: &courses::Model, to: &courses::Model) -> Result<pathways::Model> {
        Ok(self.pathways.create_pathway(&owner(), from.id, to.id, 1).await?)
    }

    pub async fn audit_count(&self) -> Result<usize> {
        Ok(self.audit.recent(Some(1000)).await?.len())
    }
}
