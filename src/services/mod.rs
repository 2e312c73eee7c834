pub mod audit_service;
pub mod authorization;
pub mod catalog_service;
pub mod course_service;
pub mod domain_service;
pub mod job_role_service;
pub mod pathway_service;
mod snapshot;

pub use audit_service::{AuditEntry, AuditService};
pub use authorization::AuthorizationService;
pub use catalog_service::{CatalogService, CourseDetail, CourseListing, PathwayLink};
pub use course_service::{CourseService, CourseUpdate, NewCourse};
pub use domain_service::DomainService;
pub use job_role_service::{CourseJobRole, JobRoleService, JobRoleUpdate, MAX_JOB_ROLES_PER_COURSE};
pub use pathway_service::{CourseDeletion, PathwayService};
