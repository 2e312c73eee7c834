pub mod admin_users;
pub mod audit_logs;
pub mod course_job_roles;
pub mod courses;
pub mod domains;
pub mod job_roles;
pub mod pathways;

pub use audit_logs::{AuditAction, AuditEntityType};
