use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Domains::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Domains::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Domains::Name).string().not_null())
                    .col(ColumnDef::new(Domains::Description).text())
                    .col(ColumnDef::new(Domains::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Domains::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Domains::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Domains::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Courses::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Courses::CourseCode).string().unique_key())
                    .col(ColumnDef::new(Courses::CourseName).string().not_null())
                    .col(ColumnDef::new(Courses::CourseType).string().not_null())
                    .col(ColumnDef::new(Courses::CourseObjectives).text().not_null())
                    .col(ColumnDef::new(Courses::Weeks).integer().not_null())
                    .col(ColumnDef::new(Courses::CertificationsBadges).text())
                    .col(ColumnDef::new(Courses::DomainId).integer().not_null())
                    .col(ColumnDef::new(Courses::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Courses::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Courses::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_courses_domain_id")
                            .from(Courses::Table, Courses::DomainId)
                            .to(Domains::Table, Domains::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // No uniqueness on the pair: duplicate detection belongs to the pathway engine
        manager
            .create_table(
                Table::create()
                    .table(Pathways::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Pathways::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Pathways::PrerequisiteCourseId).integer().not_null())
                    .col(ColumnDef::new(Pathways::NextCourseId).integer().not_null())
                    .col(ColumnDef::new(Pathways::Order).integer().not_null().default(1))
                    .col(ColumnDef::new(Pathways::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Pathways::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pathways_prerequisite_course_id")
                            .from(Pathways::Table, Pathways::PrerequisiteCourseId)
                            .to(Courses::Table, Courses::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pathways_next_course_id")
                            .from(Pathways::Table, Pathways::NextCourseId)
                            .to(Courses::Table, Courses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pathways_prerequisite_course_id")
                    .table(Pathways::Table)
                    .col(Pathways::PrerequisiteCourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pathways_next_course_id")
                    .table(Pathways::Table)
                    .col(Pathways::NextCourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JobRoles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(JobRoles::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(JobRoles::Title).string().not_null().unique_key())
                    .col(ColumnDef::new(JobRoles::Description).text())
                    .col(ColumnDef::new(JobRoles::SalaryRange).string())
                    .col(ColumnDef::new(JobRoles::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(JobRoles::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(JobRoles::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CourseJobRoles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CourseJobRoles::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(CourseJobRoles::CourseId).integer().not_null())
                    .col(ColumnDef::new(CourseJobRoles::JobRoleId).integer().not_null())
                    .col(ColumnDef::new(CourseJobRoles::IsPrimary).boolean().not_null().default(false))
                    .col(ColumnDef::new(CourseJobRoles::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_job_roles_course_id")
                            .from(CourseJobRoles::Table, CourseJobRoles::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_job_roles_job_role_id")
                            .from(CourseJobRoles::Table, CourseJobRoles::JobRoleId)
                            .to(JobRoles::Table, JobRoles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuditLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AuditLogs::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(AuditLogs::AdminUsername).string().not_null())
                    .col(ColumnDef::new(AuditLogs::Action).string().not_null())
                    .col(ColumnDef::new(AuditLogs::EntityType).string().not_null())
                    .col(ColumnDef::new(AuditLogs::EntityId).integer().not_null())
                    .col(ColumnDef::new(AuditLogs::EntityName).string())
                    .col(ColumnDef::new(AuditLogs::ChangeDescription).text())
                    .col(ColumnDef::new(AuditLogs::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_logs_entity")
                    .table(AuditLogs::Table)
                    .col(AuditLogs::EntityType)
                    .col(AuditLogs::EntityId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AdminUsers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AdminUsers::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(AdminUsers::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(AdminUsers::Email).string().not_null())
                    .col(ColumnDef::new(AdminUsers::Role).string().not_null().default("admin"))
                    .col(ColumnDef::new(AdminUsers::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(AdminUsers::CreatedBy).string())
                    .col(ColumnDef::new(AdminUsers::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(AdminUsers::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CourseJobRoles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JobRoles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pathways::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Domains::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Domains {
    Table,
    Id,
    Name,
    Description,
    IsActive,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
    CourseCode,
    CourseName,
    CourseType,
    CourseObjectives,
    Weeks,
    CertificationsBadges,
    DomainId,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Pathways {
    Table,
    Id,
    PrerequisiteCourseId,
    NextCourseId,
    Order,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum JobRoles {
    Table,
    Id,
    Title,
    Description,
    SalaryRange,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CourseJobRoles {
    Table,
    Id,
    CourseId,
    JobRoleId,
    IsPrimary,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AuditLogs {
    Table,
    Id,
    AdminUsername,
    Action,
    EntityType,
    EntityId,
    EntityName,
    ChangeDescription,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AdminUsers {
    Table,
    Id,
    Username,
    Email,
    Role,
    IsActive,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
