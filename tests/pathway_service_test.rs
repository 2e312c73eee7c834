mod common;

use anyhow::Result;
use common::{global_admin, other_admin, owner, Catalog};
use coursepath::database::entities::{audit_logs, courses, pathways, AuditAction, AuditEntityType};
use coursepath::errors::CoreErrorKind;
use coursepath::pathway_graph::{CourseType, PathwayRules};
use coursepath::services::PathwayService;
use sea_orm::{ConnectionTrait, EntityTrait};

#[tokio::test]
async fn test_duplicate_pathway_conflicts() -> Result<()> {
    let catalog = Catalog::new().await?;
    let java = catalog.immersive("Java Developer").await?;
    let spring = catalog.skill("Spring Boot").await?;
    catalog.link(&java, &spring).await?;

    let err = catalog
        .pathways
        .create_pathway(&owner(), java.id, spring.id, 2)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), CoreErrorKind::Conflict);
    assert_eq!(err.field("rule"), Some("DUPLICATE_PATHWAY"));
    assert!(err.message().contains("\"Java Developer\" → \"Spring Boot\""));
    assert_eq!(catalog.pathways.list_pathways().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_immersive_course_is_never_a_target() -> Result<()> {
    let catalog = Catalog::new().await?;
    let java = catalog.immersive("Java Developer").await?;
    let data = catalog.immersive("Data Engineer").await?;
    let spring = catalog.skill("Spring Boot").await?;
    catalog.link(&java, &spring).await?;

    for prerequisite in [&java, &spring] {
        let err = catalog
            .pathways
            .create_pathway(&owner(), prerequisite.id, data.id, 1)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::InvalidOperation);
        assert_eq!(err.field("rule"), Some("IMMERSIVE_TARGET"));
    }
    Ok(())
}

#[tokio::test]
async fn test_cycle_rejected_and_extension_allowed() -> Result<()> {
    let catalog = Catalog::new().await?;
    let a = catalog.immersive("A").await?;
    let b = catalog.skill("B").await?;
    let c = catalog.skill("C").await?;
    let d = catalog.skill("D").await?;
    catalog.link(&a, &b).await?;
    catalog.link(&b, &c).await?;

    let err = catalog
        .pathways
        .create_pathway(&owner(), c.id, b.id, 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::InvalidOperation);
    assert_eq!(err.field("rule"), Some("CYCLE_DETECTED"));
    assert!(err.message().contains("\"B\" is already in the prerequisite chain for \"C\""));

    let pathway = catalog.link(&c, &d).await?;
    assert_eq!(pathway.prerequisite_course_id, c.id);
    assert_eq!(pathway.next_course_id, d.id);
    Ok(())
}

#[tokio::test]
async fn test_depth_limit_tenth_edge_ok_eleventh_rejected() -> Result<()> {
    let catalog = Catalog::new().await?;
    let mut chain = vec![catalog.immersive("Entry").await?];
    for level in 1..=11 {
        chain.push(catalog.skill(&format!("Level {}", level)).await?);
    }

    for step in 1..=10 {
        catalog.link(&chain[step - 1], &chain[step]).await?;
    }

    let err = catalog
        .pathways
        .create_pathway(&owner(), chain[10].id, chain[11].id, 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::InvalidOperation);
    assert_eq!(err.field("rule"), Some("DEPTH_EXCEEDED"));
    assert_eq!(catalog.pathways.list_pathways().await?.len(), 10);
    Ok(())
}

#[tokio::test]
async fn test_configured_depth_limit() -> Result<()> {
    let catalog = Catalog::new().await?;
    let entry = catalog.immersive("Entry").await?;
    let first = catalog.skill("First").await?;
    let second = catalog.skill("Second").await?;
    let shallow = PathwayService::new(catalog.db.clone()).with_rules(PathwayRules::new(1));

    shallow.create_pathway(&owner(), entry.id, first.id, 1).await?;
    let err = shallow
        .create_pathway(&owner(), first.id, second.id, 1)
        .await
        .unwrap_err();
    assert_eq!(err.field("rule"), Some("DEPTH_EXCEEDED"));
    Ok(())
}

#[tokio::test]
async fn test_unrooted_prerequisite_rejected() -> Result<()> {
    let catalog = Catalog::new().await?;
    let floating = catalog.skill("Floating").await?;
    let target = catalog.course("Security+", CourseType::ExamCert).await?;

    let err = catalog
        .pathways
        .create_pathway(&owner(), floating.id, target.id, 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::InvalidOperation);
    assert_eq!(err.field("rule"), Some("UNREACHABLE_FROM_IMMERSIVE"));
    assert!(err.message().contains("\"Floating\""));
    Ok(())
}

#[tokio::test]
async fn test_missing_course_and_bad_order() -> Result<()> {
    let catalog = Catalog::new().await?;
    let entry = catalog.immersive("Entry").await?;
    let next = catalog.skill("Next").await?;

    let err = catalog
        .pathways
        .create_pathway(&owner(), entry.id, 9999, 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::NotFound);

    let err = catalog
        .pathways
        .create_pathway(&owner(), entry.id, next.id, 0)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Validation);
    Ok(())
}

#[tokio::test]
async fn test_delete_blocked_until_alternative_exists() -> Result<()> {
    let catalog = Catalog::new().await?;
    let p = catalog.immersive("P").await?;
    let q = catalog.immersive("Q").await?;
    let n = catalog.skill("N").await?;
    let m = catalog.skill("M").await?;
    let p_to_n = catalog.link(&p, &n).await?;
    catalog.link(&n, &m).await?;

    let err = catalog
        .pathways
        .delete_pathway(&owner(), p_to_n.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::InvalidOperation);
    assert_eq!(err.field("rule"), Some("DOWNSTREAM_DEPENDENTS"));
    assert!(err.message().contains("\"M\""));

    catalog.link(&q, &n).await?;
    catalog.pathways.delete_pathway(&owner(), p_to_n.id).await?;

    assert!(pathways::Entity::find_by_id(p_to_n.id).one(&catalog.db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_delete_missing_pathway_is_not_found() -> Result<()> {
    let catalog = Catalog::new().await?;
    let err = catalog.pathways.delete_pathway(&owner(), 42).await.unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::NotFound);
    Ok(())
}

#[tokio::test]
async fn test_cascade_delete_requires_flag_then_removes_everything() -> Result<()> {
    let catalog = Catalog::new().await?;
    let a = catalog.immersive("A").await?;
    let c = catalog.skill("C").await?;
    let d = catalog.skill("D").await?;
    let a_to_c = catalog.link(&a, &c).await?;
    let c_to_d = catalog.link(&c, &d).await?;
    let audits_before = catalog.audit_count().await?;

    let err = catalog
        .pathways
        .delete_course_cascade(&owner(), c.id, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::PreconditionFailed);
    assert!(err.message().contains("\"A\" → \"C\""));
    assert!(err.message().contains("\"C\" → \"D\""));
    assert!(courses::Entity::find_by_id(c.id).one(&catalog.db).await?.is_some());
    assert_eq!(catalog.audit_count().await?, audits_before);

    let deletion = catalog
        .pathways
        .delete_course_cascade(&owner(), c.id, true)
        .await?;
    let removed: Vec<i32> = deletion.removed_pathways.iter().map(|p| p.pathway_id).collect();
    assert_eq!(removed, vec![a_to_c.id, c_to_d.id]);

    assert!(catalog.pathways.list_pathways().await?.is_empty());
    assert!(courses::Entity::find_by_id(c.id).one(&catalog.db).await?.is_none());
    assert_eq!(catalog.audit_count().await?, audits_before + 3);

    let recent = catalog.audit.recent(Some(3)).await?;
    assert_eq!(recent[0].entity_type()?, AuditEntityType::Course);
    assert_eq!(recent[0].entity_id, c.id);
    assert!(recent[1..]
        .iter()
        .all(|record| record.entity_type().ok() == Some(AuditEntityType::Pathway)
            && record.action().ok() == Some(AuditAction::Delete)
            && record
                .change_description
                .as_deref()
                .unwrap_or_default()
                .contains("cascade")));
    Ok(())
}

#[tokio::test]
async fn test_course_without_pathways_deletes_without_cascade() -> Result<()> {
    let catalog = Catalog::new().await?;
    let lonely = catalog.skill("Lonely").await?;

    let deletion = catalog
        .pathways
        .delete_course_cascade(&owner(), lonely.id, false)
        .await?;

    assert!(deletion.removed_pathways.is_empty());
    assert!(courses::Entity::find_by_id(lonely.id).one(&catalog.db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_delete_impact_reports_orphans() -> Result<()> {
    let catalog = Catalog::new().await?;
    let a = catalog.immersive("A").await?;
    let b = catalog.skill("B").await?;
    let c = catalog.skill("C").await?;
    catalog.link(&a, &b).await?;
    catalog.link(&b, &c).await?;

    let impact = catalog.pathways.get_delete_impact(b.id).await?;
    assert!(!impact.can_delete);
    assert!(impact.requires_cascade);
    assert_eq!(impact.affected_pathways.len(), 2);
    assert_eq!(impact.orphaned_courses.len(), 1);
    assert_eq!(impact.orphaned_courses[0].id, c.id);

    let impact = catalog.pathways.get_delete_impact(c.id).await?;
    assert!(impact.orphaned_courses.is_empty());

    let err = catalog.pathways.get_delete_impact(9999).await.unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::NotFound);
    Ok(())
}

#[tokio::test]
async fn test_non_creator_is_forbidden_and_nothing_is_audited() -> Result<()> {
    let catalog = Catalog::new().await?;
    let a = catalog.immersive("A").await?;
    let b = catalog.skill("B").await?;
    let pathway = catalog.link(&a, &b).await?;
    let audits_before = catalog.audit_count().await?;

    let err = catalog
        .pathways
        .delete_pathway(&other_admin(), pathway.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Forbidden);
    assert_eq!(err.field("created_by"), Some("alice"));

    let err = catalog
        .pathways
        .update_pathway_order(&other_admin(), pathway.id, 5)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Forbidden);

    let err = catalog
        .pathways
        .delete_course_cascade(&other_admin(), b.id, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Forbidden);

    let stored = pathways::Entity::find_by_id(pathway.id).one(&catalog.db).await?;
    assert_eq!(stored.map(|p| p.order), Some(1));
    assert!(courses::Entity::find_by_id(b.id).one(&catalog.db).await?.is_some());
    assert_eq!(catalog.audit_count().await?, audits_before);
    Ok(())
}

#[tokio::test]
async fn test_global_admin_may_modify_any_pathway() -> Result<()> {
    let catalog = Catalog::new().await?;
    let a = catalog.immersive("A").await?;
    let b = catalog.skill("B").await?;
    let pathway = catalog.link(&a, &b).await?;

    let updated = catalog
        .pathways
        .update_pathway_order(&global_admin(), pathway.id, 3)
        .await?;
    assert_eq!(updated.order, 3);

    catalog.pathways.delete_pathway(&global_admin(), pathway.id).await?;
    assert!(catalog.pathways.list_pathways().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_mutations_write_audit_records() -> Result<()> {
    let catalog = Catalog::new().await?;
    let a = catalog.immersive("A").await?;
    let b = catalog.skill("B").await?;
    let pathway = catalog.link(&a, &b).await?;
    catalog.pathways.update_pathway_order(&owner(), pathway.id, 2).await?;

    let history = catalog
        .audit
        .for_entity(AuditEntityType::Pathway, pathway.id)
        .await?;
    let actions = history
        .iter()
        .map(|record| record.action())
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(actions, vec![AuditAction::Update, AuditAction::Create]);
    assert_eq!(history[1].entity_name.as_deref(), Some("A → B"));
    assert_eq!(history[1].admin_username, "alice");
    Ok(())
}

#[tokio::test]
async fn test_audit_failure_does_not_fail_mutation() -> Result<()> {
    let catalog = Catalog::new().await?;
    let a = catalog.immersive("A").await?;
    let b = catalog.skill("B").await?;

    catalog
        .db
        .execute_unprepared("DROP TABLE audit_logs")
        .await?;

    let pathway = catalog.link(&a, &b).await?;
    assert!(pathways::Entity::find_by_id(pathway.id).one(&catalog.db).await?.is_some());
    assert!(audit_logs::Entity::find().all(&catalog.db).await.is_err());
    Ok(())
}
