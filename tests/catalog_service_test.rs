mod common;

use anyhow::Result;
use common::{global_admin, owner, Catalog};
use coursepath::database::entities::pathways;
use coursepath::errors::CoreErrorKind;
use coursepath::pathway_graph::{render_forest, CourseType};
use sea_orm::{ActiveModelTrait, Set};

#[tokio::test]
async fn test_prerequisites_and_next_steps() -> Result<()> {
    let catalog = Catalog::new().await?;
    let java = catalog.immersive("Java").await?;
    let spring = catalog.skill("Spring").await?;
    let kotlin = catalog.skill("Kotlin").await?;
    catalog.pathways.create_pathway(&owner(), java.id, spring.id, 2).await?;
    catalog.pathways.create_pathway(&owner(), java.id, kotlin.id, 1).await?;

    let next: Vec<String> = catalog
        .catalog
        .next_steps(java.id)
        .await?
        .into_iter()
        .map(|link| link.course.course_name)
        .collect();
    assert_eq!(next, vec!["Kotlin", "Spring"]);

    let prerequisites = catalog.catalog.prerequisites(spring.id).await?;
    assert_eq!(prerequisites.len(), 1);
    assert_eq!(prerequisites[0].course.id, java.id);
    assert_eq!(prerequisites[0].pathway.order, 2);
    Ok(())
}

#[tokio::test]
async fn test_course_detail_by_id_and_code() -> Result<()> {
    let catalog = Catalog::new().await?;
    let role = catalog
        .job_roles
        .create_job_role(&global_admin(), "Backend Developer", None, None)
        .await?;
    let mut input = catalog.new_course("Java", CourseType::Immersive);
    input.job_role_ids = vec![role.id];
    let java = catalog.courses.create_course(&owner(), input).await?;
    let spring = catalog.skill("Spring").await?;
    catalog.link(&java, &spring).await?;

    let detail = catalog.catalog.course_detail(java.id).await?;
    assert!(detail.prerequisites.is_empty());
    assert_eq!(detail.next_steps.len(), 1);
    assert_eq!(detail.job_roles[0].title, "Backend Developer");

    let by_code = catalog
        .catalog
        .course_detail_by_code(&format!("CRS-{}", spring.id))
        .await?;
    assert_eq!(by_code.course.id, spring.id);
    assert_eq!(by_code.prerequisites[0].course.id, java.id);

    let err = catalog.catalog.course_detail_by_code("CRS-0").await.unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::NotFound);
    Ok(())
}

#[tokio::test]
async fn test_list_courses_counts_next_steps() -> Result<()> {
    let catalog = Catalog::new().await?;
    let java = catalog.immersive("Java").await?;
    let spring = catalog.skill("Spring").await?;
    let kotlin = catalog.skill("Kotlin").await?;
    catalog.link(&java, &spring).await?;
    catalog.link(&java, &kotlin).await?;

    let listings = catalog.catalog.list_courses().await?;
    assert_eq!(listings.len(), 3);
    assert_eq!(listings[0].course.id, java.id);
    assert_eq!(listings[0].next_steps_count, 2);
    assert_eq!(listings[1].next_steps_count, 0);
    Ok(())
}

#[tokio::test]
async fn test_forest_orders_children_and_is_stable() -> Result<()> {
    let catalog = Catalog::new().await?;
    let root = catalog.immersive("Root").await?;
    let b = catalog.skill("B").await?;
    let c = catalog.skill("C").await?;
    let d = catalog.skill("D").await?;
    catalog.pathways.create_pathway(&owner(), root.id, b.id, 2).await?;
    catalog.pathways.create_pathway(&owner(), root.id, c.id, 1).await?;
    catalog.pathways.create_pathway(&owner(), root.id, d.id, 3).await?;

    let forest = catalog.catalog.pathway_forest().await?;
    assert_eq!(forest.len(), 1);
    let orders: Vec<Option<i32>> = forest[0].children.iter().map(|child| child.order).collect();
    assert_eq!(orders, vec![Some(1), Some(2), Some(3)]);
    let names: Vec<&str> = forest[0]
        .children
        .iter()
        .map(|child| child.course.name.as_str())
        .collect();
    assert_eq!(names, vec!["C", "B", "D"]);

    assert_eq!(forest, catalog.catalog.pathway_forest().await?);
    assert!(render_forest(&forest).starts_with("Root ["));
    Ok(())
}

#[tokio::test]
async fn test_forest_terminates_on_stored_cycle() -> Result<()> {
    let catalog = Catalog::new().await?;
    let root = catalog.immersive("Root").await?;
    let b = catalog.skill("B").await?;
    let c = catalog.skill("C").await?;
    catalog.link(&root, &b).await?;
    catalog.link(&b, &c).await?;

    // Written around the engine, as a hand-edited database would be
    pathways::ActiveModel {
        prerequisite_course_id: Set(c.id),
        next_course_id: Set(b.id),
        order: Set(1),
        created_by: Set("manual".to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&catalog.db)
    .await?;

    let forest = catalog.catalog.pathway_forest().await?;
    assert_eq!(forest[0].size(), 3);

    let overview = catalog.catalog.pathway_overview().await?;
    assert_eq!(overview[0].total_courses, 3);
    Ok(())
}

#[tokio::test]
async fn test_overview_per_entry_point() -> Result<()> {
    let catalog = Catalog::new().await?;
    let java = catalog.immersive("Java").await?;
    let data = catalog.immersive("Data").await?;
    let spring = catalog.skill("Spring").await?;
    let exam = catalog.course("OCP Exam", CourseType::ExamCert).await?;
    catalog.link(&java, &spring).await?;
    catalog.link(&spring, &exam).await?;

    let overview = catalog.catalog.pathway_overview().await?;
    assert_eq!(overview.len(), 2);
    assert_eq!(overview[0].immersive.id, java.id);
    assert_eq!(overview[0].total_courses, 3);
    assert_eq!(overview[0].direct_next_steps, 1);
    assert_eq!(
        overview[0].course_types,
        vec![CourseType::SkillBased, CourseType::ExamCert]
    );
    assert_eq!(overview[1].immersive.id, data.id);
    assert_eq!(overview[1].total_courses, 1);
    Ok(())
}
