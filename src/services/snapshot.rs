use sea_orm::{ConnectionTrait, EntityTrait, QueryOrder};

use crate::database::entities::{courses, pathways};
use crate::errors::CoreResult;
use crate::pathway_graph::{CourseNode, PathwayEdge, PathwayGraph};

/// Courses in id order
pub(crate) async fn load_course_nodes<C: ConnectionTrait>(conn: &C) -> CoreResult<Vec<CourseNode>> {
    courses::Entity::find()
        .order_by_asc(courses::Column::Id)
        .all(conn)
        .await?
        .iter()
        .map(courses::Model::to_node)
        .collect()
}

/// Pathways in insertion order, which is the tie-break for equal `order` values
pub(crate) async fn load_pathway_edges<C: ConnectionTrait>(conn: &C) -> CoreResult<Vec<PathwayEdge>> {
    Ok(pathways::Entity::find()
        .order_by_asc(pathways::Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(PathwayEdge::from)
        .collect())
}

/// One upfront fetch of every course and edge; all rule checks then walk it
/// in memory.
pub(crate) async fn load_pathway_graph<C: ConnectionTrait>(conn: &C) -> CoreResult<PathwayGraph> {
    let courses = load_course_nodes(conn).await?;
    let edges = load_pathway_edges(conn).await?;
    Ok(PathwayGraph::new(courses, edges))
}
