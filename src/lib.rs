//! Course catalogue with prerequisite pathways.
//!
//! Courses are linked into chains rooted at immersive entry courses. The
//! [`pathway_graph`] module holds the pure rules that keep that shape valid;
//! [`services`] runs them against the SQLite store and records an audit trail.

pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod pathway_graph;
pub mod services;
