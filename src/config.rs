use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::database::connection::DEFAULT_DATABASE_PATH;
use crate::pathway_graph::MAX_PATHWAY_DEPTH;

pub const DEFAULT_AUDIT_LOG_LIMIT: u64 = 100;

/// Runtime settings, read from an optional YAML file and then overridden by
/// command line flags.
///
/// ```yaml
/// database: catalog.db
/// max_pathway_depth: 10
/// log_level: debug
/// audit_log_limit: 50
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub database: String,
    pub max_pathway_depth: usize,
    pub log_level: String,
    pub audit_log_limit: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE_PATH.to_string(),
            max_pathway_depth: MAX_PATHWAY_DEPTH,
            log_level: "info".to_string(),
            audit_log_limit: DEFAULT_AUDIT_LOG_LIMIT,
        }
    }
}

impl CatalogConfig {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config: CatalogConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        Self::from_yaml_str(&contents)
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn with_overrides(
        mut self,
        database: Option<String>,
        log_level: Option<String>,
        max_pathway_depth: Option<usize>,
    ) -> Self {
        if let Some(database) = database {
            self.database = database;
        }
        if let Some(log_level) = log_level {
            self.log_level = log_level;
        }
        if let Some(max_pathway_depth) = max_pathway_depth {
            self.max_pathway_depth = max_pathway_depth;
        }
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_pathway_depth == 0 {
            anyhow::bail!("max_pathway_depth must be at least 1");
        }
        if self.audit_log_limit == 0 {
            anyhow::bail!("audit_log_limit must be at least 1");
        }
        if self.database.trim().is_empty() {
            anyhow::bail!("database path must not be empty");
        }
        Ok(())
    }
}
