use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};

/// Administrator role
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    GlobalAdmin,
    Admin,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::GlobalAdmin => "global_admin",
            AdminRole::Admin => "admin",
        }
    }

    /// Check if this role has the permissions of another role
    pub fn has_permission(&self, required: AdminRole) -> bool {
        match (self, required) {
            (AdminRole::GlobalAdmin, _) => true,
            (AdminRole::Admin, AdminRole::Admin) => true,
            _ => false,
        }
    }
}

impl FromStr for AdminRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "global_admin" => Ok(AdminRole::GlobalAdmin),
            "admin" => Ok(AdminRole::Admin),
            _ => Err(CoreError::validation(format!("Invalid admin role: {}", s))),
        }
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The acting administrator of a request, as resolved by the credential layer
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Actor {
    pub username: String,
    pub role: AdminRole,
}

impl Actor {
    pub fn new(username: impl Into<String>, role: AdminRole) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn admin(username: impl Into<String>) -> Self {
        Self::new(username, AdminRole::Admin)
    }

    pub fn global_admin(username: impl Into<String>) -> Self {
        Self::new(username, AdminRole::GlobalAdmin)
    }

    pub fn is_global_admin(&self) -> bool {
        self.role == AdminRole::GlobalAdmin
    }
}

/// Kinds of entity an administrator can mutate
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Course,
    Pathway,
    Domain,
    JobRole,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Course => "course",
            ResourceKind::Pathway => "pathway",
            ResourceKind::Domain => "domain",
            ResourceKind::JobRole => "job role",
        }
    }
}

/// How ownership of a resource kind is decided
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Capability {
    /// The entity's creator or anyone holding the role
    CreatorOr(AdminRole),
    /// Only holders of the role, creators are irrelevant
    RoleOnly(AdminRole),
}

/// Role-capability table consulted before every mutation
#[derive(Clone, Debug)]
pub struct CapabilityTable {
    entries: Vec<(ResourceKind, Capability)>,
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self {
            entries: vec![
                (ResourceKind::Course, Capability::CreatorOr(AdminRole::GlobalAdmin)),
                (ResourceKind::Pathway, Capability::CreatorOr(AdminRole::GlobalAdmin)),
                (ResourceKind::Domain, Capability::CreatorOr(AdminRole::GlobalAdmin)),
                (ResourceKind::JobRole, Capability::RoleOnly(AdminRole::GlobalAdmin)),
            ],
        }
    }
}

impl CapabilityTable {
    pub fn capability(&self, resource: ResourceKind) -> Capability {
        self.entries
            .iter()
            .find(|(kind, _)| *kind == resource)
            .map(|(_, capability)| *capability)
            .unwrap_or(Capability::RoleOnly(AdminRole::GlobalAdmin))
    }

    pub fn with_capability(mut self, resource: ResourceKind, capability: Capability) -> Self {
        self.entries.retain(|(kind, _)| *kind != resource);
        self.entries.push((resource, capability));
        self
    }
}

/// A concrete entity the actor wants to touch
#[derive(Clone, Debug)]
pub struct OwnedResource<'a> {
    pub kind: ResourceKind,
    pub name: &'a str,
    pub created_by: Option<&'a str>,
}

impl<'a> OwnedResource<'a> {
    pub fn new(kind: ResourceKind, name: &'a str, created_by: &'a str) -> Self {
        Self {
            kind,
            name,
            created_by: Some(created_by),
        }
    }

    /// A resource kind with no per-entity creator (job roles)
    pub fn unowned(kind: ResourceKind, name: &'a str) -> Self {
        Self {
            kind,
            name,
            created_by: None,
        }
    }
}

pub trait Authorizer {
    fn authorize(&self, actor: &Actor, resource: &OwnedResource<'_>) -> CoreResult<()>;
}

#[derive(Clone, Debug, Default)]
pub struct CapabilityAuthorizer {
    table: CapabilityTable,
}

impl CapabilityAuthorizer {
    pub fn new(table: CapabilityTable) -> Self {
        Self { table }
    }

    pub fn can_modify(&self, actor: &Actor, resource: &OwnedResource<'_>) -> bool {
        match self.table.capability(resource.kind) {
            Capability::CreatorOr(role) => {
                actor.role.has_permission(role) || resource.created_by == Some(actor.username.as_str())
            }
            Capability::RoleOnly(role) => actor.role.has_permission(role),
        }
    }
}

impl Authorizer for CapabilityAuthorizer {
    fn authorize(&self, actor: &Actor, resource: &OwnedResource<'_>) -> CoreResult<()> {
        if self.can_modify(actor, resource) {
            return Ok(());
        }

        let message = match (self.table.capability(resource.kind), resource.created_by) {
            (Capability::CreatorOr(role), Some(creator)) => format!(
                "You do not have permission to modify this {}. Only the creator ({}) or {} users can modify \"{}\".",
                resource.kind.as_str(),
                creator,
                role,
                resource.name
            ),
            (Capability::CreatorOr(role), None) | (Capability::RoleOnly(role), _) => format!(
                "Only {} users can manage {}s (\"{}\").",
                role,
                resource.kind.as_str(),
                resource.name
            ),
        };

        let mut err = CoreError::forbidden(message)
            .with_field("entity", resource.kind.as_str())
            .with_field("name", resource.name);
        if let Some(creator) = resource.created_by {
            err = err.with_field("created_by", creator);
        }
        Err(err)
    }
}

/// `true` iff the actor is a global admin or the entity's creator
pub fn can_modify(actor: &Actor, created_by: &str) -> bool {
    actor.is_global_admin() || actor.username == created_by
}

/// Creator-or-global-admin check with the default capability table
pub fn assert_can_modify(
    actor: &Actor,
    kind: ResourceKind,
    name: &str,
    created_by: &str,
) -> CoreResult<()> {
    CapabilityAuthorizer::default().authorize(actor, &OwnedResource::new(kind, name, created_by))
}
