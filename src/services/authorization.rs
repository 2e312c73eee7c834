use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{info, warn};

use crate::auth::{Actor, AdminRole};
use crate::database::entities::admin_users;
use crate::errors::{CoreError, CoreResult};

/// Maps an already-authenticated username to the acting administrator.
#[derive(Clone)]
pub struct AuthorizationService {
    db: DatabaseConnection,
}

impl AuthorizationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn resolve_actor(&self, username: &str) -> CoreResult<Actor> {
        let user = admin_users::Entity::find()
            .filter(admin_users::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        match user {
            Some(user) if user.is_active => user.to_actor(),
            Some(_) => {
                warn!("Inactive admin user {} attempted access", username);
                Err(CoreError::unauthorized(format!(
                    "Admin user {} is inactive",
                    username
                )))
            }
            None => Err(CoreError::unauthorized("Admin user not found")),
        }
    }

    /// Add an administrator. Only a global admin may add others; `None` is
    /// the bootstrap path used by the CLI for the first account.
    pub async fn register_admin(
        &self,
        username: &str,
        email: &str,
        role: AdminRole,
        registered_by: Option<&Actor>,
    ) -> CoreResult<admin_users::Model> {
        if let Some(actor) = registered_by {
            if !actor.is_global_admin() {
                return Err(CoreError::forbidden("Only global admins can create users"));
            }
        }
        if username.trim().is_empty() {
            return Err(CoreError::validation("Username is required"));
        }

        let existing = admin_users::Entity::find()
            .filter(admin_users::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CoreError::conflict("Username already exists").with_field("username", username));
        }

        let now = Utc::now();
        let user = admin_users::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            role: Set(role.as_str().to_string()),
            is_active: Set(true),
            created_by: Set(registered_by.map(|actor| actor.username.clone())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let user = user.insert(&self.db).await?;

        info!("Registered admin user {} ({})", user.username, user.role);
        Ok(user)
    }

    pub async fn deactivate_admin(&self, actor: &Actor, username: &str) -> CoreResult<()> {
        if !actor.is_global_admin() {
            return Err(CoreError::forbidden("Only global admins can update users"));
        }
        let user = admin_users::Entity::find()
            .filter(admin_users::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("Admin user", username))?;

        let mut active: admin_users::ActiveModel = user.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;

        info!("Deactivated admin user {}", username);
        Ok(())
    }
}
