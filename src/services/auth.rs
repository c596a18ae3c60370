//! Domain service for authentication, user management and profiles.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::db::{NewUser, Store, User};

/// Errors specific to authentication and user management.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Login failed")]
    InvalidCredentials,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Access level attached to every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Editor,
    Admin,
}

impl Role {
    /// Editors and admins see and manage every article, not just their own.
    #[must_use]
    pub const fn can_moderate(self) -> bool {
        matches!(self, Self::Editor | Self::Admin)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Editor => "editor",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "editor" => Some(Self::Editor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller of a service operation, as recorded in the
/// session at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub username: String,
    pub role: Role,
}

pub struct AuthService {
    store: Store,
    security: SecurityConfig,
}

impl AuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    /// Verify credentials. Both unknown usernames and wrong passwords map
    /// to the same error so the response cannot be used to probe which
    /// usernames exist.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let is_valid = self.store.verify_user_password(username, password).await?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        self.store
            .get_user_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)
    }

    /// Admin-only: add an account with an explicit role.
    pub async fn create_user(&self, actor: &Actor, new_user: NewUser) -> Result<User, AuthError> {
        if actor.role != Role::Admin {
            return Err(AuthError::Forbidden(
                "Only admins can manage users".to_string(),
            ));
        }

        if new_user.username.trim().is_empty() || new_user.password.is_empty() {
            return Err(AuthError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        if self
            .store
            .get_user_by_username(&new_user.username)
            .await?
            .is_some()
        {
            return Err(AuthError::UsernameTaken);
        }

        match self.store.create_user(new_user, &self.security).await {
            Ok(user) => Ok(user),
            // A concurrent registration can still hit the unique index
            Err(e) if e.to_string().to_lowercase().contains("unique") => {
                Err(AuthError::UsernameTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Change one's own password; the current password must verify and the
    /// confirmation must match before anything is written.
    pub async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        if current_password.is_empty() || new_password.is_empty() || confirm_password.is_empty() {
            return Err(AuthError::Validation(
                "All password fields are required".to_string(),
            ));
        }

        if new_password != confirm_password {
            return Err(AuthError::Validation(
                "New password and confirmation do not match".to_string(),
            ));
        }

        let is_valid = self
            .store
            .verify_user_password(username, current_password)
            .await?;

        if !is_valid {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_user_password(username, new_password, &self.security)
            .await?;

        Ok(())
    }

    /// Admin-only: overwrite another user's password without knowing the
    /// current one.
    pub async fn reset_password(
        &self,
        actor: &Actor,
        target: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        if actor.role != Role::Admin {
            return Err(AuthError::Forbidden(
                "Only admins can reset passwords".to_string(),
            ));
        }

        if new_password.is_empty() || confirm_password.is_empty() {
            return Err(AuthError::Validation(
                "Password cannot be empty".to_string(),
            ));
        }

        if new_password != confirm_password {
            return Err(AuthError::Validation(
                "Password and confirmation do not match".to_string(),
            ));
        }

        if self.store.get_user_by_username(target).await?.is_none() {
            return Err(AuthError::UserNotFound);
        }

        self.store
            .update_user_password(target, new_password, &self.security)
            .await?;

        Ok(())
    }

    pub async fn update_profile(
        &self,
        username: &str,
        display_name: Option<String>,
        bio: Option<String>,
        avatar: Option<String>,
    ) -> Result<User, AuthError> {
        if self.store.get_user_by_username(username).await?.is_none() {
            return Err(AuthError::UserNotFound);
        }

        let user = self
            .store
            .update_user_profile(username, display_name, bio, avatar)
            .await?;

        Ok(user)
    }
}
