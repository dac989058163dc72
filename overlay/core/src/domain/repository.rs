// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Store Interfaces
//!
//! Persistence contracts for the host platform's role and user stores. The
//! host supplies implementations; [`crate::infrastructure::repositories`]
//! provides in-memory ones for development and tests.
//!
//! A role is always written whole through [`RoleRepository::save`], so a
//! reconciliation never leaves a half-cleared grant table behind.

use async_trait::async_trait;

use super::role::{Role, RoleName};
use super::user::{User, UserId};

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_name(&self, name: &RoleName) -> Result<Option<Role>, RepositoryError>;

    /// Fails with [`RepositoryError::Conflict`] if the role already exists.
    async fn create(&self, name: &RoleName, display_name: &str) -> Result<Role, RepositoryError>;

    /// Replaces the stored role, grant table included.
    async fn save(&self, role: &Role) -> Result<(), RepositoryError>;

    /// Returns whether a role was removed.
    async fn remove(&self, name: &RoleName) -> Result<bool, RepositoryError>;

    /// Every registered role name.
    async fn list_names(&self) -> Result<Vec<RoleName>, RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// The user the current request acts as, if any.
    async fn current_user(&self) -> Result<Option<User>, RepositoryError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
}

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Entity already exists: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
