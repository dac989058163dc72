// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-Memory Store Implementations
//!
//! Lightweight implementations of the role and user stores for development
//! and testing. The host platform supplies its own implementations in
//! production.
//!
//! `InMemoryRoleRepository` can be switched to an unavailable state to
//! exercise store-failure handling.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::repository::{RepositoryError, RoleRepository, UserRepository};
use crate::domain::role::{Role, RoleName};
use crate::domain::user::{User, UserId};

#[derive(Clone, Default)]
pub struct InMemoryRoleRepository {
    roles: Arc<RwLock<BTreeMap<RoleName, Role>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryRoleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with empty roles of the given names
    pub fn with_roles<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<RoleName>,
    {
        let repo = Self::new();
        {
            let mut roles = repo.roles.write();
            for name in names {
                let name = name.into();
                let display_name = name.to_string();
                roles.insert(name.clone(), Role::new(name, display_name));
            }
        }
        repo
    }

    /// Makes every subsequent call fail with `RepositoryError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("role store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn find_by_name(&self, name: &RoleName) -> Result<Option<Role>, RepositoryError> {
        self.check_available()?;
        Ok(self.roles.read().get(name).cloned())
    }

    async fn create(&self, name: &RoleName, display_name: &str) -> Result<Role, RepositoryError> {
        self.check_available()?;
        let mut roles = self.roles.write();
        if roles.contains_key(name) {
            return Err(RepositoryError::Conflict(name.to_string()));
        }
        let role = Role::new(name.clone(), display_name);
        roles.insert(name.clone(), role.clone());
        Ok(role)
    }

    async fn save(&self, role: &Role) -> Result<(), RepositoryError> {
        self.check_available()?;
        let mut roles = self.roles.write();
        match roles.get_mut(&role.name) {
            Some(stored) => {
                *stored = role.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(role.name.to_string())),
        }
    }

    async fn remove(&self, name: &RoleName) -> Result<bool, RepositoryError> {
        self.check_available()?;
        Ok(self.roles.write().remove(name).is_some())
    }

    async fn list_names(&self) -> Result<Vec<RoleName>, RepositoryError> {
        self.check_available()?;
        Ok(self.roles.read().keys().cloned().collect())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<BTreeMap<UserId, User>>>,
    current: Arc<RwLock<Option<UserId>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        self.users.write().insert(user.id, user);
    }

    /// Sets the user the "current request" acts as
    pub fn set_current(&self, id: Option<UserId>) {
        *self.current.write() = id;
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn current_user(&self) -> Result<Option<User>, RepositoryError> {
        let current = *self.current.read();
        Ok(current.and_then(|id| self.users.read().get(&id).cloned()))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_conflicts_on_existing_role() {
        let repo = InMemoryRoleRepository::new();
        let name = RoleName::client();
        repo.create(&name, "Client").await.unwrap();
        assert!(matches!(
            repo.create(&name, "Client").await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_save_requires_existing_role() {
        let repo = InMemoryRoleRepository::new();
        let role = Role::new(RoleName::client(), "Client");
        assert!(matches!(repo.save(&role).await, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let repo = InMemoryRoleRepository::with_roles(["editor"]);
        repo.set_unavailable(true);
        assert!(matches!(
            repo.list_names().await,
            Err(RepositoryError::Unavailable(_))
        ));
        repo.set_unavailable(false);
        assert_eq!(repo.list_names().await.unwrap(), vec![RoleName::new("editor")]);
    }

    #[test]
    fn test_remove_reports_existence() {
        let repo = InMemoryRoleRepository::with_roles(["client", "editor"]);
        let name = RoleName::client();

        assert!(tokio_test::block_on(repo.remove(&name)).unwrap());
        assert!(!tokio_test::block_on(repo.remove(&name)).unwrap());
        assert_eq!(
            tokio_test::block_on(repo.list_names()).unwrap(),
            vec![RoleName::new("editor")]
        );
    }

    #[tokio::test]
    async fn test_current_user() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.current_user().await.unwrap().is_none());

        repo.insert(User::new(UserId(1), "admin").with_role("administrator"));
        repo.set_current(Some(UserId(1)));
        let user = repo.current_user().await.unwrap().unwrap();
        assert!(user.has_role("administrator"));
    }
}
