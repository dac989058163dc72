// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Role Synchronizer
//!
//! Writes a computed [`CapabilitySet`] onto the persisted client role and
//! owns the role's lifecycle (create on activation, remove on deactivation).
//!
//! The role is read, its grant table replaced in memory, and the whole role
//! written back in one `save`. A failing lookup aborts before anything is
//! written. Removing the role strips its capabilities from every member; the
//! members are not moved to another role.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::application::aggregator::CapabilityAggregator;
use crate::domain::capability::CapabilitySet;
use crate::domain::config::OverlayConfig;
use crate::domain::events::{RoleEvent, Trigger};
use crate::domain::repository::{RepositoryError, RoleRepository};
use crate::domain::role::{Role, RoleName};
use crate::infrastructure::event_bus::EventBus;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The role does not exist; benign, nothing was written
    #[error("No {0} role found")]
    RoleNotFound(RoleName),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Outcome of [`RoleSynchronizer::ensure_role_exists`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleProvision {
    Created,
    AlreadyPresent,
}

/// Result of writing a capability set onto the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub role: RoleName,
    pub trigger: Trigger,
    pub granted: Vec<String>,
    pub revoked: Vec<String>,
    pub capabilities: CapabilitySet,
}

impl ReconcileReport {
    /// True when the role already held exactly this set.
    pub fn is_noop(&self) -> bool {
        self.granted.is_empty() && self.revoked.is_empty()
    }
}

pub struct RoleSynchronizer {
    roles: Arc<dyn RoleRepository>,
    role_name: RoleName,
    display_name: String,
    event_bus: EventBus,
}

impl RoleSynchronizer {
    pub fn new(
        roles: Arc<dyn RoleRepository>,
        role_name: RoleName,
        display_name: impl Into<String>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            roles,
            role_name,
            display_name: display_name.into(),
            event_bus,
        }
    }

    pub fn from_config(roles: Arc<dyn RoleRepository>, config: &OverlayConfig, event_bus: EventBus) -> Self {
        Self::new(roles, config.role_name(), config.role.display_name.clone(), event_bus)
    }

    pub fn role_name(&self) -> &RoleName {
        &self.role_name
    }

    /// Creates the role if it is missing. An existing role is left untouched;
    /// the caller follows up with a full reconciliation either way.
    pub async fn ensure_role_exists(&self) -> Result<RoleProvision, SyncError> {
        if self.roles.find_by_name(&self.role_name).await?.is_some() {
            info!(role = %self.role_name, "Role already present");
            return Ok(RoleProvision::AlreadyPresent);
        }

        let role = self.roles.create(&self.role_name, &self.display_name).await?;
        info!(role = %role.name, display_name = %role.display_name, "Role created");
        self.event_bus.publish(RoleEvent::RoleCreated {
            role: role.name,
            display_name: role.display_name,
            created_at: Utc::now(),
        });
        Ok(RoleProvision::Created)
    }

    /// Replaces every grant on the role with `caps`.
    pub async fn apply(&self, caps: &CapabilitySet) -> Result<ReconcileReport, SyncError> {
        self.apply_for(caps, Trigger::Direct).await
    }

    /// Computes the set from `aggregator` and applies it.
    pub async fn reconcile(
        &self,
        aggregator: &CapabilityAggregator,
        trigger: Trigger,
    ) -> Result<ReconcileReport, SyncError> {
        let caps = aggregator.compute_capability_set();
        self.apply_for(&caps, trigger).await
    }

    async fn apply_for(&self, caps: &CapabilitySet, trigger: Trigger) -> Result<ReconcileReport, SyncError> {
        let mut role = self.load_role().await?;
        let diff = role.replace_all(caps);
        self.roles.save(&role).await?;

        info!(
            role = %self.role_name,
            ?trigger,
            total = caps.len(),
            granted = diff.granted.len(),
            revoked = diff.revoked.len(),
            "Role capabilities reconciled"
        );
        self.event_bus.publish(RoleEvent::CapabilitiesReconciled {
            role: self.role_name.clone(),
            trigger,
            granted: diff.granted.clone(),
            revoked: diff.revoked.clone(),
            total: caps.len(),
            reconciled_at: Utc::now(),
        });

        Ok(ReconcileReport {
            role: self.role_name.clone(),
            trigger,
            granted: diff.granted,
            revoked: diff.revoked,
            capabilities: caps.clone(),
        })
    }

    /// Removes the role. Returns whether it existed.
    pub async fn destroy_role(&self) -> Result<bool, SyncError> {
        let removed = self.roles.remove(&self.role_name).await?;
        if removed {
            info!(role = %self.role_name, "Role removed");
            self.event_bus.publish(RoleEvent::RoleRemoved {
                role: self.role_name.clone(),
                removed_at: Utc::now(),
            });
        }
        Ok(removed)
    }

    /// The persisted grant table, or `None` when the role is absent.
    pub async fn role_capabilities(&self) -> Result<Option<BTreeMap<String, bool>>, SyncError> {
        Ok(self
            .roles
            .find_by_name(&self.role_name)
            .await?
            .map(|role| role.capabilities().clone()))
    }

    pub async fn has_capabilities(&self) -> Result<bool, SyncError> {
        Ok(self
            .role_capabilities()
            .await?
            .map(|caps| !caps.is_empty())
            .unwrap_or(false))
    }

    async fn load_role(&self) -> Result<Role, SyncError> {
        match self.roles.find_by_name(&self.role_name).await? {
            Some(role) => Ok(role),
            None => {
                warn!(role = %self.role_name, "No role found; nothing to reconcile");
                Err(SyncError::RoleNotFound(self.role_name.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filters::CapabilityFilters;
    use crate::domain::provider::ProviderRegistry;
    use crate::infrastructure::repositories::InMemoryRoleRepository;

    fn synchronizer(repo: &InMemoryRoleRepository) -> RoleSynchronizer {
        RoleSynchronizer::new(
            Arc::new(repo.clone()),
            RoleName::client(),
            "Client",
            EventBus::new(16),
        )
    }

    #[tokio::test]
    async fn test_ensure_role_exists_is_idempotent() {
        let repo = InMemoryRoleRepository::new();
        let sync = synchronizer(&repo);

        assert_eq!(sync.ensure_role_exists().await.unwrap(), RoleProvision::Created);
        assert_eq!(sync.ensure_role_exists().await.unwrap(), RoleProvision::AlreadyPresent);
        assert_eq!(repo.list_names().await.unwrap(), vec![RoleName::client()]);
    }

    #[tokio::test]
    async fn test_ensure_role_exists_keeps_existing_grants() {
        let repo = InMemoryRoleRepository::with_roles(["client"]);
        let sync = synchronizer(&repo);
        sync.apply(&["read"].into_iter().collect()).await.unwrap();

        sync.ensure_role_exists().await.unwrap();
        assert!(sync.has_capabilities().await.unwrap());
    }

    #[tokio::test]
    async fn test_apply_replaces_existing_grants() {
        let repo = InMemoryRoleRepository::with_roles(["client"]);
        let sync = synchronizer(&repo);

        sync.apply(&["read", "switch_themes"].into_iter().collect()).await.unwrap();
        let report = sync.apply(&["read", "upload_files"].into_iter().collect()).await.unwrap();

        assert_eq!(report.granted, vec!["upload_files".to_string()]);
        assert_eq!(report.revoked, vec!["switch_themes".to_string()]);

        let caps = sync.role_capabilities().await.unwrap().unwrap();
        assert_eq!(caps.keys().collect::<Vec<_>>(), vec!["read", "upload_files"]);
        assert!(caps.values().all(|granted| *granted));
    }

    #[tokio::test]
    async fn test_apply_twice_is_idempotent() {
        let repo = InMemoryRoleRepository::with_roles(["client"]);
        let sync = synchronizer(&repo);
        let aggregator = CapabilityAggregator::new(true, ProviderRegistry::new(), Arc::new(CapabilityFilters::new()));

        sync.reconcile(&aggregator, Trigger::Activation).await.unwrap();
        let first = sync.role_capabilities().await.unwrap();
        let report = sync.reconcile(&aggregator, Trigger::ManualReset).await.unwrap();

        assert!(report.is_noop());
        assert_eq!(sync.role_capabilities().await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_missing_role_is_reported() {
        let repo = InMemoryRoleRepository::new();
        let sync = synchronizer(&repo);

        let err = sync.apply(&["read"].into_iter().collect()).await.unwrap_err();
        assert!(matches!(err, SyncError::RoleNotFound(_)));
        assert_eq!(err.to_string(), "No client role found");
        assert!(sync.role_capabilities().await.unwrap().is_none());
        assert!(!sync.has_capabilities().await.unwrap());
    }

    #[tokio::test]
    async fn test_store_failure_leaves_role_untouched() {
        let repo = InMemoryRoleRepository::with_roles(["client"]);
        let sync = synchronizer(&repo);
        sync.apply(&["read"].into_iter().collect()).await.unwrap();

        repo.set_unavailable(true);
        let err = sync.apply(&["export"].into_iter().collect()).await.unwrap_err();
        assert!(matches!(err, SyncError::Repository(RepositoryError::Unavailable(_))));

        repo.set_unavailable(false);
        let caps = sync.role_capabilities().await.unwrap().unwrap();
        assert_eq!(caps.keys().collect::<Vec<_>>(), vec!["read"]);
    }

    #[tokio::test]
    async fn test_destroy_role() {
        let repo = InMemoryRoleRepository::with_roles(["client", "editor"]);
        let sync = synchronizer(&repo);

        assert!(sync.destroy_role().await.unwrap());
        assert!(repo.find_by_name(&RoleName::client()).await.unwrap().is_none());
        assert!(!sync.destroy_role().await.unwrap());
        assert_eq!(repo.list_names().await.unwrap(), vec![RoleName::new("editor")]);
    }

    #[tokio::test]
    async fn test_events_published() {
        let repo = InMemoryRoleRepository::new();
        let bus = EventBus::new(16);
        let mut receiver = bus.subscribe();
        let sync = RoleSynchronizer::new(Arc::new(repo), RoleName::client(), "Client", bus);

        sync.ensure_role_exists().await.unwrap();
        sync.apply(&["read"].into_iter().collect()).await.unwrap();
        sync.destroy_role().await.unwrap();

        let events = receiver.drain();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], RoleEvent::RoleCreated { .. }));
        assert!(matches!(
            &events[1],
            RoleEvent::CapabilitiesReconciled { trigger: Trigger::Direct, total: 1, .. }
        ));
        assert!(matches!(events[2], RoleEvent::RoleRemoved { .. }));
    }
}
