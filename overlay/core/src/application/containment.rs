// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Access Containment Filter
//!
//! Request-time policy that narrows who may manage whom, independent of the
//! reconciled capability set:
//!
//! | Actor holds | Allowed roles |
//! |-------------|---------------|
//! | `administrator` | every registered role |
//! | the client role | the client role only |
//! | anything else | none |
//!
//! A denial is not an error. [`AccessContainmentFilter::map_meta_cap`] adds
//! [`NOT_ALLOWED_CAP`] to the host's required capabilities, a capability no
//! user holds, so the host's own permission check refuses the operation and
//! renders its usual error.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::events::RoleEvent;
use crate::domain::repository::{RepositoryError, RoleRepository, UserRepository};
use crate::domain::role::{RoleName, ADMINISTRATOR_ROLE};
use crate::domain::user::{ManagementOperation, User, UserId};
use crate::infrastructure::event_bus::EventBus;

/// Pseudo-capability that can never be satisfied.
pub const NOT_ALLOWED_CAP: &str = "not_allowed";

/// Meta capability that cannot be granted directly and is mapped instead.
pub const PRIVACY_OPTIONS_CAP: &str = "manage_privacy_options";
pub const PRIVACY_OPTIONS_MAPPED_CAP: &str = "edit_theme_options";

pub struct AccessContainmentFilter {
    roles: Arc<dyn RoleRepository>,
    users: Arc<dyn UserRepository>,
    client_role: RoleName,
    event_bus: EventBus,
}

impl AccessContainmentFilter {
    pub fn new(
        roles: Arc<dyn RoleRepository>,
        users: Arc<dyn UserRepository>,
        client_role: RoleName,
        event_bus: EventBus,
    ) -> Self {
        Self {
            roles,
            users,
            client_role,
            event_bus,
        }
    }

    /// Roles `actor` may view, assign or manage.
    pub async fn allowed_roles(&self, actor: &User) -> Result<BTreeSet<RoleName>, RepositoryError> {
        if actor.has_role(ADMINISTRATOR_ROLE) {
            return Ok(self.roles.list_names().await?.into_iter().collect());
        }
        if actor.roles.contains(&self.client_role) {
            return Ok(BTreeSet::from([self.client_role.clone()]));
        }
        Ok(BTreeSet::new())
    }

    /// `all_roles` ∩ [`Self::allowed_roles`].
    pub async fn filter_editable_roles(
        &self,
        all_roles: &BTreeSet<RoleName>,
        actor: &User,
    ) -> Result<BTreeSet<RoleName>, RepositoryError> {
        let allowed = self.allowed_roles(actor).await?;
        Ok(all_roles.intersection(&allowed).cloned().collect())
    }

    /// Filters the host's editable-roles listing for the current user,
    /// keeping each entry's payload. A missing current user holds no roles,
    /// so every entry is removed.
    pub async fn filter_role_listing<T>(
        &self,
        mut listing: BTreeMap<RoleName, T>,
    ) -> Result<BTreeMap<RoleName, T>, RepositoryError>
    where
        T: Send,
    {
        let allowed = match self.users.current_user().await? {
            Some(actor) => self.allowed_roles(&actor).await?,
            None => {
                debug!("No current user; role listing emptied");
                BTreeSet::new()
            }
        };
        listing.retain(|role, _| allowed.contains(role));
        Ok(listing)
    }

    /// Returns [`NOT_ALLOWED_CAP`] when `acting` may not perform `operation`
    /// on `target`. Acting on oneself is always allowed.
    pub async fn check_user_management(
        &self,
        acting: &User,
        target: &User,
        operation: ManagementOperation,
    ) -> Result<Option<&'static str>, RepositoryError> {
        if acting.id == target.id {
            return Ok(None);
        }

        let allowed = self.allowed_roles(acting).await?;
        if target.roles.is_subset(&allowed) {
            return Ok(None);
        }

        warn!(
            actor = %acting.id,
            target = %target.id,
            %operation,
            "User management outside allowed roles denied"
        );
        self.event_bus.publish(RoleEvent::ManagementDenied {
            actor: acting.id,
            target: target.id,
            operation,
            denied_at: Utc::now(),
        });
        Ok(Some(NOT_ALLOWED_CAP))
    }

    /// Adjusts the primitive capabilities the host requires for meta
    /// capability `cap`, requested by `actor_id` with arguments `args`.
    ///
    /// Unknown acting or target users leave `required` untouched.
    pub async fn map_meta_cap(
        &self,
        mut required: Vec<String>,
        cap: &str,
        actor_id: UserId,
        args: &[UserId],
    ) -> Result<Vec<String>, RepositoryError> {
        if cap == PRIVACY_OPTIONS_CAP {
            required = vec![PRIVACY_OPTIONS_MAPPED_CAP.to_string()];
        }

        let (Some(operation), Some(target_id)) = (ManagementOperation::from_meta_cap(cap), args.first()) else {
            return Ok(required);
        };

        let acting = self.users.find_by_id(actor_id).await?;
        let target = self.users.find_by_id(*target_id).await?;
        let (Some(acting), Some(target)) = (acting, target) else {
            debug!(actor = %actor_id, target = %target_id, "Unknown user in management check");
            return Ok(required);
        };

        if let Some(denial) = self.check_user_management(&acting, &target, operation).await? {
            required.push(denial.to_string());
        }
        Ok(required)
    }

    /// Whether the host must unhook the form companion's own capability
    /// check for `user`; that check misbehaves for members of the client role.
    pub fn suppresses_companion_cap_filter(&self, user: &User) -> bool {
        user.roles.contains(&self.client_role)
    }
}
