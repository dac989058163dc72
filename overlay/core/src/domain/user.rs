// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::role::RoleName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host user account, read-only from this crate's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub login: String,
    pub roles: BTreeSet<RoleName>,
}

impl User {
    pub fn new(id: UserId, login: impl Into<String>) -> Self {
        Self {
            id,
            login: login.into(),
            roles: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<RoleName>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// User-management operations subject to containment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagementOperation {
    Edit,
    Delete,
}

impl ManagementOperation {
    /// Maps the host's meta capability name (`edit_user`, `delete_user`).
    pub fn from_meta_cap(cap: &str) -> Option<Self> {
        match cap {
            "edit_user" => Some(Self::Edit),
            "delete_user" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for ManagementOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManagementOperation::Edit => f.write_str("edit"),
            ManagementOperation::Delete => f.write_str("delete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_cap_mapping() {
        assert_eq!(ManagementOperation::from_meta_cap("edit_user"), Some(ManagementOperation::Edit));
        assert_eq!(ManagementOperation::from_meta_cap("delete_user"), Some(ManagementOperation::Delete));
        assert_eq!(ManagementOperation::from_meta_cap("edit_users"), None);
    }

    #[test]
    fn test_user_roles() {
        let user = User::new(UserId(7), "jane").with_role("client");
        assert!(user.has_role("client"));
        assert!(!user.has_role("administrator"));
    }
}
