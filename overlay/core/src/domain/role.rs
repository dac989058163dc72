// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Role Entity
//!
//! A [`Role`] is a named, persisted grant table mapping capability names to a
//! boolean status. The client role is owned outright by this crate: every
//! reconciliation replaces its table wholesale through [`Role::replace_all`].

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::capability::CapabilitySet;

/// Name of the role managed by this crate unless configured otherwise.
pub const CLIENT_ROLE: &str = "client";

/// Host role that may manage every registered role.
pub const ADMINISTRATOR_ROLE: &str = "administrator";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(String);

impl RoleName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn client() -> Self {
        Self::new(CLIENT_ROLE)
    }

    pub fn administrator() -> Self {
        Self::new(ADMINISTRATOR_ROLE)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RoleName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoleName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for RoleName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Keys added and removed by a [`Role::replace_all`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDiff {
    pub granted: Vec<String>,
    pub revoked: Vec<String>,
}

impl CapabilityDiff {
    pub fn is_empty(&self) -> bool {
        self.granted.is_empty() && self.revoked.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub name: RoleName,
    pub display_name: String,
    capabilities: BTreeMap<String, bool>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn new(name: RoleName, display_name: impl Into<String>) -> Self {
        Self {
            name,
            display_name: display_name.into(),
            capabilities: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }

    /// Raw grant table, including entries explicitly set to `false`.
    pub fn capabilities(&self) -> &BTreeMap<String, bool> {
        &self.capabilities
    }

    /// Capabilities whose status is `true`.
    pub fn granted(&self) -> CapabilitySet {
        self.capabilities
            .iter()
            .filter(|(_, granted)| **granted)
            .map(|(cap, _)| cap.as_str())
            .collect()
    }

    pub fn has_cap(&self, cap: &str) -> bool {
        self.capabilities.get(cap).copied().unwrap_or(false)
    }

    pub fn grant(&mut self, cap: impl Into<String>) {
        self.capabilities.insert(cap.into(), true);
        self.touch();
    }

    /// Drops the entry entirely. Returns whether it was present.
    pub fn revoke(&mut self, cap: &str) -> bool {
        let removed = self.capabilities.remove(cap).is_some();
        if removed {
            self.touch();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.capabilities.clear();
        self.touch();
    }

    /// Clears the table and grants exactly `caps`, reporting the difference
    /// against the previous table. Entries previously stored as `false` and
    /// now granted count as granted.
    pub fn replace_all(&mut self, caps: &CapabilitySet) -> CapabilityDiff {
        let previous = self.granted();
        let revoked = self
            .capabilities
            .keys()
            .filter(|cap| !caps.contains(cap))
            .cloned()
            .collect();
        let granted = caps
            .iter()
            .filter(|cap| !previous.contains(cap))
            .map(str::to_string)
            .collect();

        self.capabilities = caps.iter().map(|cap| (cap.to_string(), true)).collect();
        self.touch();

        CapabilityDiff { granted, revoked }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
