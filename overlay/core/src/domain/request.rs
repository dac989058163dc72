// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Request Context
//!
//! The slice of an inbound admin request that the trigger dispatcher needs:
//! the page being served and its query parameters. Hosts build one per
//! request instead of the dispatcher reading ambient request state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Query markers the extensions listing page carries after a state change.
pub const ACTIVATION_MARKERS: [&str; 4] = ["activate", "deactivate", "activate-multi", "deactivate-multi"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub page: Option<String>,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_page(page: impl Into<String>) -> Self {
        Self {
            page: Some(page.into()),
            query: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn has_param(&self, key: &str) -> bool {
        self.query.contains_key(key)
    }

    pub fn is_page(&self, page: &str) -> bool {
        self.page.as_deref() == Some(page)
    }

    /// True when any of [`ACTIVATION_MARKERS`] is present.
    pub fn has_activation_marker(&self) -> bool {
        ACTIVATION_MARKERS.iter().any(|marker| self.has_param(marker))
    }

    /// True when `key` is present with a value the host treats as set:
    /// anything except the empty string and `0`.
    pub fn is_flag_set(&self, key: &str) -> bool {
        self.param(key).map(is_set).unwrap_or(false)
    }
}

/// Payload of a completed upgrade batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl UpgradeEvent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            action: None,
        }
    }
}

fn is_set(value: &str) -> bool {
    !value.is_empty() && value != "0"
}
