// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::RoleName;
use super::user::{ManagementOperation, UserId};

/// What caused a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Activation,
    ExtensionStateChange,
    Upgrade,
    ManualReset,
    Direct,
}

/// Role lifecycle and containment events, published on the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoleEvent {
    RoleCreated {
        role: RoleName,
        display_name: String,
        created_at: DateTime<Utc>,
    },
    CapabilitiesReconciled {
        role: RoleName,
        trigger: Trigger,
        granted: Vec<String>,
        revoked: Vec<String>,
        total: usize,
        reconciled_at: DateTime<Utc>,
    },
    RoleRemoved {
        role: RoleName,
        removed_at: DateTime<Utc>,
    },
    ManagementDenied {
        actor: UserId,
        target: UserId,
        operation: ManagementOperation,
        denied_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// One-shot message for the admin screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminNotice {
    pub level: NoticeLevel,
    pub message: String,
    pub dismissible: bool,
}

impl AdminNotice {
    pub fn reset_confirmation() -> Self {
        Self {
            level: NoticeLevel::Success,
            message: "Client role reset".to_string(),
            dismissible: true,
        }
    }
}
