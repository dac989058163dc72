// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod aggregator;
pub mod containment;
pub mod dispatcher;
pub mod synchronizer;

// Re-export services for convenience
pub use aggregator::CapabilityAggregator;
pub use containment::{AccessContainmentFilter, NOT_ALLOWED_CAP};
pub use dispatcher::{DispatchAction, DispatchOutcome, EventKind, HostEvent, TriggerDispatcher};
pub use synchronizer::{ReconcileReport, RoleProvision, RoleSynchronizer, SyncError};
