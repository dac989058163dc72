// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Trigger Dispatcher
//!
//! Maps host events onto synchronizer work. Each [`EventKind`] has an ordered
//! list of handlers; a handler inspects the event and returns the
//! [`DispatchAction`]s it wants, and the dispatcher executes them in order.
//!
//! Built-in mapping ([`TriggerDispatcher::with_default_handlers`]):
//!
//! | Event | Condition | Actions |
//! |-------|-----------|---------|
//! | `OverlayActivated` | always | ensure role, reconcile |
//! | `OverlayDeactivated` | always | destroy role |
//! | `AdminInit` | listing page + activation marker | reconcile |
//! | `UpgradeCompleted` | payload type in `upgrade_types` | reconcile |
//! | `ListingRendered` | reset parameter set (non-empty, not `0`) | reconcile, notice |
//!
//! The dispatcher keeps no state between events and never coalesces them.
//! Within one event at most one reconciliation runs, however many handlers
//! ask for it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::aggregator::CapabilityAggregator;
use crate::application::synchronizer::{ReconcileReport, RoleProvision, RoleSynchronizer, SyncError};
use crate::domain::config::TriggerSettings;
use crate::domain::events::{AdminNotice, Trigger};
use crate::domain::request::{RequestContext, UpgradeEvent};

/// Environment changes reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// This overlay was activated for the first time (or again)
    OverlayActivated,
    /// This overlay was deactivated or uninstalled
    OverlayDeactivated,
    /// Start of an admin request
    AdminInit(RequestContext),
    /// An upgrade batch finished
    UpgradeCompleted(UpgradeEvent),
    /// The extensions listing is about to render
    ListingRendered(RequestContext),
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::OverlayActivated => EventKind::OverlayActivated,
            HostEvent::OverlayDeactivated => EventKind::OverlayDeactivated,
            HostEvent::AdminInit(_) => EventKind::AdminInit,
            HostEvent::UpgradeCompleted(_) => EventKind::UpgradeCompleted,
            HostEvent::ListingRendered(_) => EventKind::ListingRendered,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    OverlayActivated,
    OverlayDeactivated,
    AdminInit,
    UpgradeCompleted,
    ListingRendered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchAction {
    EnsureRole,
    Reconcile(Trigger),
    DestroyRole,
    Notify(AdminNotice),
}

pub type Handler = Box<dyn Fn(&HostEvent) -> Vec<DispatchAction> + Send + Sync>;

/// What a single dispatch did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub provision: Option<RoleProvision>,
    pub reconciled: Option<ReconcileReport>,
    pub role_destroyed: bool,
    /// The role was absent when a reconciliation was requested
    pub role_missing: bool,
    pub notice: Option<AdminNotice>,
}

impl DispatchOutcome {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

pub struct TriggerDispatcher {
    aggregator: Arc<CapabilityAggregator>,
    synchronizer: Arc<RoleSynchronizer>,
    handlers: BTreeMap<EventKind, Vec<Handler>>,
}

impl TriggerDispatcher {
    /// Dispatcher with no handlers registered.
    pub fn new(aggregator: Arc<CapabilityAggregator>, synchronizer: Arc<RoleSynchronizer>) -> Self {
        Self {
            aggregator,
            synchronizer,
            handlers: BTreeMap::new(),
        }
    }

    pub fn with_default_handlers(
        aggregator: Arc<CapabilityAggregator>,
        synchronizer: Arc<RoleSynchronizer>,
        settings: TriggerSettings,
    ) -> Self {
        let mut dispatcher = Self::new(aggregator, synchronizer);
        dispatcher.register_defaults(settings);
        dispatcher
    }

    /// Appends `handler` to the list for `kind`.
    pub fn register<F>(&mut self, kind: EventKind, handler: F) -> &mut Self
    where
        F: Fn(&HostEvent) -> Vec<DispatchAction> + Send + Sync + 'static,
    {
        self.handlers.entry(kind).or_default().push(Box::new(handler));
        self
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map(Vec::len).unwrap_or(0)
    }

    /// Actions the registered handlers request for `event`, in order.
    pub fn plan(&self, event: &HostEvent) -> Vec<DispatchAction> {
        self.handlers
            .get(&event.kind())
            .map(|handlers| handlers.iter().flat_map(|handler| handler(event)).collect())
            .unwrap_or_default()
    }

    pub async fn dispatch(&self, event: HostEvent) -> Result<DispatchOutcome, SyncError> {
        let actions = self.plan(&event);
        if actions.is_empty() {
            debug!(kind = ?event.kind(), "Event does not trigger reconciliation");
            return Ok(DispatchOutcome::default());
        }

        let mut outcome = DispatchOutcome::default();
        let mut reconcile_attempted = false;

        for action in actions {
            match action {
                DispatchAction::EnsureRole => {
                    outcome.provision = Some(self.synchronizer.ensure_role_exists().await?);
                }
                DispatchAction::Reconcile(trigger) => {
                    if reconcile_attempted {
                        continue;
                    }
                    reconcile_attempted = true;
                    match self.synchronizer.reconcile(&self.aggregator, trigger).await {
                        Ok(report) => outcome.reconciled = Some(report),
                        Err(SyncError::RoleNotFound(role)) => {
                            warn!(%role, ?trigger, "Reconciliation skipped, role missing");
                            outcome.role_missing = true;
                        }
                        Err(err) => return Err(err),
                    }
                }
                DispatchAction::DestroyRole => {
                    outcome.role_destroyed = self.synchronizer.destroy_role().await?;
                }
                DispatchAction::Notify(notice) => {
                    if outcome.reconciled.is_some() {
                        info!(message = %notice.message, "Admin notice queued");
                        outcome.notice = Some(notice);
                    }
                }
            }
        }

        Ok(outcome)
    }

    fn register_defaults(&mut self, settings: TriggerSettings) {
        self.register(EventKind::OverlayActivated, |_| {
            vec![DispatchAction::EnsureRole, DispatchAction::Reconcile(Trigger::Activation)]
        });

        self.register(EventKind::OverlayDeactivated, |_| vec![DispatchAction::DestroyRole]);

        let listing_page = settings.listing_page.clone();
        self.register(EventKind::AdminInit, move |event| match event {
            HostEvent::AdminInit(ctx) if ctx.is_page(&listing_page) && ctx.has_activation_marker() => {
                vec![DispatchAction::Reconcile(Trigger::ExtensionStateChange)]
            }
            _ => Vec::new(),
        });

        let upgrade_types = settings.upgrade_types.clone();
        self.register(EventKind::UpgradeCompleted, move |event| match event {
            HostEvent::UpgradeCompleted(upgrade) if upgrade_types.iter().any(|t| *t == upgrade.kind) => {
                vec![DispatchAction::Reconcile(Trigger::Upgrade)]
            }
            _ => Vec::new(),
        });

        let reset_parameter = settings.reset_parameter;
        self.register(EventKind::ListingRendered, move |event| match event {
            HostEvent::ListingRendered(ctx) if ctx.is_flag_set(&reset_parameter) => vec![
                DispatchAction::Reconcile(Trigger::ManualReset),
                DispatchAction::Notify(AdminNotice::reset_confirmation()),
            ],
            _ => Vec::new(),
        });
    }
}

impl fmt::Debug for TriggerDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: BTreeMap<_, _> = self.handlers.iter().map(|(kind, list)| (kind, list.len())).collect();
        f.debug_struct("TriggerDispatcher")
            .field("role", self.synchronizer.role_name())
            .field("handlers", &counts)
            .finish()
    }
}
