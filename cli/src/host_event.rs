// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Textual host events for `client-role simulate`
//!
//! | Argument | Event |
//! |------|-------|
//! | `activate` | overlay activated |
//! | `deactivate` | overlay deactivated or uninstalled |
//! | `upgrade:<type>[:<action>]` | upgrade batch completed |
//! | `admin-init:<page>[?query]` | admin request started |
//! | `listing:<page>[?query]` | extensions listing rendering |
//!
//! Queries use URL syntax, e.g. `admin-init:plugins.php?activate=true` or
//! `listing:plugins.php?reset-client-role=1`.

use anyhow::{bail, Context, Result};
use url::Url;

use client_role_core::application::HostEvent;
use client_role_core::domain::request::{RequestContext, UpgradeEvent};

pub fn parse_event(arg: &str) -> Result<HostEvent> {
    let (name, rest) = match arg.split_once(':') {
        Some((name, rest)) => (name, Some(rest)),
        None => (arg, None),
    };

    match (name, rest) {
        ("activate", None) => Ok(HostEvent::OverlayActivated),
        ("deactivate" | "uninstall", None) => Ok(HostEvent::OverlayDeactivated),
        ("upgrade", Some(payload)) => {
            let mut parts = payload.splitn(2, ':');
            let kind = parts.next().unwrap_or_default();
            if kind.is_empty() {
                bail!("Upgrade event needs a type: '{}'", arg);
            }
            let mut event = UpgradeEvent::new(kind);
            event.action = parts.next().filter(|a| !a.is_empty()).map(str::to_string);
            Ok(HostEvent::UpgradeCompleted(event))
        }
        ("admin-init", Some(target)) => Ok(HostEvent::AdminInit(parse_request(target)?)),
        ("listing", Some(target)) => Ok(HostEvent::ListingRendered(parse_request(target)?)),
        _ => bail!("Unrecognised event '{}'", arg),
    }
}

/// `page?query` into a request context. An empty page leaves it unset.
pub fn parse_request(target: &str) -> Result<RequestContext> {
    let url = Url::parse("http://localhost/wp-admin/")
        .and_then(|base| base.join(target))
        .with_context(|| format!("Invalid request target '{}'", target))?;

    let page = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|page| !page.is_empty());

    let mut ctx = match page {
        Some(page) => RequestContext::for_page(page),
        None => RequestContext::new(),
    };
    for (key, value) in url.query_pairs() {
        ctx = ctx.with_param(key, value);
    }
    Ok(ctx)
}
