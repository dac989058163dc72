// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Admin Screen Output
//!
//! The overlay's only user-visible surfaces: the "Reset" action link on its
//! row in the extensions listing, and the dismissible notice shown after a
//! manual reset. Also widens the host's author dropdown query so members of
//! the client role can be picked as authors.

use std::collections::BTreeMap;

use url::Url;

use crate::domain::events::{AdminNotice, NoticeLevel};

/// URL of the manual reset: `<admin_base>/<listing_page>?<reset_parameter>=true`.
pub fn reset_url(admin_base: &str, listing_page: &str, reset_parameter: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(admin_base)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    let mut url = base.join(listing_page)?;
    url.query_pairs_mut().append_pair(reset_parameter, "true");
    Ok(url)
}

/// Appends the "Reset" anchor to the overlay's action links.
pub fn append_reset_link(
    mut links: Vec<String>,
    admin_base: &str,
    listing_page: &str,
    reset_parameter: &str,
) -> Result<Vec<String>, url::ParseError> {
    let url = reset_url(admin_base, listing_page, reset_parameter)?;
    links.push(format!(r#"<a href="{}">Reset</a>"#, escape_html(url.as_str())));
    Ok(links)
}

pub fn render_notice(notice: &AdminNotice) -> String {
    let level = match notice.level {
        NoticeLevel::Success => "updated",
        NoticeLevel::Warning => "notice-warning",
        NoticeLevel::Error => "error",
    };
    let dismissible = if notice.dismissible { " is-dismissible" } else { "" };
    format!(
        r#"<div id="message" class="{} notice{}"><p>{}</p></div>"#,
        level,
        dismissible,
        escape_html(&notice.message)
    )
}

/// Clears the `who` restriction (authors only) on the user dropdown query.
pub fn widen_author_dropdown(mut query: BTreeMap<String, String>) -> BTreeMap<String, String> {
    query.insert("who".to_string(), String::new());
    query
}

/// Same entity set as the host's attribute escaping, which writes the
/// single quote as `&#039;`.
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}
