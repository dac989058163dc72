// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Capability Set
//!
//! [`CapabilitySet`] is the unit of computation for the aggregator: an
//! ordered, de-duplicated set of capability names. Ordering is lexical so
//! every rendering of a set (logs, events, CLI output) is stable.
//!
//! The two reference lists below are fixed. Blog capabilities are never
//! inferred from names; [`BLOG_CAPS`] is the only source of truth for what
//! the blog toggle removes from [`DEFAULT_CLIENT_CAPS`].

use std::collections::btree_set;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Built-in grants for the client role before blog handling and filters.
pub const DEFAULT_CLIENT_CAPS: &[&str] = &[
    // Admin
    "edit_theme_options",
    "export",
    "create_users",
    "delete_users",
    "edit_users",
    "list_users",
    "promote_users",
    "remove_users",
    // Editor
    "moderate_comments",
    "manage_categories",
    "manage_links",
    "edit_others_posts",
    "edit_pages",
    "edit_others_pages",
    "edit_published_pages",
    "publish_pages",
    "delete_pages",
    "delete_others_pages",
    "delete_published_pages",
    "delete_others_posts",
    "delete_private_posts",
    "edit_private_posts",
    "read_private_posts",
    "delete_private_pages",
    "edit_private_pages",
    "read_private_pages",
    "unfiltered_html",
    // Author
    "edit_published_posts",
    "upload_files",
    "publish_posts",
    "delete_published_posts",
    // Contributor
    "edit_posts",
    "delete_posts",
    // All
    "read",
];

/// Capabilities that only make sense while the site runs a blog.
pub const BLOG_CAPS: &[&str] = &[
    "edit_posts",
    "edit_others_posts",
    "edit_published_posts",
    "publish_posts",
    "delete_posts",
    "delete_others_posts",
    "delete_published_posts",
    "delete_private_posts",
    "edit_private_posts",
    "read_private_posts",
    "manage_categories",
    "moderate_comments",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<String>);

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the capability was not already present.
    pub fn insert(&mut self, cap: impl Into<String>) -> bool {
        self.0.insert(cap.into())
    }

    pub fn remove(&mut self, cap: &str) -> bool {
        self.0.remove(cap)
    }

    pub fn contains(&self, cap: &str) -> bool {
        self.0.contains(cap)
    }

    /// Union `other` into `self`.
    pub fn merge(&mut self, other: CapabilitySet) {
        self.0.extend(other.0);
    }

    /// Copy of `self` without any capability in `other`.
    pub fn difference(&self, other: &CapabilitySet) -> CapabilitySet {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for CapabilitySet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for CapabilitySet {
    type Item = String;
    type IntoIter = btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CapabilitySet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
