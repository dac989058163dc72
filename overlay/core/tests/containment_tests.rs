// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::collections::BTreeSet;
use std::sync::Arc;

use client_role_core::application::{AccessContainmentFilter, NOT_ALLOWED_CAP};
use client_role_core::domain::role::RoleName;
use client_role_core::domain::user::{ManagementOperation, User, UserId};
use client_role_core::infrastructure::{EventBus, InMemoryRoleRepository, InMemoryUserRepository};

const ROLES: [&str; 6] = ["administrator", "editor", "author", "contributor", "subscriber", "client"];

fn setup() -> (InMemoryUserRepository, AccessContainmentFilter) {
    let users = InMemoryUserRepository::new();
    users.insert(User::new(UserId(1), "admin").with_role("administrator"));
    users.insert(User::new(UserId(2), "client").with_role("client"));
    users.insert(User::new(UserId(3), "second-client").with_role("client"));
    users.insert(User::new(UserId(4), "editor").with_role("editor"));
    users.insert(User::new(UserId(5), "mixed").with_role("client").with_role("editor"));
    users.insert(User::new(UserId(6), "subscriber").with_role("subscriber"));

    let filter = AccessContainmentFilter::new(
        Arc::new(InMemoryRoleRepository::with_roles(ROLES)),
        Arc::new(users.clone()),
        RoleName::client(),
        EventBus::default(),
    );
    (users, filter)
}

async fn required(filter: &AccessContainmentFilter, cap: &str, actor: u64, target: u64) -> Vec<String> {
    filter
        .map_meta_cap(vec!["edit_users".to_string()], cap, UserId(actor), &[UserId(target)])
        .await
        .unwrap()
}

#[tokio::test]
async fn test_allowed_roles_by_membership() {
    let (_, filter) = setup();

    let admin = User::new(UserId(1), "admin").with_role("administrator");
    let all: BTreeSet<RoleName> = ROLES.iter().map(|r| RoleName::new(*r)).collect();
    assert_eq!(filter.allowed_roles(&admin).await.unwrap(), all);

    let client = User::new(UserId(2), "client").with_role("client");
    assert_eq!(filter.allowed_roles(&client).await.unwrap(), BTreeSet::from([RoleName::client()]));

    let subscriber = User::new(UserId(6), "subscriber").with_role("subscriber");
    assert!(filter.allowed_roles(&subscriber).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_client_may_manage_only_clients() {
    let (_, filter) = setup();

    assert!(!required(&filter, "edit_user", 2, 3).await.contains(&NOT_ALLOWED_CAP.to_string()));
    assert!(!required(&filter, "delete_user", 2, 3).await.contains(&NOT_ALLOWED_CAP.to_string()));

    assert!(required(&filter, "edit_user", 2, 4).await.contains(&NOT_ALLOWED_CAP.to_string()));
    assert!(required(&filter, "delete_user", 2, 1).await.contains(&NOT_ALLOWED_CAP.to_string()));

    // Holding the client role does not help a target that also holds another role
    assert!(required(&filter, "edit_user", 2, 5).await.contains(&NOT_ALLOWED_CAP.to_string()));
}

#[tokio::test]
async fn test_administrator_manages_everyone() {
    let (_, filter) = setup();
    for target in 2..=6 {
        assert_eq!(required(&filter, "delete_user", 1, target).await, vec!["edit_users"]);
    }
}

#[tokio::test]
async fn test_self_management_always_allowed() {
    let (_, filter) = setup();
    for id in 1..=6 {
        assert_eq!(required(&filter, "edit_user", id, id).await, vec!["edit_users"]);
    }
}

#[tokio::test]
async fn test_other_meta_caps_untouched() {
    let (_, filter) = setup();
    assert_eq!(required(&filter, "edit_post", 2, 4).await, vec!["edit_users"]);

    let required = filter
        .map_meta_cap(vec!["edit_users".to_string()], "edit_user", UserId(2), &[])
        .await
        .unwrap();
    assert_eq!(required, vec!["edit_users"]);
}

#[tokio::test]
async fn test_role_listing_for_current_user() {
    let (users, filter) = setup();
    let listing = ROLES
        .iter()
        .map(|r| (RoleName::new(*r), r.to_uppercase()))
        .collect::<std::collections::BTreeMap<_, _>>();

    users.set_current(Some(UserId(2)));
    let visible = filter.filter_role_listing(listing.clone()).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible.get(&RoleName::client()).map(String::as_str), Some("CLIENT"));

    users.set_current(Some(UserId(1)));
    assert_eq!(filter.filter_role_listing(listing.clone()).await.unwrap().len(), ROLES.len());

    users.set_current(Some(UserId(6)));
    assert!(filter.filter_role_listing(listing.clone()).await.unwrap().is_empty());

    users.set_current(None);
    assert!(filter.filter_role_listing(listing).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_direct_check_reports_denial_capability() {
    let (_, filter) = setup();
    let client = User::new(UserId(2), "client").with_role("client");
    let editor = User::new(UserId(4), "editor").with_role("editor");

    assert_eq!(
        filter
            .check_user_management(&client, &editor, ManagementOperation::Edit)
            .await
            .unwrap(),
        Some(NOT_ALLOWED_CAP)
    );
}
