use super::*;
use crate::guard::Views;
use crate::identity::{Identity, Role, RoleSet};

fn table() -> RouteTable {
    RouteTable::new()
        .protect("/dashboard", AccessRequirement::AnyAuthenticated)
        .protect("/dashboard/admin", Role::Admin)
        .protect("/quotes/", AccessRequirement::roles(Role::Admin, &[Role::Employee]))
        .protect("/products", RoleSet::of(Role::Admin, &[Role::Employee]))
}

fn customer() -> SessionState {
    SessionState::authenticated(Identity {
        id: "c1".into(),
        email: "c@tedics.com".into(),
        first_name: "Cleo".into(),
        last_name: String::new(),
        role: Role::Customer,
        phone: None,
        address: None,
        company: Some("Acme".into()),
    })
}

#[test]
fn unprotected_paths_have_no_requirement() {
    let routes = table();
    assert_eq!(routes.requirement_for("/"), None);
    assert_eq!(routes.requirement_for("/login"), None);
    assert_eq!(routes.requirement_for("/dashboards"), None);
}

#[test]
fn prefix_match_is_segment_aware() {
    let routes = table();
    assert_eq!(routes.requirement_for("/dashboard"), Some(AccessRequirement::AnyAuthenticated));
    assert_eq!(routes.requirement_for("/dashboard/"), Some(AccessRequirement::AnyAuthenticated));
    assert_eq!(routes.requirement_for("/dashboard/profile"), Some(AccessRequirement::AnyAuthenticated));
}

#[test]
fn longest_prefix_wins() {
    let routes = table();
    assert_eq!(routes.requirement_for("/dashboard/admin/users"), Some(AccessRequirement::from(Role::Admin)));
}

#[test]
fn query_and_fragment_are_ignored() {
    let routes = table();
    assert_eq!(
        routes.requirement_for("/quotes?page=2#top"),
        Some(AccessRequirement::roles(Role::Admin, &[Role::Employee]))
    );
}

#[test]
fn protect_replaces_existing_rule() {
    let routes = table().protect("/products/", AccessRequirement::AnyAuthenticated);
    assert_eq!(routes.len(), 4);
    assert_eq!(routes.requirement_for("/products/42"), Some(AccessRequirement::AnyAuthenticated));
}

#[test]
fn root_rule_covers_everything() {
    let routes = RouteTable::new().protect("/", AccessRequirement::AnyAuthenticated);
    assert_eq!(routes.requirement_for("/anything/at/all"), Some(AccessRequirement::AnyAuthenticated));
    assert!(RouteTable::new().is_empty());
}

#[test]
fn evaluate_path_applies_matching_rule() {
    let guard = AccessGuard::new(Views::new("/login", "/"));
    let routes = table();
    let state = customer();

    assert_eq!(guard.evaluate_path(&state, &routes, "/dashboard"), Decision::Allow);
    assert_eq!(guard.evaluate_path(&state, &routes, "/quotes/7"), Decision::DenyRedirectTo("/".into()));
    assert_eq!(guard.evaluate_path(&state, &routes, "/about"), Decision::Allow);
}

#[test]
fn evaluate_path_public_route_allowed_while_resolving() {
    let guard = AccessGuard::new(Views::new("/login", "/"));
    let routes = table();
    let state = SessionState::resolving();

    assert_eq!(guard.evaluate_path(&state, &routes, "/login"), Decision::Allow);
    assert_eq!(guard.evaluate_path(&state, &routes, "/dashboard"), Decision::Indeterminate);
}
