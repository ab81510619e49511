//! Behavioural tests for admin role resolution against the in-memory store.

use std::sync::Arc;

use carehub::domain::{
    Role, RoleBasis, RoleResolution, RoleResolver, RoleState, StoreOperation,
    UserId, paths,
};
use carehub::outbound::memory::{AccessRules, InMemoryDocumentStore};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use serde_json::{Map, json};
use tokio::runtime::Runtime;

#[derive(Clone)]
struct RuntimeHandle(Arc<Runtime>);

#[derive(Default, ScenarioState)]
struct RoleWorld {
    runtime: Slot<RuntimeHandle>,
    store: Slot<Arc<InMemoryDocumentStore>>,
    resolver: Slot<Arc<RoleResolver<InMemoryDocumentStore>>>,
    resolution: Slot<RoleResolution>,
}

impl RoleWorld {
    fn store(&self) -> Arc<InMemoryDocumentStore> {
        self.store.get().expect("store")
    }

    fn resolver(&self) -> Arc<RoleResolver<InMemoryDocumentStore>> {
        self.resolver.get().expect("resolver")
    }

    fn resolve(&self, identity: Option<&UserId>) {
        let runtime = self.runtime.get().expect("runtime").0;
        let resolver = self.resolver();
        let resolution = runtime.block_on(resolver.resolve(identity));
        self.resolution.set(resolution);
    }

    fn resolution(&self) -> RoleResolution {
        self.resolution.get().expect("resolution")
    }
}

fn user(name: &str) -> UserId {
    UserId::new(name).expect("user id")
}

#[fixture]
fn world() -> RoleWorld {
    RoleWorld::default()
}

#[given("a role resolver over an in-memory store")]
fn a_role_resolver_over_an_in_memory_store(world: &RoleWorld) {
    let runtime = Runtime::new().expect("create runtime");
    let store = Arc::new(InMemoryDocumentStore::new());
    world.resolver.set(Arc::new(RoleResolver::new(Arc::clone(&store))));
    world.store.set(store);
    world.runtime.set(RuntimeHandle(Arc::new(runtime)));
}

#[given("marker lookups are denied")]
fn marker_lookups_are_denied(world: &RoleWorld) {
    world
        .store()
        .set_rules(AccessRules::allow_all().deny(StoreOperation::Read, "roles_admin"));
}

#[given("user {name} holds the admin marker")]
fn user_holds_the_admin_marker(world: &RoleWorld, name: String) {
    let mut marker = Map::new();
    marker.insert("grantedBy".into(), json!("facility-owner"));
    world
        .store()
        .seed(paths::admin_role_marker(&user(&name)), marker);
}

#[when("an anonymous caller's role is resolved")]
fn an_anonymous_callers_role_is_resolved(world: &RoleWorld) {
    world.resolve(None);
}

#[when("the role is resolved for {name}")]
fn the_role_is_resolved_for(world: &RoleWorld, name: String) {
    world.resolve(Some(&user(&name)));
}

#[when("the identity changes to {name}")]
fn the_identity_changes_to(world: &RoleWorld, name: String) {
    world.resolver().identity_changed(Some(user(&name)));
}

#[then("the role is standard")]
fn the_role_is_standard(world: &RoleWorld) {
    assert_eq!(world.resolution().role, Role::Standard);
}

#[then("the role is elevated")]
fn the_role_is_elevated(world: &RoleWorld) {
    let resolution = world.resolution();
    assert!(resolution.is_elevated());
    assert_eq!(resolution.basis, RoleBasis::MarkerPresent);
    assert_eq!(world.resolver().state(), RoleState::Resolved(resolution));
}

#[then("the basis is anonymous")]
fn the_basis_is_anonymous(world: &RoleWorld) {
    assert_eq!(world.resolution().basis, RoleBasis::Anonymous);
}

#[then("the basis records the lookup failure")]
fn the_basis_records_the_lookup_failure(world: &RoleWorld) {
    let basis = world.resolution().basis;
    assert!(
        matches!(basis, RoleBasis::LookupFailed { ref message } if !message.is_empty()),
        "unexpected basis: {basis:?}"
    );
}

#[then("the resolver is loading")]
fn the_resolver_is_loading(world: &RoleWorld) {
    assert_eq!(world.resolver().state(), RoleState::Loading);
}

#[scenario(
    path = "tests/features/role_resolution.feature",
    name = "Anonymous callers are standard without a marker lookup"
)]
fn anonymous_callers_are_standard(world: RoleWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/role_resolution.feature",
    name = "A present marker elevates the user"
)]
fn a_present_marker_elevates_the_user(world: RoleWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/role_resolution.feature",
    name = "A failed marker lookup resolves to standard"
)]
fn a_failed_marker_lookup_resolves_to_standard(world: RoleWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/role_resolution.feature",
    name = "Switching users re-runs the probe"
)]
fn switching_users_reruns_the_probe(world: RoleWorld) {
    drop(world);
}
