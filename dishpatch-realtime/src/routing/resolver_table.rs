//! Per-event-type room resolution policies and their lookup table.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::Value;
use tracing::warn;

use crate::observability::events;
use crate::routing::room::RoomId;

const COMPONENT: &str = "resolver_table";

/// Pure mapping from an event payload to the rooms that should receive it.
///
/// Resolvers must tolerate any payload shape: a missing field omits the
/// dependent room instead of failing, and a resolver never panics. Plain
/// function pointers keep registrations stateless.
pub type RoomResolver = fn(&Value) -> Vec<RoomId>;

/// Immutable mapping from event-type name to its room resolver.
///
/// The table is constructed once at startup and passed by reference into
/// resolution; there is no ambient registry, so tests can run against a
/// reduced or substituted mapping.
pub struct ResolverTable {
    resolvers: HashMap<&'static str, RoomResolver>,
}

impl ResolverTable {
    /// Creates a table with no registered policies.
    pub fn empty() -> Self {
        Self {
            resolvers: HashMap::new(),
        }
    }

    /// Creates the production table covering every routed event type.
    pub fn with_default_policies() -> Self {
        let mut table = Self::empty();
        table.register("restaurant.created", restaurant_created);
        table.register("restaurant.updated", restaurant_updated);
        table.register("restaurant.status.changed", restaurant_status_changed);
        table.register("owner.approved", owner_status_changed);
        table.register("owner.rejected", owner_status_changed);
        table.register("menu.product.created", menu_product_changed);
        table.register("menu.product.updated", menu_product_changed);
        table.register("branch.created", branch_created);
        table.register("order.placed", order_placed);
        table.register("order.status.changed", order_status_changed);
        table
    }

    /// Registers `resolver` under `event_type`, replacing any previous entry.
    pub fn register(&mut self, event_type: &'static str, resolver: RoomResolver) {
        self.resolvers.insert(event_type, resolver);
    }

    /// Resolves the target rooms for one event.
    ///
    /// An unknown event type yields an empty sequence, not an error. A
    /// panicking resolver violates the resolver contract; the panic is
    /// contained here and logged as a defect, and the event falls through
    /// to the broadcast path.
    pub fn resolve(&self, event_type: &str, payload: &Value) -> Vec<RoomId> {
        let Some(resolver) = self.resolvers.get(event_type) else {
            return Vec::new();
        };

        match catch_unwind(AssertUnwindSafe(|| resolver(payload))) {
            Ok(rooms) => rooms,
            Err(_) => {
                warn!(
                    event = events::RESOLVER_PANICKED,
                    component = COMPONENT,
                    event_type,
                    "resolver panicked; treating as unroutable"
                );
                Vec::new()
            }
        }
    }
}

/// Reads an identifier field that services publish either as a JSON string
/// or as a bare number.
fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn restaurant_created(payload: &Value) -> Vec<RoomId> {
    let mut rooms = vec![RoomId::admin_restaurants(), RoomId::catalog_restaurants()];
    if let Some(id) = id_string(payload.get("restaurant").and_then(|r| r.get("id"))) {
        rooms.push(RoomId::restaurant(&id));
    }
    if let Some(owner) = id_string(payload.get("ownerUserId")) {
        rooms.push(RoomId::restaurant_owner(&owner));
    }
    rooms
}

fn restaurant_updated(payload: &Value) -> Vec<RoomId> {
    let mut rooms = vec![RoomId::catalog_restaurants()];
    if let Some(id) = id_string(payload.get("restaurant").and_then(|r| r.get("id"))) {
        rooms.push(RoomId::restaurant(&id));
    }
    rooms
}

fn restaurant_status_changed(payload: &Value) -> Vec<RoomId> {
    let mut rooms = vec![RoomId::admin_restaurants()];
    if let Some(id) = id_string(payload.get("restaurantId")) {
        rooms.push(RoomId::restaurant(&id));
    }
    rooms
}

fn owner_status_changed(payload: &Value) -> Vec<RoomId> {
    let mut rooms = vec![RoomId::admin_restaurants()];
    if let Some(owner) = id_string(payload.get("ownerId")) {
        rooms.push(RoomId::restaurant_owner(&owner));
    }
    rooms
}

fn menu_product_changed(payload: &Value) -> Vec<RoomId> {
    let mut rooms = vec![RoomId::catalog_products()];
    if let Some(id) = id_string(payload.get("restaurantId")) {
        rooms.push(RoomId::restaurant(&id));
    }
    rooms
}

fn branch_created(payload: &Value) -> Vec<RoomId> {
    let mut rooms = vec![RoomId::admin_restaurants()];
    if let Some(id) = id_string(payload.get("restaurantId")) {
        rooms.push(RoomId::restaurant(&id));
    }
    if let Some(branch) = id_string(payload.get("branch").and_then(|b| b.get("id"))) {
        rooms.push(RoomId::restaurant_branch(&branch));
    }
    rooms
}

fn order_placed(payload: &Value) -> Vec<RoomId> {
    let mut rooms = Vec::new();
    if let Some(id) = id_string(payload.get("restaurantId")) {
        rooms.push(RoomId::restaurant(&id));
    }
    if let Some(branch) = id_string(payload.get("branchId")) {
        rooms.push(RoomId::restaurant_branch(&branch));
    }
    rooms
}

fn order_status_changed(payload: &Value) -> Vec<RoomId> {
    let mut rooms = Vec::new();
    if let Some(branch) = id_string(payload.get("branchId")) {
        rooms.push(RoomId::restaurant_branch(&branch));
    }
    rooms
}
