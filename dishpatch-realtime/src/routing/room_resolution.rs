//! Two-tier target-room decision: explicit override, then type policy.

use std::sync::Arc;

use crate::envelope::Envelope;
use crate::routing::resolver_table::ResolverTable;
use crate::routing::room::RoomId;

/// Decides the final set of target rooms for one envelope.
///
/// Explicit instructions always win: a non-empty `rooms` list is returned
/// verbatim (blank entries filtered) and is never combined with
/// policy-derived rooms. Otherwise the event type is looked up in the
/// resolver table. An empty result is the broadcast signal for the
/// dispatcher, never a silent no-op.
#[derive(Clone)]
pub struct RoomResolution {
    table: Arc<ResolverTable>,
}

impl RoomResolution {
    pub fn new(table: Arc<ResolverTable>) -> Self {
        Self { table }
    }

    /// Resolves the rooms for `envelope`. Pure: the same envelope always
    /// yields the same result.
    pub fn decide(&self, envelope: &Envelope) -> Vec<RoomId> {
        if let Some(rooms) = envelope.rooms.as_deref() {
            if !rooms.is_empty() {
                return rooms
                    .iter()
                    .filter(|room| !room.trim().is_empty())
                    .map(|room| RoomId::from(room.as_str()))
                    .collect();
            }
        }

        self.table.resolve(&envelope.event_type, &envelope.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::RoomResolution;
    use crate::envelope::Envelope;
    use crate::routing::resolver_table::ResolverTable;
    use crate::routing::room::RoomId;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn resolution() -> RoomResolution {
        RoomResolution::new(Arc::new(ResolverTable::with_default_policies()))
    }

    fn envelope(event_type: &str, payload: Value, rooms: Option<Vec<&str>>) -> Envelope {
        Envelope {
            event_type: event_type.to_string(),
            payload,
            rooms: rooms.map(|rooms| rooms.into_iter().map(str::to_string).collect()),
        }
    }

    #[test]
    fn explicit_rooms_override_policy_entirely() {
        let envelope = envelope(
            "menu.product.created",
            json!({ "restaurantId": "42" }),
            Some(vec!["custom:1"]),
        );

        let rooms = resolution().decide(&envelope);

        assert_eq!(rooms, vec![RoomId::from("custom:1")]);
    }

    #[test]
    fn blank_explicit_entries_are_filtered_but_policy_stays_bypassed() {
        let envelope = envelope(
            "restaurant.created",
            json!({ "restaurant": { "id": "42" } }),
            Some(vec!["", "  ", "custom:2"]),
        );

        let rooms = resolution().decide(&envelope);

        assert_eq!(rooms, vec![RoomId::from("custom:2")]);
    }

    #[test]
    fn explicit_list_of_only_blanks_still_bypasses_policy() {
        let envelope = envelope(
            "restaurant.created",
            json!({ "restaurant": { "id": "42" } }),
            Some(vec!["", ""]),
        );

        // Explicit instructions were given, so policy never runs; the empty
        // result becomes a broadcast downstream.
        assert!(resolution().decide(&envelope).is_empty());
    }

    #[test]
    fn empty_explicit_list_falls_through_to_policy() {
        let envelope = envelope(
            "owner.approved",
            json!({ "ownerId": "99" }),
            Some(vec![]),
        );

        let rooms = resolution().decide(&envelope);

        assert_eq!(
            rooms,
            vec![
                RoomId::admin_restaurants(),
                RoomId::restaurant_owner("99")
            ]
        );
    }

    #[test]
    fn unknown_type_without_explicit_rooms_decides_empty() {
        let envelope = envelope("nobody.registered.this", json!({}), None);

        assert!(resolution().decide(&envelope).is_empty());
    }

    #[test]
    fn decide_is_idempotent_for_the_same_envelope() {
        let envelope = envelope(
            "restaurant.created",
            json!({ "restaurant": { "id": "42" }, "ownerUserId": "7" }),
            None,
        );
        let resolution = resolution();

        let first = resolution.decide(&envelope);
        let second = resolution.decide(&envelope);

        assert_eq!(first, second);
    }
}
