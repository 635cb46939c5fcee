//! Message dispatch: parse, resolve target rooms, emit or fall back to broadcast.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::envelope::Envelope;
use crate::observability::{events, fields};
use crate::routing::room_resolution::RoomResolution;
use crate::transport::RoomTransport;

const COMPONENT: &str = "dispatcher";

/// Event name used when a message cannot be interpreted as a typed domain
/// event and is broadcast as-is.
pub const FALLBACK_EVENT: &str = "message";

/// Summary of what one dispatch did, for logging and tests.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DispatchOutcome {
    /// Emitted to each resolved room.
    Scoped { rooms: usize },
    /// Typed event with no targeted rooms; broadcast under its own name.
    Broadcast,
    /// Unrecognized envelope; raw value broadcast under [`FALLBACK_EVENT`].
    Fallback,
    /// Body was not parseable; nothing emitted.
    Discarded,
}

/// Routes one raw queue message to the transport.
///
/// Every successfully parsed typed message produces exactly one logical
/// emission: either a scoped fanout to its resolved rooms or a single
/// global broadcast, never both and never zero. Per-room transport errors
/// are logged and do not abort the remaining fanout; nothing here ever
/// propagates an error back to the consumer loop.
pub struct Dispatcher {
    resolution: RoomResolution,
    transport: Arc<dyn RoomTransport>,
}

impl Dispatcher {
    pub fn new(resolution: RoomResolution, transport: Arc<dyn RoomTransport>) -> Self {
        Self {
            resolution,
            transport,
        }
    }

    /// Handles one raw message body.
    pub async fn handle(&self, body: &[u8]) -> DispatchOutcome {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    event = events::MESSAGE_DISCARDED,
                    component = COMPONENT,
                    err = %err,
                    body = %fields::body_preview(body),
                    "discarding unparseable message"
                );
                return DispatchOutcome::Discarded;
            }
        };

        let Some(envelope) = Envelope::from_value(&value) else {
            debug!(
                event = events::FALLBACK_BROADCAST,
                component = COMPONENT,
                "message carries no usable event type, broadcasting as generic"
            );
            self.broadcast(FALLBACK_EVENT, &value).await;
            return DispatchOutcome::Fallback;
        };

        let rooms = self.resolution.decide(&envelope);
        if rooms.is_empty() {
            debug!(
                event = events::BROADCAST_EMIT,
                component = COMPONENT,
                event_type = %envelope.event_type,
                "no targeted rooms, broadcasting"
            );
            self.broadcast(&envelope.event_type, &envelope.payload).await;
            return DispatchOutcome::Broadcast;
        }

        debug!(
            event = events::SCOPED_EMIT,
            component = COMPONENT,
            event_type = %envelope.event_type,
            rooms = %fields::format_rooms(&rooms),
            "emitting to resolved rooms"
        );
        for room in &rooms {
            if let Err(err) = self
                .transport
                .emit_to_room(room, &envelope.event_type, &envelope.payload)
                .await
            {
                warn!(
                    event = events::EMIT_FAILED,
                    component = COMPONENT,
                    room = %room,
                    event_type = %envelope.event_type,
                    err = %err,
                    "room emit failed"
                );
            }
        }
        DispatchOutcome::Scoped { rooms: rooms.len() }
    }

    async fn broadcast(&self, event: &str, payload: &Value) {
        if let Err(err) = self.transport.emit_broadcast(event, payload).await {
            warn!(
                event = events::EMIT_FAILED,
                component = COMPONENT,
                event_type = event,
                err = %err,
                "broadcast emit failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DispatchOutcome, Dispatcher, FALLBACK_EVENT};
    use crate::routing::resolver_table::ResolverTable;
    use crate::routing::room::RoomId;
    use crate::routing::room_resolution::RoomResolution;
    use crate::transport::{RoomTransport, TransportError};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex as StdMutex};

    #[derive(Default)]
    struct RecordingTransport {
        room_emits: StdMutex<Vec<(String, String, Value)>>,
        broadcasts: StdMutex<Vec<(String, Value)>>,
        fail_rooms: bool,
    }

    impl RecordingTransport {
        fn failing_rooms() -> Self {
            Self {
                fail_rooms: true,
                ..Self::default()
            }
        }

        fn room_emits(&self) -> Vec<(String, String, Value)> {
            self.room_emits.lock().expect("lock room_emits").clone()
        }

        fn broadcasts(&self) -> Vec<(String, Value)> {
            self.broadcasts.lock().expect("lock broadcasts").clone()
        }

        fn emission_count(&self) -> usize {
            self.room_emits().len() + self.broadcasts().len()
        }
    }

    #[async_trait]
    impl RoomTransport for RecordingTransport {
        async fn emit_to_room(
            &self,
            room: &RoomId,
            event: &str,
            payload: &Value,
        ) -> Result<(), TransportError> {
            if self.fail_rooms {
                return Err(TransportError::EmitFailed("test failure".to_string()));
            }
            self.room_emits.lock().expect("lock room_emits").push((
                room.as_str().to_string(),
                event.to_string(),
                payload.clone(),
            ));
            Ok(())
        }

        async fn emit_broadcast(&self, event: &str, payload: &Value) -> Result<(), TransportError> {
            self.broadcasts
                .lock()
                .expect("lock broadcasts")
                .push((event.to_string(), payload.clone()));
            Ok(())
        }
    }

    fn dispatcher(transport: Arc<RecordingTransport>) -> Dispatcher {
        let resolution = RoomResolution::new(Arc::new(ResolverTable::with_default_policies()));
        Dispatcher::new(resolution, transport)
    }

    #[tokio::test]
    async fn owner_approved_scenario_emits_to_admin_and_owner_rooms() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = dispatcher(transport.clone());

        let outcome = dispatcher
            .handle(br#"{"event":"owner.approved","payload":{"ownerId":"99"}}"#)
            .await;

        assert_eq!(outcome, DispatchOutcome::Scoped { rooms: 2 });
        assert_eq!(
            transport.room_emits(),
            vec![
                (
                    "admin:restaurants".to_string(),
                    "owner.approved".to_string(),
                    json!({ "ownerId": "99" }),
                ),
                (
                    "restaurant-owner:99".to_string(),
                    "owner.approved".to_string(),
                    json!({ "ownerId": "99" }),
                ),
            ]
        );
        assert!(transport.broadcasts().is_empty());
    }

    #[tokio::test]
    async fn explicit_rooms_scope_the_emission_verbatim() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = dispatcher(transport.clone());

        let outcome = dispatcher
            .handle(
                br#"{"event":"menu.product.created","payload":{"restaurantId":"42"},"rooms":["custom:1"]}"#,
            )
            .await;

        assert_eq!(outcome, DispatchOutcome::Scoped { rooms: 1 });
        assert_eq!(
            transport.room_emits(),
            vec![(
                "custom:1".to_string(),
                "menu.product.created".to_string(),
                json!({ "restaurantId": "42" }),
            )]
        );
    }

    #[tokio::test]
    async fn unknown_type_broadcasts_payload_under_original_event_name() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = dispatcher(transport.clone());

        let outcome = dispatcher
            .handle(br#"{"event":"totally.unknown","payload":{"k":1}}"#)
            .await;

        assert_eq!(outcome, DispatchOutcome::Broadcast);
        assert!(transport.room_emits().is_empty());
        assert_eq!(
            transport.broadcasts(),
            vec![("totally.unknown".to_string(), json!({ "k": 1 }))]
        );
    }

    #[tokio::test]
    async fn message_without_event_field_falls_back_to_generic_broadcast() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = dispatcher(transport.clone());

        let outcome = dispatcher.handle(br#"{"legacy":"shape"}"#).await;

        assert_eq!(outcome, DispatchOutcome::Fallback);
        assert_eq!(
            transport.broadcasts(),
            vec![(FALLBACK_EVENT.to_string(), json!({ "legacy": "shape" }))]
        );
    }

    #[tokio::test]
    async fn non_object_body_falls_back_with_the_raw_parsed_value() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = dispatcher(transport.clone());

        let outcome = dispatcher.handle(br#"[1,2,3]"#).await;

        assert_eq!(outcome, DispatchOutcome::Fallback);
        assert_eq!(
            transport.broadcasts(),
            vec![(FALLBACK_EVENT.to_string(), json!([1, 2, 3]))]
        );
    }

    #[tokio::test]
    async fn unparseable_body_emits_nothing() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = dispatcher(transport.clone());

        let outcome = dispatcher.handle(b"{not json").await;

        assert_eq!(outcome, DispatchOutcome::Discarded);
        assert_eq!(transport.emission_count(), 0);
    }

    #[tokio::test]
    async fn room_emit_failure_does_not_abort_the_fanout() {
        let transport = Arc::new(RecordingTransport::failing_rooms());
        let dispatcher = dispatcher(transport.clone());

        let outcome = dispatcher
            .handle(br#"{"event":"owner.approved","payload":{"ownerId":"99"}}"#)
            .await;

        // Both rooms were attempted even though each emit failed, and the
        // failure never escalates past the dispatch boundary.
        assert_eq!(outcome, DispatchOutcome::Scoped { rooms: 2 });
        assert!(transport.broadcasts().is_empty());
    }

    #[tokio::test]
    async fn typed_event_with_empty_payload_broadcasts_null_payload() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = dispatcher(transport.clone());

        let outcome = dispatcher.handle(br#"{"event":"totally.unknown"}"#).await;

        assert_eq!(outcome, DispatchOutcome::Broadcast);
        assert_eq!(
            transport.broadcasts(),
            vec![("totally.unknown".to_string(), Value::Null)]
        );
    }
}
