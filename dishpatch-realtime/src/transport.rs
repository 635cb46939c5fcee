//! Room transport seam: how resolved events reach live subscriber groups.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::routing::room::RoomId;

/// Errors surfaced by a transport when an emission cannot be handed off.
///
/// Delivery past the hand-off point is fire-and-forget; a transport must not
/// report per-subscriber outcomes through this type.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The emission could not be handed to the transport.
    #[error("emit failed: {0}")]
    EmitFailed(String),

    /// The transport has shut down and accepts no further emissions.
    #[error("transport closed")]
    Closed,
}

/// Connection-multiplexing realtime transport with named-group membership.
///
/// Implementations own room membership entirely: subscribers join and leave
/// outside this core's control, and the core only ever addresses a room by
/// identifier. Both operations must return without waiting on individual
/// subscriber acknowledgment.
#[async_trait]
pub trait RoomTransport: Send + Sync {
    /// Emits `payload` under `event` to the members of one room.
    ///
    /// Emitting to a room with no current members is a successful no-op.
    async fn emit_to_room(
        &self,
        room: &RoomId,
        event: &str,
        payload: &Value,
    ) -> Result<(), TransportError>;

    /// Emits `payload` under `event` to every connected subscriber,
    /// regardless of room membership.
    async fn emit_broadcast(&self, event: &str, payload: &Value) -> Result<(), TransportError>;
}
