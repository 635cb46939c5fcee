/********************************************************************************
 * Copyright (c) 2026 Contributors to the Dishpatch project
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! In-process [`RoomTransport`] for tests and local demos.
//!
//! Each room is a `tokio::sync::broadcast` channel created lazily on first
//! join or emit; the global broadcast is its own channel. A test client that
//! needs both room-scoped and broadcast delivery subscribes to both streams.
//! Nothing here persists or acknowledges; like the production transport,
//! delivery past the hand-off is fire-and-forget.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use dishpatch_realtime::{RoomId, RoomTransport, TransportError};
use serde_json::Value;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// One event as observed by a subscriber.
#[derive(Clone, Debug, PartialEq)]
pub struct EmittedEvent {
    pub event: String,
    pub payload: Value,
}

/// In-memory room hub implementing [`RoomTransport`].
pub struct MemoryTransport {
    rooms: Mutex<HashMap<String, broadcast::Sender<EmittedEvent>>>,
    global: broadcast::Sender<EmittedEvent>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        let (global, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            rooms: Mutex::new(HashMap::new()),
            global,
        }
    }

    /// Joins a room, creating it on first use, and returns its event stream.
    pub fn join_room(&self, room: &str) -> broadcast::Receiver<EmittedEvent> {
        self.room_sender(room).subscribe()
    }

    /// Subscribes to the global broadcast stream.
    pub fn subscribe_broadcast(&self) -> broadcast::Receiver<EmittedEvent> {
        self.global.subscribe()
    }

    fn room_sender(&self, room: &str) -> broadcast::Sender<EmittedEvent> {
        let mut rooms = self.rooms.lock().expect("lock rooms");
        rooms
            .entry(room.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomTransport for MemoryTransport {
    async fn emit_to_room(
        &self,
        room: &RoomId,
        event: &str,
        payload: &Value,
    ) -> Result<(), TransportError> {
        let sender = self.room_sender(room.as_str());
        // A room with no members is a successful no-op.
        let _ = sender.send(EmittedEvent {
            event: event.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }

    async fn emit_broadcast(&self, event: &str, payload: &Value) -> Result<(), TransportError> {
        let _ = self.global.send(EmittedEvent {
            event: event.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryTransport;
    use dishpatch_realtime::{RoomId, RoomTransport};
    use serde_json::json;

    #[tokio::test]
    async fn room_emissions_reach_members_and_not_other_rooms() {
        let transport = MemoryTransport::new();
        let mut member = transport.join_room("restaurant:42");
        let mut bystander = transport.join_room("restaurant:7");

        transport
            .emit_to_room(&RoomId::restaurant("42"), "restaurant.updated", &json!({}))
            .await
            .expect("emit");

        let seen = member.recv().await.expect("member receives");
        assert_eq!(seen.event, "restaurant.updated");
        assert!(bystander.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcast_reaches_broadcast_subscribers() {
        let transport = MemoryTransport::new();
        let mut feed = transport.subscribe_broadcast();

        transport
            .emit_broadcast("message", &json!({ "legacy": true }))
            .await
            .expect("broadcast");

        let seen = feed.recv().await.expect("feed receives");
        assert_eq!(seen.event, "message");
        assert_eq!(seen.payload, json!({ "legacy": true }));
    }

    #[tokio::test]
    async fn emitting_to_an_empty_room_is_a_successful_no_op() {
        let transport = MemoryTransport::new();

        transport
            .emit_to_room(&RoomId::restaurant("42"), "restaurant.updated", &json!({}))
            .await
            .expect("emit to empty room");
    }
}
