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

//! # dishpatch-realtime
//!
//! `dishpatch-realtime` is the event-distribution layer between the
//! platform's backend services and live subscriber connections. Services
//! publish domain events onto a durable AMQP queue; this crate consumes
//! them, derives the set of target rooms per event type, and fans each
//! event out through a [`RoomTransport`], falling back to a global
//! broadcast when no targeted rooms can be determined.
//!
//! Typical usage is API-first and centered on [`EventRelay`]: supply a
//! configuration, a [`ResolverTable`] (or the default policies), and a
//! transport, then drive [`EventRelay::run`].
//!
//! The dispatch path can be exercised directly, without a broker:
//!
//! ```
//! use std::sync::Arc;
//! use dishpatch_realtime::{DispatchOutcome, Dispatcher, ResolverTable, RoomResolution};
//! use memory_transport::MemoryTransport;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let transport = Arc::new(MemoryTransport::new());
//! let mut admin_feed = transport.join_room("admin:restaurants");
//!
//! let resolution = RoomResolution::new(Arc::new(ResolverTable::with_default_policies()));
//! let dispatcher = Dispatcher::new(resolution, transport.clone());
//!
//! let outcome = dispatcher
//!     .handle(br#"{"event":"owner.approved","payload":{"ownerId":"99"}}"#)
//!     .await;
//! assert_eq!(outcome, DispatchOutcome::Scoped { rooms: 2 });
//!
//! let seen = admin_feed.recv().await.unwrap();
//! assert_eq!(seen.event, "owner.approved");
//! # });
//! ```
//!
//! ## Routing contract
//!
//! Explicit room targets on an envelope always win and are never combined
//! with policy-derived rooms; a typed event whose policy yields nothing is
//! broadcast, never dropped:
//!
//! ```
//! use std::sync::Arc;
//! use dishpatch_realtime::{Envelope, ResolverTable, RoomResolution};
//! use serde_json::json;
//!
//! let resolution = RoomResolution::new(Arc::new(ResolverTable::with_default_policies()));
//!
//! let explicit = Envelope {
//!     event_type: "menu.product.created".to_string(),
//!     payload: json!({ "restaurantId": "42" }),
//!     rooms: Some(vec!["custom:1".to_string()]),
//! };
//! assert_eq!(resolution.decide(&explicit).len(), 1);
//!
//! let unrouted = Envelope {
//!     event_type: "nobody.registered.this".to_string(),
//!     payload: json!({}),
//!     rooms: None,
//! };
//! assert!(resolution.decide(&unrouted).is_empty());
//! ```
//!
//! ## Internal architecture map
//!
//! - API facade: outward [`EventRelay`] surface
//! - Routing: room identity, resolver policies, target-room decision
//! - Data plane: queue consumer and dispatch/fanout execution paths
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events. Library code emits
//! events/spans and does not unconditionally initialize a global
//! subscriber. Binaries and tests are responsible for one-time
//! `tracing_subscriber` initialization at process boundaries.

mod config;
pub use config::{RelayConfig, DEFAULT_BROKER_URL, DEFAULT_QUEUE};

mod envelope;
pub use envelope::Envelope;

mod error;
pub use error::{ConfigError, RelayError};

#[doc(hidden)]
pub mod observability;

mod data_plane;
pub use data_plane::dispatcher::{DispatchOutcome, Dispatcher, FALLBACK_EVENT};
pub use data_plane::queue_consumer::QueueConsumer;

mod routing;
pub use routing::resolver_table::{ResolverTable, RoomResolver};
pub use routing::room::RoomId;
pub use routing::room_resolution::RoomResolution;

mod transport;
pub use transport::{RoomTransport, TransportError};

mod relay;
pub use relay::EventRelay;
