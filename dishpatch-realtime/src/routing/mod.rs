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

//! Routing layer.
//!
//! Owns room identity, the per-event-type resolver policies, and the
//! two-tier target-room decision (explicit override, then type policy,
//! then empty-as-broadcast-signal).
//!
//! ```
//! use std::sync::Arc;
//! use dishpatch_realtime::{Envelope, ResolverTable, RoomResolution};
//! use serde_json::json;
//!
//! let resolution = RoomResolution::new(Arc::new(ResolverTable::with_default_policies()));
//! let envelope = Envelope {
//!     event_type: "owner.approved".to_string(),
//!     payload: json!({ "ownerId": "99" }),
//!     rooms: None,
//! };
//!
//! let rooms: Vec<String> = resolution
//!     .decide(&envelope)
//!     .iter()
//!     .map(|room| room.to_string())
//!     .collect();
//! assert_eq!(rooms, vec!["admin:restaurants", "restaurant-owner:99"]);
//! ```

pub(crate) mod resolver_table;
pub(crate) mod room;
pub(crate) mod room_resolution;
