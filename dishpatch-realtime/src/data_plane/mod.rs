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

//! Data-plane layer.
//!
//! Owns the queue-consumption stream and the dispatch path that turns one
//! raw delivery into room-scoped emissions or a broadcast. Acknowledgment
//! policy lives at this boundary: every delivery is acknowledged after the
//! dispatch attempt, whatever its outcome.
//!
//! ```
//! use std::sync::Arc;
//! use dishpatch_realtime::{DispatchOutcome, Dispatcher, ResolverTable, RoomResolution};
//! use memory_transport::MemoryTransport;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let transport = Arc::new(MemoryTransport::new());
//! let resolution = RoomResolution::new(Arc::new(ResolverTable::with_default_policies()));
//! let dispatcher = Dispatcher::new(resolution, transport);
//!
//! let outcome = dispatcher
//!     .handle(br#"{"event":"owner.approved","payload":{"ownerId":"99"}}"#)
//!     .await;
//! assert_eq!(outcome, DispatchOutcome::Scoped { rooms: 2 });
//! # });
//! ```

pub(crate) mod dispatcher;
pub(crate) mod queue_consumer;
