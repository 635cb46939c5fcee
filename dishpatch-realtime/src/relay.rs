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

use std::sync::Arc;

use tracing::error;

use crate::config::RelayConfig;
use crate::data_plane::dispatcher::Dispatcher;
use crate::data_plane::queue_consumer::QueueConsumer;
use crate::error::RelayError;
use crate::routing::resolver_table::ResolverTable;
use crate::routing::room_resolution::RoomResolution;
use crate::transport::RoomTransport;

/// API facade tying configuration, routing policy, and a transport into a
/// running relay.
///
/// The resolver table is frozen at construction and shared read-only for
/// the process lifetime; the transport is the only collaborator the relay
/// emits through.
pub struct EventRelay {
    consumer: QueueConsumer,
}

impl EventRelay {
    /// Builds a relay over an explicit resolver table.
    pub fn new(
        config: RelayConfig,
        table: ResolverTable,
        transport: Arc<dyn RoomTransport>,
    ) -> Self {
        let resolution = RoomResolution::new(Arc::new(table));
        let dispatcher = Arc::new(Dispatcher::new(resolution, transport));
        let consumer = QueueConsumer::new(config, dispatcher);
        Self { consumer }
    }

    /// Builds a relay with the production routing policies.
    pub fn with_default_policies(config: RelayConfig, transport: Arc<dyn RoomTransport>) -> Self {
        Self::new(config, ResolverTable::with_default_policies(), transport)
    }

    /// Consumes the queue until the broker stays unreachable past the
    /// reconnect budget.
    ///
    /// The error is also logged here so embedding binaries that discard the
    /// result still leave a trace of why consumption stopped.
    pub async fn run(&self) -> Result<(), RelayError> {
        let result = self.consumer.run().await;
        if let Err(err) = &result {
            error!(err = %err, "event relay stopped");
        }
        result
    }
}
