// Copyright (C) 2025 Thousand Worlds contributors. This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Breaks the Hub/Dispatcher construction cycle: the dispatcher needs a
//! `Broadcaster` before the hub exists, and the hub needs a
//! `CommandProcessor` (the dispatcher) before it can spawn. `DeferredHub`
//! implements `Broadcaster` over a cell that's empty until [`Self::bind`] is
//! called once, right after the real hub is spawned; every call the
//! dispatcher makes before that point is a silent no-op, which never
//! happens in practice since nothing can reach the dispatcher until a
//! session registers with the hub.

use std::sync::{Arc, OnceLock};

use core_common::{CharacterId, WorldId};
use core_hub::{Broadcaster, Hub};
use core_protocol::{Position, ServerMessage};
use core_session::GameClient;
use tracing::warn;

#[derive(Default)]
pub struct DeferredHub(OnceLock<Arc<Hub>>);

impl DeferredHub {
    pub fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Panics if called twice; `main` calls this exactly once.
    pub fn bind(&self, hub: Arc<Hub>) {
        self.0.set(hub).map_err(|_| ()).expect("DeferredHub bound twice");
    }

    fn hub(&self) -> Option<&Arc<Hub>> {
        let hub = self.0.get();
        if hub.is_none() {
            warn!("broadcaster invoked before hub was bound");
        }
        hub
    }
}

impl Broadcaster for DeferredHub {
    fn send_to_character(&self, character_id: CharacterId, message: ServerMessage) {
        if let Some(hub) = self.hub() {
            hub.send_to_character(character_id, message);
        }
    }

    fn broadcast_to_world(&self, world_id: WorldId, message: ServerMessage) {
        if let Some(hub) = self.hub() {
            hub.broadcast_to_world(world_id, message);
        }
    }

    fn broadcast_to_area(&self, center: Position, radius: f64, message: ServerMessage) {
        if let Some(hub) = self.hub() {
            hub.broadcast_to_area(center, radius, message);
        }
    }

    fn clients_by_world(&self, world_id: WorldId) -> Vec<Arc<dyn GameClient>> {
        self.hub().map(|hub| hub.clients_by_world(world_id)).unwrap_or_default()
    }

    fn update_character_position(&self, character_id: CharacterId, position: Position) {
        if let Some(hub) = self.hub() {
            hub.update_character_position(character_id, position);
        }
    }
}
