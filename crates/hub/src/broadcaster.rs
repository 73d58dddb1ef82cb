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

use core_common::{CharacterId, WorldId};
use core_protocol::{Position, ServerMessage};
use core_session::GameClient;
use std::sync::Arc;

/// The capability the dispatcher is given instead of a concrete `Hub`. Only
/// what a command handler needs to fan messages back out: direct send,
/// world-wide broadcast, area broadcast, and a world's client roster (for
/// `who`).
pub trait Broadcaster: Send + Sync {
    fn send_to_character(&self, character_id: CharacterId, message: ServerMessage);
    fn broadcast_to_world(&self, world_id: WorldId, message: ServerMessage);
    fn broadcast_to_area(&self, center: Position, radius: f64, message: ServerMessage);
    fn clients_by_world(&self, world_id: WorldId) -> Vec<Arc<dyn GameClient>>;
    fn update_character_position(&self, character_id: CharacterId, position: Position);
}
