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

use serde_json::Value;

use core_common::{CharacterId, WorldId};
use core_protocol::{ServerMessage, StateUpdate};

/// Outcome of a non-blocking send to a client's outbound queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// The queue was full or already closed; the caller should treat this
    /// client as unresponsive and ask the hub to unregister it.
    QueueFull,
}

/// The capability set the dispatcher needs from a connected client. The
/// production `Session` implements this against a real socket; tests can
/// implement it against a `Vec<ServerMessage>` to assert on what was sent
/// without standing up a websocket.
pub trait GameClient: Send + Sync {
    fn character_id(&self) -> CharacterId;
    fn world_id(&self) -> WorldId;
    fn username(&self) -> &str;

    fn send(&self, message: ServerMessage) -> SendOutcome;

    fn send_error(&self, text: &str) -> SendOutcome {
        self.send(ServerMessage::error(text))
    }

    fn send_game_message(&self, text: &str, metadata: Value) -> SendOutcome {
        self.send(ServerMessage::game_message(text, metadata))
    }

    fn send_state_update(&self, state: StateUpdate) -> SendOutcome {
        self.send(ServerMessage::StateUpdate(state))
    }
}
