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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command::CommandEnvelope;
use crate::state::StateUpdate;

/// One frame received from a client: `{"type":"command","data":<CommandEnvelope>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientFrame {
    Command(CommandEnvelope),
}

/// One frame sent to a client: `{"type":<tag>,"data":<payload>}`. Variant
/// names map onto the server tags in snake_case (`SpeechSelf` ->
/// `speech_self`), matching the wire tags enumerated in the protocol spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    Error {
        text: String,
    },
    GameMessage {
        text: String,
        #[serde(default, skip_serializing_if = "Value::is_null")]
        metadata: Value,
        timestamp: DateTime<Utc>,
    },
    StateUpdate(StateUpdate),
    Speech {
        speaker: String,
        text: String,
        timestamp: DateTime<Utc>,
    },
    SpeechSelf {
        text: String,
        timestamp: DateTime<Utc>,
    },
    Tell {
        from: String,
        text: String,
        timestamp: DateTime<Utc>,
    },
    TellSelf {
        to: String,
        text: String,
        timestamp: DateTime<Utc>,
    },
    Whisper {
        speaker: String,
        text: String,
        timestamp: DateTime<Utc>,
    },
    System {
        text: String,
        timestamp: DateTime<Utc>,
    },
    Movement {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    AreaDescription {
        text: String,
    },
    LookResult {
        text: String,
    },
    PlayerList {
        players: Vec<String>,
    },
    Combat {
        text: String,
    },
    Dialogue {
        text: String,
    },
    ItemAcquired {
        item: String,
    },
    CraftingSuccess {
        item: String,
    },
    TriggerEntryOptions {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        requested_world: Option<String>,
    },
    StartInterview {
        prompt: String,
    },
}

impl ServerMessage {
    pub fn error(text: impl Into<String>) -> Self {
        ServerMessage::Error { text: text.into() }
    }

    pub fn game_message(text: impl Into<String>, metadata: Value) -> Self {
        ServerMessage::GameMessage {
            text: text.into(),
            metadata,
            timestamp: Utc::now(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        ServerMessage::System {
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_frame_decodes_command() {
        let json = r#"{"type":"command","data":{"action":"say","message":"hi"}}"#;
        let frame: ClientFrame = serde_json::from_str(json).unwrap();
        match frame {
            ClientFrame::Command(cmd) => {
                assert_eq!(cmd.action, "say");
                assert_eq!(cmd.message.as_deref(), Some("hi"));
            }
        }
    }

    #[test]
    fn error_message_round_trips() {
        let msg = ServerMessage::error("nope");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"error","data":{"text":"nope"}}"#);
        let back: ServerMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }

    #[test]
    fn state_update_tag_is_state_update() {
        let msg = ServerMessage::StateUpdate(StateUpdate::at(crate::position::Position::new(
            0.0, 0.0,
        )));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "state_update");
    }
}
