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

use serde::{Deserialize, Serialize};

/// A parsed command sent by a player. `action` is the command tag (`"n"`,
/// `"say"`, `"tell"`, ...); the remaining fields are populated per-action as
/// documented in the dispatcher's handler tables.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
}

impl CommandEnvelope {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_envelope() {
        let json = r#"{"action":"n"}"#;
        let cmd: CommandEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(cmd.action, "n");
        assert_eq!(cmd.target, None);
    }

    #[test]
    fn round_trips_full_envelope() {
        let cmd = CommandEnvelope {
            action: "tell".to_string(),
            target: None,
            recipient: Some("Bob".to_string()),
            message: Some("hi".to_string()),
            text: None,
            direction: None,
            quantity: None,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        let back: CommandEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, back);
    }
}
