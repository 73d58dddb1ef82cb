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

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{instrument, warn};

use core_common::LOBBY_WORLD_ID;
use core_hub::{Broadcaster, CommandProcessor};
use core_protocol::{CommandEnvelope, ServerMessage};
use core_repos::{Character, CharacterRepo, CharacterRepoError, EventSink, RateLimiter, WorldRepo, WorldShape};
use core_repos::event_sink::{DomainEvent, DomainEventType};
use core_session::GameClient;

use crate::error::DispatchError;
use crate::movement::{self, MoveOutcome};

const WHISPER_RADIUS_METERS: f64 = 5.0;

/// Consumes inbound commands, enforces preconditions and rate limits, routes
/// to the lobby or in-world handler table, and produces outbound messages
/// through a [`Broadcaster`] capability. Holds no concrete reference to the
/// hub — only the narrow trait — so it can be constructed and tested without
/// one.
pub struct CommandDispatcher {
    broadcaster: Arc<dyn Broadcaster>,
    character_repo: Arc<dyn CharacterRepo>,
    world_repo: Arc<dyn WorldRepo>,
    rate_limiter: Arc<dyn RateLimiter>,
    event_sink: Arc<dyn EventSink>,
}

impl CommandDispatcher {
    pub fn new(
        broadcaster: Arc<dyn Broadcaster>,
        character_repo: Arc<dyn CharacterRepo>,
        world_repo: Arc<dyn WorldRepo>,
        rate_limiter: Arc<dyn RateLimiter>,
        event_sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            broadcaster,
            character_repo,
            world_repo,
            rate_limiter,
            event_sink,
        }
    }

    async fn dispatch(&self, client: &Arc<dyn GameClient>, command: CommandEnvelope) -> Result<(), DispatchError> {
        if client.character_id().is_nil() {
            return Err(DispatchError::NoCharacter);
        }

        let character = self
            .character_repo
            .get(client.character_id())
            .await
            .map_err(|e| match e {
                CharacterRepoError::NotFound(_) => DispatchError::NoCharacter,
                CharacterRepoError::Backend(msg) => DispatchError::Internal(msg),
            })?;

        match self.rate_limiter.allow(client.character_id()).await {
            Ok(true) => {}
            Ok(false) => return Err(DispatchError::RateLimited),
            Err(e) => return Err(DispatchError::Internal(e.to_string())),
        }

        if character.world_id == LOBBY_WORLD_ID {
            self.dispatch_lobby(client, character, command).await
        } else {
            self.dispatch_in_world(client, character, command).await
        }
    }

    async fn dispatch_lobby(
        &self,
        client: &Arc<dyn GameClient>,
        character: Character,
        command: CommandEnvelope,
    ) -> Result<(), DispatchError> {
        let action = command.action.to_ascii_lowercase();

        // The handler table in principle restricts the lobby to
        // look/create-world/enter/say/who/help, but the lobby is also a
        // bounded Cartesian space with walls (§4.4a) that a new session must
        // be able to bump into before ever entering a world — so movement
        // is accepted here too.
        if let Some(direction) = movement::parse_direction(&action) {
            return self.handle_movement(client, character, WorldShape::Cartesian, direction).await;
        }

        match action.as_str() {
            "help" => {
                client.send(ServerMessage::system(
                    "Lobby commands: look, create world, enter <world>, say, who, help.",
                ));
            }
            "look" => {
                client.send(ServerMessage::AreaDescription {
                    text: "You are in the lobby, a featureless waiting room between worlds.".to_string(),
                });
            }
            "create" | "create world" => {
                client.send(ServerMessage::system("World creation is not available yet."));
            }
            "enter" => {
                client.send(ServerMessage::TriggerEntryOptions {
                    requested_world: command.target.clone(),
                });
            }
            "say" => self.handle_say(client, &character, command).await?,
            "who" => self.handle_who(client, &character).await?,
            other => {
                let _ = other;
                client.send_error("Unknown lobby command.");
            }
        }
        Ok(())
    }

    async fn dispatch_in_world(
        &self,
        client: &Arc<dyn GameClient>,
        character: Character,
        command: CommandEnvelope,
    ) -> Result<(), DispatchError> {
        let action = command.action.to_ascii_lowercase();

        if let Some(direction) = movement::parse_direction(&action) {
            let world = self
                .world_repo
                .get(character.world_id)
                .await
                .map_err(|e| DispatchError::Internal(e.to_string()))?;
            return self.handle_movement(client, character, world.shape, direction).await;
        }

        match action.as_str() {
            "help" => {
                client.send(ServerMessage::system(
                    "Commands: movement (n/s/e/w/...), look, say, whisper, tell, who, take, drop, inventory.",
                ));
            }
            "look" => self.handle_look(client, &command),
            "say" => self.handle_say(client, &character, command).await?,
            "whisper" => self.handle_whisper(client, &character, command)?,
            "tell" => self.handle_tell(client, &character, command).await?,
            "who" => self.handle_who(client, &character).await?,
            "open" | "enter" | "attack" | "talk" => self.handle_domain_stub(client, &action),
            "take" => self.handle_take(client, character, command).await?,
            "drop" => self.handle_drop(client, character, command).await?,
            "craft" => self.handle_craft_or_use(client, &command, "craft")?,
            "use" => self.handle_craft_or_use(client, &command, "use")?,
            "inventory" => self.handle_inventory(client, &character),
            other => return Err(DispatchError::InvalidAction(other.to_string())),
        }
        Ok(())
    }

    async fn handle_movement(
        &self,
        client: &Arc<dyn GameClient>,
        character: Character,
        shape: WorldShape,
        direction: movement::Direction,
    ) -> Result<(), DispatchError> {
        let outcome = match shape {
            WorldShape::Cartesian => movement::move_in_lobby(character.position, direction),
            WorldShape::Spherical { circumference_meters } => {
                movement::move_on_sphere(character.position, circumference_meters, direction)
            }
        };

        match outcome {
            MoveOutcome::Refused { text } => {
                client.send(ServerMessage::Movement { text, note: None });
            }
            MoveOutcome::Moved { position, note } => {
                let mut updated = character.clone();
                updated.position = position;
                self.character_repo
                    .update(&updated)
                    .await
                    .map_err(|e| DispatchError::Internal(e.to_string()))?;
                self.broadcaster.update_character_position(character.character_id, position);

                self.event_sink
                    .append(DomainEvent::character(
                        DomainEventType::PlayerMoved,
                        character.character_id,
                        json!({"x": position.x, "y": position.y}),
                    ))
                    .await;

                client.send(ServerMessage::Movement {
                    text: format!("You move {}.", direction.name),
                    note: note.clone(),
                });
                client.send_state_update(state_update_for(&updated));
            }
        }
        Ok(())
    }

    fn handle_look(&self, client: &Arc<dyn GameClient>, command: &CommandEnvelope) {
        match &command.target {
            Some(target) => client.send(ServerMessage::LookResult {
                text: format!("You see nothing special about {target}."),
            }),
            None => client.send(ServerMessage::AreaDescription {
                text: "You look around, taking in your surroundings.".to_string(),
            }),
        };
    }

    async fn handle_say(
        &self,
        client: &Arc<dyn GameClient>,
        character: &Character,
        command: CommandEnvelope,
    ) -> Result<(), DispatchError> {
        let Some(message) = non_empty(command.message.or(command.text)) else {
            client.send_error("Say what?");
            return Ok(());
        };

        client.send(ServerMessage::SpeechSelf {
            text: message.clone(),
            timestamp: chrono::Utc::now(),
        });

        for recipient in self.broadcaster.clients_by_world(character.world_id) {
            if recipient.character_id() != character.character_id {
                recipient.send(ServerMessage::Speech {
                    speaker: character.username().to_string(),
                    text: message.clone(),
                    timestamp: chrono::Utc::now(),
                });
            }
        }
        Ok(())
    }

    fn handle_whisper(
        &self,
        client: &Arc<dyn GameClient>,
        character: &Character,
        command: CommandEnvelope,
    ) -> Result<(), DispatchError> {
        let Some(message) = non_empty(command.message.or(command.text)) else {
            client.send_error("Whisper what?");
            return Ok(());
        };

        self.broadcaster.broadcast_to_area(
            character.position,
            WHISPER_RADIUS_METERS,
            ServerMessage::Whisper {
                speaker: character.username().to_string(),
                text: message,
                timestamp: chrono::Utc::now(),
            },
        );
        Ok(())
    }

    async fn handle_tell(
        &self,
        client: &Arc<dyn GameClient>,
        character: &Character,
        command: CommandEnvelope,
    ) -> Result<(), DispatchError> {
        let Some(recipient_name) = non_empty(command.recipient.clone()) else {
            client.send_error("Tell whom?");
            return Ok(());
        };
        let Some(message) = non_empty(command.message.or(command.text)) else {
            client.send_error("Tell them what?");
            return Ok(());
        };

        let worlds = self
            .world_repo
            .list()
            .await
            .map_err(|e| DispatchError::Internal(e.to_string()))?;

        let mut target = None;
        for world in &worlds {
            for candidate in self.broadcaster.clients_by_world(world.id) {
                if candidate.username().eq_ignore_ascii_case(&recipient_name) {
                    target = Some(candidate);
                    break;
                }
            }
            if target.is_some() {
                break;
            }
        }
        // The lobby world is not enumerated by `WorldRepo::list`; check it too.
        if target.is_none() {
            for candidate in self.broadcaster.clients_by_world(LOBBY_WORLD_ID) {
                if candidate.username().eq_ignore_ascii_case(&recipient_name) {
                    target = Some(candidate);
                    break;
                }
            }
        }

        match target {
            Some(recipient) => {
                client.send(ServerMessage::TellSelf {
                    to: recipient.username().to_string(),
                    text: format!("You tell {}, '{}'", recipient.username(), message),
                    timestamp: chrono::Utc::now(),
                });
                recipient.send(ServerMessage::Tell {
                    from: character.username().to_string(),
                    text: format!("{} tells you, '{}'", character.username(), message),
                    timestamp: chrono::Utc::now(),
                });
            }
            None => {
                client.send_error("That player is not online.");
            }
        }
        Ok(())
    }

    async fn handle_who(&self, client: &Arc<dyn GameClient>, character: &Character) -> Result<(), DispatchError> {
        let players = self
            .broadcaster
            .clients_by_world(character.world_id)
            .into_iter()
            .map(|c| c.username().to_string())
            .collect();
        client.send(ServerMessage::PlayerList { players });
        Ok(())
    }

    fn handle_domain_stub(&self, client: &Arc<dyn GameClient>, action: &str) {
        client.send(ServerMessage::Dialogue {
            text: format!("You {action}, but nothing happens."),
        });
    }

    async fn handle_take(
        &self,
        client: &Arc<dyn GameClient>,
        character: Character,
        command: CommandEnvelope,
    ) -> Result<(), DispatchError> {
        let Some(item) = non_empty(command.target) else {
            client.send_error("Take what?");
            return Ok(());
        };

        let mut updated = character;
        updated.inventory.push(item.clone());
        self.character_repo
            .update(&updated)
            .await
            .map_err(|e| DispatchError::Internal(e.to_string()))?;

        client.send(ServerMessage::ItemAcquired { item });
        client.send_state_update(state_update_for(&updated));
        Ok(())
    }

    async fn handle_drop(
        &self,
        client: &Arc<dyn GameClient>,
        character: Character,
        command: CommandEnvelope,
    ) -> Result<(), DispatchError> {
        let Some(item) = non_empty(command.target) else {
            client.send_error("Drop what?");
            return Ok(());
        };

        let mut updated = character;
        if let Some(pos) = updated.inventory.iter().position(|i| i == &item) {
            updated.inventory.remove(pos);
        } else {
            client.send_error(&format!("You aren't carrying {item}."));
            return Ok(());
        }
        self.character_repo
            .update(&updated)
            .await
            .map_err(|e| DispatchError::Internal(e.to_string()))?;

        client.send(ServerMessage::Dialogue {
            text: format!("You drop {item}."),
        });
        client.send_state_update(state_update_for(&updated));
        Ok(())
    }

    fn handle_craft_or_use(
        &self,
        client: &Arc<dyn GameClient>,
        command: &CommandEnvelope,
        verb: &str,
    ) -> Result<(), DispatchError> {
        let Some(target) = non_empty(command.target.clone()) else {
            let capitalized = format!("{}{}", &verb[..1].to_ascii_uppercase(), &verb[1..]);
            client.send_error(&format!("{capitalized} what?"));
            return Ok(());
        };

        if verb == "craft" {
            client.send(ServerMessage::CraftingSuccess { item: target });
        } else {
            client.send(ServerMessage::Dialogue {
                text: format!("You use {target}, but nothing happens."),
            });
        }
        Ok(())
    }

    fn handle_inventory(&self, client: &Arc<dyn GameClient>, character: &Character) {
        client.send_state_update(state_update_for(character));
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn state_update_for(character: &Character) -> core_protocol::StateUpdate {
    let mut state = core_protocol::StateUpdate::at(character.position);
    state.inventory = character.inventory.clone();
    state.equipment = character.equipment.clone();
    state
}

#[async_trait]
impl CommandProcessor for CommandDispatcher {
    #[instrument(skip(self, client, command), fields(character_id = %client.character_id(), action = %command.action))]
    async fn process(&self, client: Arc<dyn GameClient>, command: CommandEnvelope) {
        if let Err(err) = self.dispatch(&client, command).await {
            warn!(error = %err, "command dispatch failed");
            client.send_error(err.client_message());
        }
    }
}
