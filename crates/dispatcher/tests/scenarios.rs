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

//! Literal end-to-end scenarios against a socket-free `GameClient` double,
//! driving the dispatcher exactly as the hub's routing loop would.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use core_common::{CharacterId, WorldId, LOBBY_WORLD_ID};
use core_dispatcher::CommandDispatcher;
use core_hub::{Broadcaster, CommandProcessor};
use core_protocol::{CommandEnvelope, Position, ServerMessage};
use core_repos::{Character, CharacterRepo, InMemoryCharacterRepo, InMemoryEventSink, InMemoryRateLimiter, InMemoryWorldRepo, World, WorldShape};
use core_session::{GameClient, SendOutcome};

struct FakeClient {
    character_id: CharacterId,
    world_id: Mutex<WorldId>,
    username: String,
    sent: Mutex<Vec<ServerMessage>>,
}

impl FakeClient {
    fn new(world_id: WorldId, username: &str) -> Arc<Self> {
        Arc::new(Self {
            character_id: CharacterId::new_random(),
            world_id: Mutex::new(world_id),
            username: username.to_string(),
            sent: Mutex::new(Vec::new()),
        })
    }

    fn drain(&self) -> Vec<ServerMessage> {
        std::mem::take(&mut self.sent.lock().unwrap())
    }
}

impl GameClient for FakeClient {
    fn character_id(&self) -> CharacterId {
        self.character_id
    }

    fn world_id(&self) -> WorldId {
        *self.world_id.lock().unwrap()
    }

    fn username(&self) -> &str {
        &self.username
    }

    fn send(&self, message: ServerMessage) -> SendOutcome {
        self.sent.lock().unwrap().push(message);
        SendOutcome::Sent
    }
}

#[derive(Default)]
struct FakeBroadcaster {
    clients: Mutex<HashMap<CharacterId, Arc<FakeClient>>>,
    positions: Mutex<HashMap<CharacterId, Position>>,
}

impl FakeBroadcaster {
    fn register(&self, client: Arc<FakeClient>) {
        self.clients.lock().unwrap().insert(client.character_id, client);
    }
}

impl Broadcaster for FakeBroadcaster {
    fn send_to_character(&self, character_id: CharacterId, message: ServerMessage) {
        if let Some(client) = self.clients.lock().unwrap().get(&character_id) {
            client.send(message);
        }
    }

    fn broadcast_to_world(&self, world_id: WorldId, message: ServerMessage) {
        for client in self.clients.lock().unwrap().values() {
            if client.world_id() == world_id {
                client.send(message.clone());
            }
        }
    }

    fn broadcast_to_area(&self, center: Position, radius: f64, message: ServerMessage) {
        let positions = self.positions.lock().unwrap();
        for client in self.clients.lock().unwrap().values() {
            if let Some(pos) = positions.get(&client.character_id) {
                if pos.distance_to(center) <= radius {
                    client.send(message.clone());
                }
            }
        }
    }

    fn clients_by_world(&self, world_id: WorldId) -> Vec<Arc<dyn GameClient>> {
        self.clients
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.world_id() == world_id)
            .map(|c| c.clone() as Arc<dyn GameClient>)
            .collect()
    }

    fn update_character_position(&self, character_id: CharacterId, position: Position) {
        self.positions.lock().unwrap().insert(character_id, position);
    }
}

fn new_world(shape: WorldShape) -> World {
    World {
        id: WorldId::new_random(),
        name: "Aria".to_string(),
        owner_id: "owner".to_string(),
        shape,
    }
}

fn new_character(character_id: CharacterId, world_id: WorldId, position: Position, username: &str) -> Character {
    Character {
        character_id,
        user_id: "user".to_string(),
        world_id,
        name: username.to_string(),
        role: "player".to_string(),
        appearance: String::new(),
        position,
        orientation: (0.0, 0.0, 0.0),
        created_at: chrono::Utc::now(),
        last_played_at: None,
        inventory: Vec::new(),
        equipment: None,
    }
}

struct Harness {
    broadcaster: Arc<FakeBroadcaster>,
    character_repo: Arc<InMemoryCharacterRepo>,
    world_repo: Arc<InMemoryWorldRepo>,
    dispatcher: CommandDispatcher,
}

impl Harness {
    fn new() -> Self {
        let broadcaster = Arc::new(FakeBroadcaster::default());
        let character_repo = Arc::new(InMemoryCharacterRepo::new());
        let world_repo = Arc::new(InMemoryWorldRepo::new());
        let rate_limiter = Arc::new(InMemoryRateLimiter::new(20, 1.0));
        let event_sink = Arc::new(InMemoryEventSink);
        let dispatcher = CommandDispatcher::new(
            broadcaster.clone(),
            character_repo.clone(),
            world_repo.clone(),
            rate_limiter,
            event_sink,
        );
        Self { broadcaster, character_repo, world_repo, dispatcher }
    }

    async fn send(&self, client: &Arc<FakeClient>, command: CommandEnvelope) {
        self.dispatcher.process(client.clone(), command).await;
    }
}

#[tokio::test]
async fn wall_in_the_lobby_refuses_and_does_not_update_repo() {
    let harness = Harness::new();
    let client = FakeClient::new(LOBBY_WORLD_ID, "Alice");
    let character = new_character(client.character_id, LOBBY_WORLD_ID, Position::new(5.0, 1000.0), "Alice");
    harness.character_repo.insert(character.clone());
    harness.broadcaster.register(client.clone());

    harness.send(&client, CommandEnvelope::new("n")).await;

    let sent = client.drain();
    assert_eq!(sent.len(), 1);
    match &sent[0] {
        ServerMessage::Movement { text, .. } => assert!(text.contains("cannot go further north")),
        other => panic!("unexpected message: {other:?}"),
    }
    let unchanged = harness.character_repo.get(client.character_id).await.unwrap();
    assert_eq!(unchanged.position, Position::new(5.0, 1000.0));
}

#[tokio::test]
async fn spherical_north_pole_crossing_moves_and_updates_repo_once() {
    let harness = Harness::new();
    let world = new_world(WorldShape::Spherical { circumference_meters: 10_000.0 });
    harness.world_repo.insert(world.clone());

    let client = FakeClient::new(world.id, "Nova");
    let character = new_character(client.character_id, world.id, Position::new(0.0, 89.99), "Nova");
    harness.character_repo.insert(character);
    harness.broadcaster.register(client.clone());

    harness.send(&client, CommandEnvelope::new("n")).await;

    let updated = harness.character_repo.get(client.character_id).await.unwrap();
    assert!((updated.position.x - 180.0).abs() < 0.1);
    assert!((updated.position.y - 89.974).abs() < 0.01);

    let sent = client.drain();
    let movement = sent
        .iter()
        .find_map(|m| match m {
            ServerMessage::Movement { text, note } => Some((text.clone(), note.clone())),
            _ => None,
        })
        .expect("expected a movement message");
    assert!(movement.1.unwrap().contains("cross the pole"));
}

#[tokio::test]
async fn cross_world_tell_reaches_recipient_and_sender_gets_self_copy() {
    let harness = Harness::new();
    let world_a = new_world(WorldShape::Spherical { circumference_meters: 10_000.0 });
    let world_b = new_world(WorldShape::Spherical { circumference_meters: 10_000.0 });
    harness.world_repo.insert(world_a.clone());
    harness.world_repo.insert(world_b.clone());

    let alice = FakeClient::new(world_a.id, "Alice");
    let bob = FakeClient::new(world_b.id, "Bob");
    harness.character_repo.insert(new_character(alice.character_id, world_a.id, Position::new(0.0, 0.0), "Alice"));
    harness.character_repo.insert(new_character(bob.character_id, world_b.id, Position::new(0.0, 0.0), "Bob"));
    harness.broadcaster.register(alice.clone());
    harness.broadcaster.register(bob.clone());

    let mut command = CommandEnvelope::new("tell");
    command.recipient = Some("BOB".to_string());
    command.message = Some("hi".to_string());
    harness.send(&alice, command).await;

    let alice_sent = alice.drain();
    assert!(alice_sent.iter().any(|m| matches!(m, ServerMessage::TellSelf { text, .. } if text.contains("You tell Bob, 'hi'"))));

    let bob_sent = bob.drain();
    assert!(bob_sent.iter().any(|m| matches!(m, ServerMessage::Tell { text, .. } if text.contains("Alice tells you, 'hi'"))));
}

#[tokio::test]
async fn tell_to_unknown_player_sends_error_and_touches_no_one_else() {
    let harness = Harness::new();
    let world = new_world(WorldShape::Spherical { circumference_meters: 10_000.0 });
    harness.world_repo.insert(world.clone());

    let alice = FakeClient::new(world.id, "Alice");
    let bystander = FakeClient::new(world.id, "Eve");
    harness.character_repo.insert(new_character(alice.character_id, world.id, Position::new(0.0, 0.0), "Alice"));
    harness.character_repo.insert(new_character(bystander.character_id, world.id, Position::new(0.0, 0.0), "Eve"));
    harness.broadcaster.register(alice.clone());
    harness.broadcaster.register(bystander.clone());

    let mut command = CommandEnvelope::new("tell");
    command.recipient = Some("Ghost".to_string());
    command.message = Some("hi".to_string());
    harness.send(&alice, command).await;

    let alice_sent = alice.drain();
    assert!(alice_sent.iter().any(|m| matches!(m, ServerMessage::Error { text } if text == "That player is not online.")));
    assert!(bystander.drain().is_empty());
}

#[tokio::test]
async fn say_reaches_every_other_session_in_world_exactly_once() {
    let harness = Harness::new();
    let world = new_world(WorldShape::Spherical { circumference_meters: 10_000.0 });
    harness.world_repo.insert(world.clone());

    let alice = FakeClient::new(world.id, "Alice");
    let bob = FakeClient::new(world.id, "Bob");
    let carol = FakeClient::new(world.id, "Carol");
    for client in [&alice, &bob, &carol] {
        harness.character_repo.insert(new_character(client.character_id, world.id, Position::new(0.0, 0.0), &client.username));
        harness.broadcaster.register(client.clone());
    }

    let mut command = CommandEnvelope::new("say");
    command.message = Some("hello".to_string());
    harness.send(&alice, command).await;

    let alice_sent = alice.drain();
    assert_eq!(alice_sent.len(), 1);
    assert!(matches!(&alice_sent[0], ServerMessage::SpeechSelf { text, .. } if text == "hello"));

    for other in [&bob, &carol] {
        let sent = other.drain();
        assert_eq!(sent.len(), 1);
        assert!(matches!(&sent[0], ServerMessage::Speech { speaker, text, .. } if speaker == "Alice" && text == "hello"));
    }
}

#[tokio::test]
async fn unknown_lobby_command_yields_single_error_payload() {
    let harness = Harness::new();
    let client = FakeClient::new(LOBBY_WORLD_ID, "Alice");
    harness.character_repo.insert(new_character(client.character_id, LOBBY_WORLD_ID, Position::new(0.0, 0.0), "Alice"));
    harness.broadcaster.register(client.clone());

    harness.send(&client, CommandEnvelope::new("dance")).await;

    let sent = client.drain();
    assert_eq!(sent.len(), 1);
    assert!(matches!(&sent[0], ServerMessage::Error { text } if text == "Unknown lobby command."));
}

#[tokio::test]
async fn take_then_drop_round_trips_through_inventory() {
    let harness = Harness::new();
    let world = new_world(WorldShape::Spherical { circumference_meters: 10_000.0 });
    harness.world_repo.insert(world.clone());
    let client = FakeClient::new(world.id, "Alice");
    harness.character_repo.insert(new_character(client.character_id, world.id, Position::new(0.0, 0.0), "Alice"));
    harness.broadcaster.register(client.clone());

    let mut take = CommandEnvelope::new("take");
    take.target = Some("torch".to_string());
    harness.send(&client, take).await;

    let after_take = harness.character_repo.get(client.character_id).await.unwrap();
    assert_eq!(after_take.inventory, vec!["torch".to_string()]);

    let mut drop = CommandEnvelope::new("drop");
    drop.target = Some("torch".to_string());
    harness.send(&client, drop).await;

    let after_drop = harness.character_repo.get(client.character_id).await.unwrap();
    assert!(after_drop.inventory.is_empty());
}

#[tokio::test]
async fn take_without_target_is_a_soft_error_not_a_repo_mutation() {
    let harness = Harness::new();
    let world = new_world(WorldShape::Spherical { circumference_meters: 10_000.0 });
    harness.world_repo.insert(world.clone());
    let client = FakeClient::new(world.id, "Alice");
    harness.character_repo.insert(new_character(client.character_id, world.id, Position::new(0.0, 0.0), "Alice"));
    harness.broadcaster.register(client.clone());

    harness.send(&client, CommandEnvelope::new("take")).await;

    let sent = client.drain();
    assert!(matches!(&sent[0], ServerMessage::Error { text } if text == "Take what?"));
    let character = harness.character_repo.get(client.character_id).await.unwrap();
    assert!(character.inventory.is_empty());
}

#[tokio::test]
async fn rate_limited_character_gets_error_and_no_movement() {
    let harness = Harness::new();
    let world = new_world(WorldShape::Spherical { circumference_meters: 10_000.0 });
    harness.world_repo.insert(world.clone());
    let client = FakeClient::new(world.id, "Alice");
    harness.character_repo.insert(new_character(client.character_id, world.id, Position::new(0.0, 0.0), "Alice"));
    harness.broadcaster.register(client.clone());

    let limiter = InMemoryRateLimiter::new(1, 0.0);
    let dispatcher = CommandDispatcher::new(
        harness.broadcaster.clone(),
        harness.character_repo.clone(),
        harness.world_repo.clone(),
        Arc::new(limiter),
        Arc::new(InMemoryEventSink),
    );

    dispatcher.process(client.clone(), CommandEnvelope::new("n")).await;
    client.drain();
    dispatcher.process(client.clone(), CommandEnvelope::new("n")).await;

    let sent = client.drain();
    assert!(sent.iter().any(|m| matches!(m, ServerMessage::Error { text } if text == "You're doing that too fast.")));
}

#[tokio::test]
async fn unrecognized_in_world_action_yields_generic_error() {
    let harness = Harness::new();
    let world = new_world(WorldShape::Spherical { circumference_meters: 10_000.0 });
    harness.world_repo.insert(world.clone());
    let client = FakeClient::new(world.id, "Alice");
    harness.character_repo.insert(new_character(client.character_id, world.id, Position::new(0.0, 0.0), "Alice"));
    harness.broadcaster.register(client.clone());

    harness.send(&client, CommandEnvelope::new("juggle")).await;

    let sent = client.drain();
    assert!(matches!(&sent[0], ServerMessage::Error { text } if text == "That doesn't do anything here."));
}
