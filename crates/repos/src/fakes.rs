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

//! In-memory implementations of the repository traits. These back the demo
//! binary and are the doubles tests drive the dispatcher with; no
//! persistence engine is implemented here (non-goal).

use std::time::Instant;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::warn;

use chrono::Utc;
use core_common::{CharacterId, WorldId, LOBBY_WORLD_ID};
use core_protocol::Position;

use crate::character::{Character, CharacterRepo, CharacterRepoError};
use crate::event_sink::{DomainEvent, EventSink};
use crate::rate_limiter::{RateLimiter, RateLimiterError};
use crate::world::{World, WorldRepo, WorldRepoError};

#[derive(Default)]
pub struct InMemoryCharacterRepo {
    characters: DashMap<CharacterId, Character>,
}

impl InMemoryCharacterRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, character: Character) {
        self.characters.insert(character.character_id, character);
    }

    /// Stands in for the `LobbyService.ensureLobbyCharacter` collaborator:
    /// returns the user's existing lobby character, or mints one. Real
    /// account/character ownership is an external concern (non-goal); this
    /// only keeps the upgrade endpoint exercisable end to end.
    pub fn ensure_lobby_character(&self, user_id: &str) -> Character {
        if let Some(entry) = self
            .characters
            .iter()
            .find(|entry| entry.user_id == user_id && entry.world_id == LOBBY_WORLD_ID)
        {
            return entry.value().clone();
        }

        let character = Character {
            character_id: CharacterId::new_random(),
            user_id: user_id.to_string(),
            world_id: LOBBY_WORLD_ID,
            name: format!("Guest-{}", &user_id[..user_id.len().min(8)]),
            role: "guest".to_string(),
            appearance: "a traveler fresh off the road".to_string(),
            position: Position::new(0.0, 0.0),
            orientation: (0.0, 0.0, 0.0),
            created_at: Utc::now(),
            last_played_at: None,
            inventory: Vec::new(),
            equipment: None,
        };
        self.insert(character.clone());
        character
    }
}

#[async_trait]
impl CharacterRepo for InMemoryCharacterRepo {
    async fn get(&self, character_id: CharacterId) -> Result<Character, CharacterRepoError> {
        self.characters
            .get(&character_id)
            .map(|entry| entry.value().clone())
            .ok_or(CharacterRepoError::NotFound(character_id))
    }

    async fn update(&self, character: &Character) -> Result<(), CharacterRepoError> {
        self.characters
            .insert(character.character_id, character.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryWorldRepo {
    worlds: DashMap<WorldId, World>,
}

impl InMemoryWorldRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, world: World) {
        self.worlds.insert(world.id, world);
    }
}

#[async_trait]
impl WorldRepo for InMemoryWorldRepo {
    async fn get(&self, world_id: WorldId) -> Result<World, WorldRepoError> {
        self.worlds
            .get(&world_id)
            .map(|entry| entry.value().clone())
            .ok_or(WorldRepoError::NotFound(world_id))
    }

    async fn list(&self) -> Result<Vec<World>, WorldRepoError> {
        Ok(self.worlds.iter().map(|entry| entry.value().clone()).collect())
    }
}

struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token-bucket rate limiter: burst capacity and refill rate are
/// configurable; defaults match the contract's minimum (20 burst, 1/s).
pub struct InMemoryRateLimiter {
    buckets: DashMap<CharacterId, TokenBucket>,
    burst: f64,
    refill_per_second: f64,
}

impl InMemoryRateLimiter {
    pub fn new(burst: u32, refill_per_second: f64) -> Self {
        Self {
            buckets: DashMap::new(),
            burst: burst as f64,
            refill_per_second,
        }
    }
}

impl Default for InMemoryRateLimiter {
    fn default() -> Self {
        Self::new(20, 1.0)
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn allow(&self, character_id: CharacterId) -> Result<bool, RateLimiterError> {
        let now = Instant::now();
        let mut bucket = self.buckets.entry(character_id).or_insert_with(|| TokenBucket {
            tokens: self.burst,
            last_refill: now,
        });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_second).min(self.burst);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// An event sink that simply logs appended events. Real deployments would
/// swap this for a durable event-store client; failures there are defined
/// to be logged and ignored (spec), which this implementation trivially
/// satisfies since logging *is* the sink.
#[derive(Default)]
pub struct InMemoryEventSink;

#[async_trait]
impl EventSink for InMemoryEventSink {
    async fn append(&self, event: DomainEvent) {
        warn!(?event, "event sink is in-memory only; event not persisted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_up_to_burst_then_denies() {
        let limiter = InMemoryRateLimiter::new(3, 1.0);
        let id = CharacterId::new_random();
        assert!(limiter.allow(id).await.unwrap());
        assert!(limiter.allow(id).await.unwrap());
        assert!(limiter.allow(id).await.unwrap());
        assert!(!limiter.allow(id).await.unwrap());
    }

    #[tokio::test]
    async fn distinct_characters_have_independent_buckets() {
        let limiter = InMemoryRateLimiter::new(1, 1.0);
        let a = CharacterId::new_random();
        let b = CharacterId::new_random();
        assert!(limiter.allow(a).await.unwrap());
        assert!(!limiter.allow(a).await.unwrap());
        assert!(limiter.allow(b).await.unwrap());
    }

    #[tokio::test]
    async fn world_repo_round_trips() {
        let repo = InMemoryWorldRepo::new();
        let world = World {
            id: WorldId::new_random(),
            name: "Aria".to_string(),
            owner_id: "u1".to_string(),
            shape: Default::default(),
        };
        repo.insert(world.clone());
        let fetched = repo.get(world.id).await.unwrap();
        assert_eq!(fetched, world);
    }
}
