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

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_common::{CharacterId, WorldId};
use core_protocol::Position;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub character_id: CharacterId,
    pub user_id: String,
    pub world_id: WorldId,
    pub name: String,
    pub role: String,
    pub appearance: String,
    pub position: Position,
    pub orientation: (f64, f64, f64),
    pub created_at: DateTime<Utc>,
    pub last_played_at: Option<DateTime<Utc>>,
    /// Carried item names. Populated/consulted by `take`/`drop` handlers.
    pub inventory: Vec<String>,
    pub equipment: Option<String>,
}

impl Character {
    pub fn username(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Error)]
pub enum CharacterRepoError {
    #[error("character {0} not found")]
    NotFound(CharacterId),
    #[error("repository error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait CharacterRepo: Send + Sync {
    async fn get(&self, character_id: CharacterId) -> Result<Character, CharacterRepoError>;
    async fn update(&self, character: &Character) -> Result<(), CharacterRepoError>;
}
