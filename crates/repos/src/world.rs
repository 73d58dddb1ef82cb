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
use core_common::WorldId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The geometry a world's movement rules use. The lobby world is always
/// `Cartesian`; every world a `WorldRepo` returns should be `Spherical`
/// unless it specifically opts out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WorldShape {
    Cartesian,
    Spherical { circumference_meters: f64 },
}

impl Default for WorldShape {
    fn default() -> Self {
        WorldShape::Spherical {
            circumference_meters: 10_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub id: WorldId,
    pub name: String,
    pub owner_id: String,
    pub shape: WorldShape,
}

#[derive(Debug, Error)]
pub enum WorldRepoError {
    #[error("world {0} not found")]
    NotFound(WorldId),
    #[error("repository error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait WorldRepo: Send + Sync {
    async fn get(&self, world_id: WorldId) -> Result<World, WorldRepoError>;
    async fn list(&self) -> Result<Vec<World>, WorldRepoError>;
}
