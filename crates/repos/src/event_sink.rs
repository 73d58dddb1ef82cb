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
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A domain event recorded for offline consumption (analytics, audit,
/// replay). Appending is best-effort: failures are logged by the sink
/// implementation and never propagate to the tick loop or dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub event_type: DomainEventType,
    pub aggregate_id: String,
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainEventType {
    WorldCreated,
    WorldTicked,
    WorldPaused,
    WorldResumed,
    PlayerMoved,
    StaminaChanged,
}

impl DomainEvent {
    pub fn world(event_type: DomainEventType, world_id: WorldId, payload: Value) -> Self {
        Self {
            event_type,
            aggregate_id: world_id.to_string(),
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn character(event_type: DomainEventType, character_id: CharacterId, payload: Value) -> Self {
        Self {
            event_type,
            aggregate_id: character_id.to_string(),
            payload,
            timestamp: Utc::now(),
        }
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn append(&self, event: DomainEvent);
}
