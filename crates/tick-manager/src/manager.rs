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

use dashmap::DashMap;
use tracing::info;

use core_common::WorldId;
use core_hub::Broadcaster;
use core_repos::EventSink;

use crate::error::TickError;
use crate::ticker::{self, TickerHandle, TickerSnapshot};

/// Registry of running per-world ticker tasks. One `TickManager` serves the
/// whole process; each world gets at most one ticker at a time.
#[derive(Default)]
pub struct TickManager {
    tickers: DashMap<WorldId, TickerHandle>,
}

impl TickManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a ticker for `world_id`. Fails if one is already running;
    /// callers must `stop` it first.
    pub fn spawn(
        &self,
        world_id: WorldId,
        dilation: f64,
        broadcaster: Arc<dyn Broadcaster>,
        event_sink: Arc<dyn EventSink>,
    ) -> Result<TickerHandle, TickError> {
        if self.tickers.contains_key(&world_id) {
            return Err(TickError::AlreadyRunning(world_id));
        }
        let handle = ticker::spawn(world_id, dilation, broadcaster, event_sink);
        self.tickers.insert(world_id, handle.clone());
        info!(%world_id, "ticker spawned");
        Ok(handle)
    }

    /// No-op if the world has no running ticker.
    pub fn pause(&self, world_id: WorldId) {
        if let Some(handle) = self.tickers.get(&world_id) {
            handle.pause();
        }
    }

    /// No-op if the world has no running ticker.
    pub fn resume(&self, world_id: WorldId) {
        if let Some(handle) = self.tickers.get(&world_id) {
            handle.resume();
        }
    }

    /// Signals the ticker to stop and removes it from the registry
    /// immediately; the loop task itself winds down asynchronously.
    pub fn stop(&self, world_id: WorldId) {
        if let Some((_, handle)) = self.tickers.remove(&world_id) {
            handle.stop();
            info!(%world_id, "ticker stopped");
        }
    }

    pub fn status(&self, world_id: WorldId) -> Option<TickerSnapshot> {
        self.tickers.get(&world_id).map(|handle| handle.status())
    }

    /// Stops every running ticker. Used on server shutdown.
    pub fn stop_all(&self) {
        let world_ids: Vec<WorldId> = self.tickers.iter().map(|entry| *entry.key()).collect();
        for world_id in world_ids {
            self.stop(world_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_protocol::{Position, ServerMessage};
    use core_repos::InMemoryEventSink;

    struct NoopBroadcaster;
    impl Broadcaster for NoopBroadcaster {
        fn send_to_character(&self, _: core_common::CharacterId, _: ServerMessage) {}
        fn broadcast_to_world(&self, _: WorldId, _: ServerMessage) {}
        fn broadcast_to_area(&self, _: Position, _: f64, _: ServerMessage) {}
        fn clients_by_world(&self, _: WorldId) -> Vec<Arc<dyn core_session::GameClient>> {
            Vec::new()
        }
        fn update_character_position(&self, _: core_common::CharacterId, _: Position) {}
    }

    fn manager() -> TickManager {
        TickManager::new()
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn spawning_twice_for_the_same_world_fails() {
        let manager = manager();
        let world_id = WorldId::new_random();
        manager
            .spawn(world_id, 1.0, Arc::new(NoopBroadcaster), Arc::new(InMemoryEventSink))
            .unwrap();

        let err = manager
            .spawn(world_id, 1.0, Arc::new(NoopBroadcaster), Arc::new(InMemoryEventSink))
            .unwrap_err();
        assert!(matches!(err, TickError::AlreadyRunning(id) if id == world_id));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn stopping_removes_the_world_from_the_registry() {
        let manager = manager();
        let world_id = WorldId::new_random();
        manager
            .spawn(world_id, 1.0, Arc::new(NoopBroadcaster), Arc::new(InMemoryEventSink))
            .unwrap();

        manager.stop(world_id);
        assert!(manager.status(world_id).is_none());

        manager
            .spawn(world_id, 1.0, Arc::new(NoopBroadcaster), Arc::new(InMemoryEventSink))
            .expect("world is free to respawn after stop");
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn status_for_unknown_world_is_none() {
        let manager = manager();
        assert!(manager.status(WorldId::new_random()).is_none());
    }
}
