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
use std::time::Instant;

use core_hub::Hub;
use core_repos::{InMemoryCharacterRepo, InMemoryEventSink, InMemoryRateLimiter, InMemoryWorldRepo};
use core_tick_manager::TickManager;

/// Everything a request handler needs, cloned cheaply via `Arc` fields.
/// Constructed once in `main` and passed to `axum::Router::with_state`.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<Hub>,
    pub character_repo: Arc<InMemoryCharacterRepo>,
    pub world_repo: Arc<InMemoryWorldRepo>,
    pub rate_limiter: Arc<InMemoryRateLimiter>,
    pub event_sink: Arc<InMemoryEventSink>,
    pub tick_manager: Arc<TickManager>,
    pub started_at: Instant,
}

impl AppState {
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
