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

mod config;
mod routes;
mod state;
mod wiring;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tokio::net::TcpListener;
use tracing::info;

use core_common::tracing_init::init_tracing;
use core_common::WorldId;
use core_dispatcher::CommandDispatcher;
use core_hub::{CommandProcessor, Hub};
use core_repos::{InMemoryCharacterRepo, InMemoryEventSink, InMemoryRateLimiter, InMemoryWorldRepo, World, WorldShape};
use core_tick_manager::TickManager;

use crate::config::Args;
use crate::state::AppState;
use crate::wiring::DeferredHub;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::load()?;
    init_tracing(args.debug)?;

    info!(version = core_common::build::version(), "starting core-server");

    let character_repo = Arc::new(InMemoryCharacterRepo::new());
    let world_repo = Arc::new(InMemoryWorldRepo::new());
    let rate_limiter = Arc::new(InMemoryRateLimiter::default());
    let event_sink = Arc::new(InMemoryEventSink);

    let broadcaster: Arc<DeferredHub> = Arc::new(DeferredHub::new());
    let dispatcher: Arc<dyn CommandProcessor> = Arc::new(CommandDispatcher::new(
        broadcaster.clone(),
        character_repo.clone(),
        world_repo.clone(),
        rate_limiter.clone(),
        event_sink.clone(),
    ));

    let hub = Hub::spawn(dispatcher);
    broadcaster.bind(hub.clone());

    let tick_manager = Arc::new(TickManager::new());

    let default_world = World {
        id: WorldId::new_random(),
        name: "Aria".to_string(),
        owner_id: "system".to_string(),
        shape: WorldShape::default(),
    };
    world_repo.insert(default_world.clone());
    tick_manager.spawn(
        default_world.id,
        args.default_dilation,
        broadcaster.clone(),
        event_sink.clone(),
    )?;
    info!(world_id = %default_world.id, "default world ticking");

    let state = AppState {
        hub,
        character_repo,
        world_repo,
        rate_limiter,
        event_sink,
        tick_manager,
        started_at: Instant::now(),
    };

    let router = routes::build_router(state);

    let address: SocketAddr = args.listen_address.parse()?;
    info!(%address, "listening");
    let listener = TcpListener::bind(address).await?;

    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
