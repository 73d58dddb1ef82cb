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

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, instrument};

use core_common::WorldId;
use core_hub::Broadcaster;
use core_protocol::Position;
use core_repos::event_sink::{DomainEvent, DomainEventType};
use core_repos::EventSink;

use crate::clock::WorldClock;
use crate::weather::WeatherTable;

/// Fixed wall-clock period between ticks.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);
/// On resume, missed ticks replay at `TICK_INTERVAL / CATCHUP_DILATION_FACTOR`.
pub const CATCHUP_DILATION_FACTOR: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerStatus {
    Running,
    Paused,
    Stopped,
}

#[derive(Debug, Clone, Copy)]
pub struct TickerSnapshot {
    pub status: TickerStatus,
    pub tick_count: u64,
    pub game_time: Duration,
}

enum TickerCommand {
    Pause,
    Resume,
    Stop,
}

/// A handle to a running ticker task. Cloning is cheap; every clone talks
/// to the same underlying loop.
#[derive(Clone, Debug)]
pub struct TickerHandle {
    world_id: WorldId,
    command_tx: mpsc::UnboundedSender<TickerCommand>,
    snapshot: Arc<Mutex<TickerSnapshot>>,
}

impl TickerHandle {
    pub fn world_id(&self) -> WorldId {
        self.world_id
    }

    /// Idempotent: pausing an already-paused or stopped ticker is a no-op.
    pub fn pause(&self) {
        let _ = self.command_tx.send(TickerCommand::Pause);
    }

    /// Idempotent: resuming a running or stopped ticker is a no-op.
    pub fn resume(&self) {
        let _ = self.command_tx.send(TickerCommand::Resume);
    }

    /// Idempotent: stopping an already-stopped ticker is a no-op.
    pub fn stop(&self) {
        let _ = self.command_tx.send(TickerCommand::Stop);
    }

    pub fn status(&self) -> TickerSnapshot {
        *self.snapshot.lock().unwrap()
    }
}

/// Spawns the per-world tick loop and returns a handle to it. `dilation`
/// must be > 0; game time accumulates at `TICK_INTERVAL * dilation` per
/// tick.
pub fn spawn(
    world_id: WorldId,
    dilation: f64,
    broadcaster: Arc<dyn Broadcaster>,
    event_sink: Arc<dyn EventSink>,
) -> TickerHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let snapshot = Arc::new(Mutex::new(TickerSnapshot {
        status: TickerStatus::Running,
        tick_count: 0,
        game_time: Duration::ZERO,
    }));

    let handle = TickerHandle {
        world_id,
        command_tx,
        snapshot: snapshot.clone(),
    };

    tokio::spawn(run(world_id, dilation, snapshot, command_rx, broadcaster, event_sink));

    handle
}

#[instrument(skip(snapshot, command_rx, broadcaster, event_sink), fields(%world_id))]
async fn run(
    world_id: WorldId,
    dilation: f64,
    snapshot: Arc<Mutex<TickerSnapshot>>,
    mut command_rx: mpsc::UnboundedReceiver<TickerCommand>,
    broadcaster: Arc<dyn Broadcaster>,
    event_sink: Arc<dyn EventSink>,
) {
    event_sink
        .append(DomainEvent::world(DomainEventType::WorldCreated, world_id, json!({})))
        .await;

    let clock = WorldClock::default();
    let weather = WeatherTable::default();
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    let mut paused_at: Option<Instant> = None;

    loop {
        let status = snapshot.lock().unwrap().status;
        match status {
            TickerStatus::Stopped => break,
            TickerStatus::Paused => match command_rx.recv().await {
                Some(TickerCommand::Resume) => {
                    let missed_real = paused_at.map(|p| p.elapsed()).unwrap_or_default();
                    paused_at = None;
                    catch_up(world_id, &snapshot, missed_real, dilation, &clock, &weather, &broadcaster, &event_sink, &mut command_rx).await;
                    if snapshot.lock().unwrap().status == TickerStatus::Stopped {
                        break;
                    }
                    event_sink
                        .append(DomainEvent::world(DomainEventType::WorldResumed, world_id, json!({})))
                        .await;
                    interval.reset();
                }
                Some(TickerCommand::Stop) => {
                    snapshot.lock().unwrap().status = TickerStatus::Stopped;
                    break;
                }
                Some(TickerCommand::Pause) | None => {}
            },
            TickerStatus::Running => {
                tokio::select! {
                    _ = interval.tick() => {
                        do_tick(world_id, &snapshot, dilation, &clock, &weather, &broadcaster, &event_sink).await;
                    }
                    cmd = command_rx.recv() => {
                        match cmd {
                            Some(TickerCommand::Pause) => {
                                snapshot.lock().unwrap().status = TickerStatus::Paused;
                                paused_at = Some(Instant::now());
                                event_sink.append(DomainEvent::world(DomainEventType::WorldPaused, world_id, json!({}))).await;
                            }
                            Some(TickerCommand::Stop) => {
                                snapshot.lock().unwrap().status = TickerStatus::Stopped;
                                break;
                            }
                            Some(TickerCommand::Resume) | None => {}
                        }
                    }
                }
            }
        }
    }

    debug!("ticker loop exited");
}

async fn do_tick(
    world_id: WorldId,
    snapshot: &Arc<Mutex<TickerSnapshot>>,
    dilation: f64,
    clock: &WorldClock,
    weather: &WeatherTable,
    broadcaster: &Arc<dyn Broadcaster>,
    event_sink: &Arc<dyn EventSink>,
) {
    let (previous_game_time, tick_count, game_time) = {
        let mut guard = snapshot.lock().unwrap();
        let previous = guard.game_time;
        guard.tick_count += 1;
        guard.game_time += TICK_INTERVAL.mul_f64(dilation);
        (previous, guard.tick_count, guard.game_time)
    };

    let time_of_day = clock.time_of_day(game_time);
    let season = clock.season(game_time);

    event_sink
        .append(DomainEvent::world(
            DomainEventType::WorldTicked,
            world_id,
            json!({
                "tick_count": tick_count,
                "game_time_secs": game_time.as_secs_f64(),
                "time_of_day": format!("{time_of_day:?}"),
                "season": format!("{season:?}"),
            }),
        ))
        .await;

    if let Some(kind) = weather.transition(previous_game_time, game_time) {
        broadcaster.broadcast_to_world(world_id, core_protocol::ServerMessage::system(kind.description()));
    }
}

#[allow(clippy::too_many_arguments)]
async fn catch_up(
    world_id: WorldId,
    snapshot: &Arc<Mutex<TickerSnapshot>>,
    missed_real: Duration,
    dilation: f64,
    clock: &WorldClock,
    weather: &WeatherTable,
    broadcaster: &Arc<dyn Broadcaster>,
    event_sink: &Arc<dyn EventSink>,
    command_rx: &mut mpsc::UnboundedReceiver<TickerCommand>,
) {
    let missed_ticks = (missed_real.as_secs_f64() / TICK_INTERVAL.as_secs_f64()).floor() as u64;
    if missed_ticks == 0 {
        snapshot.lock().unwrap().status = TickerStatus::Running;
        return;
    }

    let accelerated_interval = TICK_INTERVAL.div_f64(CATCHUP_DILATION_FACTOR);
    for _ in 0..missed_ticks {
        if let Ok(TickerCommand::Stop) = command_rx.try_recv() {
            snapshot.lock().unwrap().status = TickerStatus::Stopped;
            return;
        }
        do_tick(world_id, snapshot, dilation, clock, weather, broadcaster, event_sink).await;
        tokio::time::sleep(accelerated_interval).await;
    }

    snapshot.lock().unwrap().status = TickerStatus::Running;
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_repos::InMemoryEventSink;

    struct NoopBroadcaster;
    impl Broadcaster for NoopBroadcaster {
        fn send_to_character(&self, _: core_common::CharacterId, _: core_protocol::ServerMessage) {}
        fn broadcast_to_world(&self, _: WorldId, _: core_protocol::ServerMessage) {}
        fn broadcast_to_area(&self, _: Position, _: f64, _: core_protocol::ServerMessage) {}
        fn clients_by_world(&self, _: WorldId) -> Vec<Arc<dyn core_session::GameClient>> {
            Vec::new()
        }
        fn update_character_position(&self, _: core_common::CharacterId, _: Position) {}
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn tick_count_and_game_time_are_monotonic() {
        let handle = spawn(
            WorldId::new_random(),
            1.0,
            Arc::new(NoopBroadcaster),
            Arc::new(InMemoryEventSink),
        );

        tokio::time::advance(TICK_INTERVAL * 5).await;
        tokio::task::yield_now().await;

        let snapshot = handle.status();
        assert!(snapshot.tick_count >= 4);
        assert!(snapshot.game_time >= TICK_INTERVAL * 4);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn pause_then_pause_is_a_no_op() {
        let handle = spawn(
            WorldId::new_random(),
            1.0,
            Arc::new(NoopBroadcaster),
            Arc::new(InMemoryEventSink),
        );
        tokio::time::advance(TICK_INTERVAL * 2).await;
        tokio::task::yield_now().await;

        handle.pause();
        tokio::task::yield_now().await;
        let after_first_pause = handle.status();
        assert_eq!(after_first_pause.status, TickerStatus::Paused);

        handle.pause();
        tokio::task::yield_now().await;
        let after_second_pause = handle.status();
        assert_eq!(after_second_pause.tick_count, after_first_pause.tick_count);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn resume_replays_missed_ticks_through_catch_up() {
        let handle = spawn(
            WorldId::new_random(),
            1.0,
            Arc::new(NoopBroadcaster),
            Arc::new(InMemoryEventSink),
        );

        tokio::time::advance(TICK_INTERVAL * 2).await;
        tokio::task::yield_now().await;
        let before_pause = handle.status().tick_count;

        handle.pause();
        tokio::task::yield_now().await;
        assert_eq!(handle.status().status, TickerStatus::Paused);

        // Three ticks' worth of real time pass while nothing is running.
        tokio::time::advance(TICK_INTERVAL * 3).await;

        handle.resume();
        tokio::task::yield_now().await;

        // Catch-up replays at an accelerated cadence; step the virtual
        // clock through each accelerated sub-tick's sleep.
        let accelerated = TICK_INTERVAL.div_f64(CATCHUP_DILATION_FACTOR);
        for _ in 0..4 {
            tokio::time::advance(accelerated).await;
            tokio::task::yield_now().await;
        }

        let after_resume = handle.status();
        assert_eq!(after_resume.status, TickerStatus::Running);
        assert!(after_resume.tick_count >= before_pause + 3);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn stop_transitions_to_stopped() {
        let handle = spawn(
            WorldId::new_random(),
            1.0,
            Arc::new(NoopBroadcaster),
            Arc::new(InMemoryEventSink),
        );
        handle.stop();
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        assert_eq!(handle.status().status, TickerStatus::Stopped);
    }
}
