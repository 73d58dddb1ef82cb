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
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, instrument, trace};

use core_common::{CharacterId, WorldId};
use core_protocol::{ClientFrame, Position, ServerMessage};
use core_session::{GameClient, Session, SendOutcome};
use core_spatial_index::SpatialIndex;

use crate::broadcaster::Broadcaster;
use crate::processor::CommandProcessor;
use crate::BROADCAST_WORKER_THRESHOLD;

enum HubEvent {
    Register(Arc<Session>, Position),
    Unregister(CharacterId),
    Inbound(Arc<Session>, ClientFrame),
}

/// Registry of live sessions plus the broadcast primitives and routing loop
/// that sit between the sessions and the command processor. One `Hub`
/// serves one process; `spawn` starts its routing task.
pub struct Hub {
    clients_by_character: DashMap<CharacterId, Arc<Session>>,
    spatial_index: Arc<SpatialIndex>,
    event_tx: mpsc::UnboundedSender<HubEvent>,
}

impl Hub {
    /// Construct the hub and spawn its single routing task. `processor`
    /// is the narrow capability used to dispatch inbound commands; the
    /// hub holds no other knowledge of the dispatcher.
    pub fn spawn(processor: Arc<dyn CommandProcessor>) -> Arc<Self> {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<HubEvent>();
        let hub = Arc::new(Self {
            clients_by_character: DashMap::new(),
            spatial_index: Arc::new(SpatialIndex::new()),
            event_tx,
        });

        let routing_hub = hub.clone();
        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                routing_hub.handle_event(event, &processor).await;
            }
        });

        hub
    }

    /// A cloneable handle the session pumps use to push inbound frames onto
    /// this hub's routing queue without holding an `Arc<Hub>` directly.
    pub fn inbound_channel(&self) -> InboundChannel {
        InboundChannel(self.event_tx.clone())
    }

    #[instrument(skip(self, event, processor))]
    async fn handle_event(&self, event: HubEvent, processor: &Arc<dyn CommandProcessor>) {
        match event {
            HubEvent::Register(session, position) => self.do_register(session, position),
            HubEvent::Unregister(character_id) => self.do_unregister(character_id),
            HubEvent::Inbound(session, ClientFrame::Command(command)) => {
                let client: Arc<dyn GameClient> = session;
                processor.process(client, command).await;
            }
        }
    }

    fn do_register(&self, session: Arc<Session>, position: Position) {
        let character_id = session.character_id();
        if let Some((_, previous)) = self.clients_by_character.remove(&character_id) {
            debug!(%character_id, "superseding prior session for character");
            previous.close_once();
        }
        session.mark_active();
        self.clients_by_character.insert(character_id, session);
        // Seed the spatial index immediately so area broadcasts (e.g. a
        // whisper's proximity check) can find this character before it has
        // ever issued a movement command.
        self.spatial_index.update(character_id, position);
    }

    fn do_unregister(&self, character_id: CharacterId) {
        if let Some((_, session)) = self.clients_by_character.remove(&character_id) {
            session.close_once();
            self.spatial_index.remove(character_id);
            trace!(%character_id, "session unregistered");
        }
    }

    pub fn register(&self, session: Arc<Session>, position: Position) {
        let _ = self.event_tx.send(HubEvent::Register(session, position));
    }

    pub fn unregister(&self, character_id: CharacterId) {
        let _ = self.event_tx.send(HubEvent::Unregister(character_id));
    }

    pub fn get_client_count(&self) -> usize {
        self.clients_by_character.len()
    }

    pub fn spatial_index(&self) -> &Arc<SpatialIndex> {
        &self.spatial_index
    }

    fn snapshot(&self) -> Vec<Arc<Session>> {
        self.clients_by_character
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn send_and_evict_on_failure(&self, session: &Arc<Session>, message: ServerMessage) {
        send_and_evict(&self.event_tx, session, message);
    }
}

fn send_and_evict(event_tx: &mpsc::UnboundedSender<HubEvent>, session: &Arc<Session>, message: ServerMessage) {
    if let SendOutcome::QueueFull = session.send(message) {
        let _ = event_tx.send(HubEvent::Unregister(session.character_id()));
    }
}

/// Delivers `message` to every session in `recipients`. Small candidate sets
/// are sent inline on the caller's task; sets above
/// [`BROADCAST_WORKER_THRESHOLD`] fan out across a `JoinSet` so one slow
/// client can't hold up delivery to the rest.
async fn fan_out(
    event_tx: mpsc::UnboundedSender<HubEvent>,
    recipients: Vec<Arc<Session>>,
    message: ServerMessage,
) {
    if recipients.len() <= BROADCAST_WORKER_THRESHOLD {
        for session in &recipients {
            send_and_evict(&event_tx, session, message.clone());
        }
        return;
    }

    let mut set = JoinSet::new();
    for session in recipients {
        let message = message.clone();
        let event_tx = event_tx.clone();
        set.spawn(async move {
            send_and_evict(&event_tx, &session, message);
        });
    }
    while set.join_next().await.is_some() {}
}

impl Broadcaster for Hub {
    fn send_to_character(&self, character_id: CharacterId, message: ServerMessage) {
        if let Some(session) = self.clients_by_character.get(&character_id) {
            self.send_and_evict_on_failure(&session, message);
        }
    }

    fn broadcast_to_world(&self, world_id: WorldId, message: ServerMessage) {
        let recipients: Vec<Arc<Session>> = self
            .snapshot()
            .into_iter()
            .filter(|s| s.world_id() == world_id)
            .collect();
        let event_tx = self.event_tx.clone();
        tokio::spawn(fan_out(event_tx, recipients, message));
    }

    fn broadcast_to_area(&self, center: Position, radius: f64, message: ServerMessage) {
        let matched = self.spatial_index.query_radius(center, radius);
        let recipients: Vec<Arc<Session>> = matched
            .into_iter()
            .filter_map(|id| self.clients_by_character.get(&id).map(|e| e.value().clone()))
            .collect();
        let event_tx = self.event_tx.clone();
        tokio::spawn(fan_out(event_tx, recipients, message));
    }

    fn clients_by_world(&self, world_id: WorldId) -> Vec<Arc<dyn GameClient>> {
        self.snapshot()
            .into_iter()
            .filter(|s| s.world_id() == world_id)
            .map(|s| s as Arc<dyn GameClient>)
            .collect()
    }

    fn update_character_position(&self, character_id: CharacterId, position: Position) {
        self.spatial_index.update(character_id, position);
    }
}

/// A cloneable handle that forwards inbound frames/register/unregister
/// events into a hub's routing queue. Cheap to clone; held by session
/// bootstrap code and by the session pumps' caller.
#[derive(Clone)]
pub struct InboundChannel(mpsc::UnboundedSender<HubEvent>);

impl InboundChannel {
    pub fn register(&self, session: Arc<Session>, position: Position) {
        let _ = self.0.send(HubEvent::Register(session, position));
    }

    pub fn unregister(&self, character_id: CharacterId) {
        let _ = self.0.send(HubEvent::Unregister(character_id));
    }

    pub fn inbound(&self, session: Arc<Session>, frame: ClientFrame) {
        let _ = self.0.send(HubEvent::Inbound(session, frame));
    }
}
