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

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::trace;

use core_common::{CharacterId, SessionId, WorldId};
use core_protocol::ServerMessage;

use crate::client::{GameClient, SendOutcome};
use crate::OUTBOUND_QUEUE_CAPACITY;

/// Lifecycle of a session: `Connecting -> Active -> Draining -> Closed`.
/// `Draining -> Closed` happens once the connection is closed and both
/// pumps have exited; see `Session::close_once`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Connecting = 0,
    Active = 1,
    Draining = 2,
    Closed = 3,
}

impl From<u8> for SessionState {
    fn from(v: u8) -> Self {
        match v {
            0 => SessionState::Connecting,
            1 => SessionState::Active,
            2 => SessionState::Draining,
            _ => SessionState::Closed,
        }
    }
}

/// One live client connection. Identity fields are fixed for the lifetime
/// of the session; a character that changes world establishes a new
/// session rather than mutating this one in place.
pub struct Session {
    session_id: SessionId,
    character_id: CharacterId,
    user_id: String,
    world_id: WorldId,
    username: String,
    outbound_tx: mpsc::Sender<ServerMessage>,
    outbound_rx: Mutex<Option<mpsc::Receiver<ServerMessage>>>,
    state: AtomicU8,
    /// Explicit shutdown latch: guarantees the outbound queue is treated as
    /// closed exactly once, independent of how many references to this
    /// `Session` are held elsewhere (hub, dispatcher, pumps).
    closed: AtomicBool,
}

impl Session {
    pub fn new(
        session_id: SessionId,
        character_id: CharacterId,
        user_id: String,
        world_id: WorldId,
        username: String,
    ) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        Self {
            session_id,
            character_id,
            user_id,
            world_id,
            username,
            outbound_tx,
            outbound_rx: Mutex::new(Some(outbound_rx)),
            state: AtomicU8::new(SessionState::Connecting as u8),
            closed: AtomicBool::new(false),
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> SessionState {
        SessionState::from(self.state.load(Ordering::Acquire))
    }

    pub fn mark_active(&self) {
        let _ = self.state.compare_exchange(
            SessionState::Connecting as u8,
            SessionState::Active as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Transition to `Draining`. Idempotent: called from any of "write
    /// error", "full queue", or "explicit unregister".
    pub fn mark_draining(&self) {
        loop {
            let current = self.state.load(Ordering::Acquire);
            if current >= SessionState::Draining as u8 {
                return;
            }
            if self
                .state
                .compare_exchange(
                    current,
                    SessionState::Draining as u8,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
            {
                return;
            }
        }
    }

    /// Close the session's outbound queue exactly once. Safe to call from
    /// multiple places (read pump EOF, hub unregister) concurrently; only
    /// the first caller observes `true`.
    pub fn close_once(&self) -> bool {
        let first = self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if first {
            self.mark_draining();
            self.state.store(SessionState::Closed as u8, Ordering::Release);
            trace!(session_id = %self.session_id, "session closed");
        }
        first
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Taken exactly once by the write pump; `None` on a second call.
    pub fn take_outbound_receiver(&self) -> Option<mpsc::Receiver<ServerMessage>> {
        self.outbound_rx.lock().unwrap().take()
    }
}

impl GameClient for Session {
    fn character_id(&self) -> CharacterId {
        self.character_id
    }

    fn world_id(&self) -> WorldId {
        self.world_id
    }

    fn username(&self) -> &str {
        &self.username
    }

    fn send(&self, message: ServerMessage) -> SendOutcome {
        if self.is_closed() {
            return SendOutcome::QueueFull;
        }
        match self.outbound_tx.try_send(message) {
            Ok(()) => SendOutcome::Sent,
            Err(_) => {
                self.mark_draining();
                SendOutcome::QueueFull
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_protocol::ServerMessage;

    fn new_session() -> Session {
        Session::new(
            SessionId::new_random(),
            CharacterId::new_random(),
            "user-1".to_string(),
            WorldId::new_random(),
            "Alice".to_string(),
        )
    }

    #[test]
    fn send_succeeds_while_open() {
        let session = new_session();
        assert_eq!(session.send(ServerMessage::system("hi")), SendOutcome::Sent);
    }

    #[test]
    fn send_fails_after_close() {
        let session = new_session();
        assert!(session.close_once());
        assert_eq!(
            session.send(ServerMessage::system("hi")),
            SendOutcome::QueueFull
        );
    }

    #[test]
    fn close_once_is_idempotent() {
        let session = new_session();
        assert!(session.close_once());
        assert!(!session.close_once());
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn full_queue_marks_draining() {
        let session = new_session();
        for _ in 0..crate::OUTBOUND_QUEUE_CAPACITY {
            assert_eq!(session.send(ServerMessage::system("x")), SendOutcome::Sent);
        }
        assert_eq!(
            session.send(ServerMessage::system("overflow")),
            SendOutcome::QueueFull
        );
        assert_eq!(session.state(), SessionState::Draining);
    }

    #[test]
    fn outbound_receiver_taken_once() {
        let session = new_session();
        assert!(session.take_outbound_receiver().is_some());
        assert!(session.take_outbound_receiver().is_none());
    }
}
