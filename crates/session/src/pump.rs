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

//! The read and write pumps run as independent tasks per session so that a
//! slow write never stalls inbound message processing for other sessions
//! (and, within one session, never blocks the read side either).

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval, timeout, Instant};
use tracing::{debug, trace, warn};

use core_protocol::{ClientFrame, ServerMessage, MAX_FRAME_BYTES};

use crate::client::GameClient;
use crate::session::Session;
use crate::{PING_PERIOD, PONG_WAIT, WRITE_WAIT};

/// Reads frames off the socket until EOF, a read-deadline timeout, or a
/// fatal protocol error. Well-formed command frames are forwarded to
/// `inbound_tx`; malformed or oversized frames get an `error` reply and the
/// loop continues. The caller is responsible for unregistering the session
/// once this returns.
pub async fn read_pump(
    session: Arc<Session>,
    mut receiver: SplitStream<WebSocket>,
    inbound_tx: mpsc::UnboundedSender<(Arc<Session>, ClientFrame)>,
) {
    let mut deadline = Instant::now() + PONG_WAIT;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let next = match timeout(remaining, receiver.next()).await {
            Ok(Some(Ok(msg))) => msg,
            Ok(Some(Err(e))) => {
                debug!(session_id = %session.session_id(), error = %e, "read error, closing");
                return;
            }
            Ok(None) => {
                debug!(session_id = %session.session_id(), "peer closed connection");
                return;
            }
            Err(_elapsed) => {
                debug!(session_id = %session.session_id(), "pong wait exceeded, closing");
                return;
            }
        };

        match next {
            Message::Pong(_) => {
                deadline = Instant::now() + PONG_WAIT;
            }
            Message::Ping(_) => {
                // axum answers pings automatically; just treat it as life sign.
                deadline = Instant::now() + PONG_WAIT;
            }
            Message::Close(_) => {
                debug!(session_id = %session.session_id(), "client sent close frame");
                return;
            }
            Message::Binary(_) => {
                session.send_error("Binary frames are not supported.");
            }
            Message::Text(text) => {
                if text.len() > MAX_FRAME_BYTES {
                    session.send_error("Frame too large.");
                    continue;
                }
                match serde_json::from_str::<ClientFrame>(&text) {
                    Ok(frame) => {
                        if inbound_tx.send((session.clone(), frame)).is_err() {
                            warn!(session_id = %session.session_id(), "hub inbound channel closed");
                            return;
                        }
                    }
                    Err(e) => {
                        trace!(session_id = %session.session_id(), error = %e, "failed to parse frame");
                        session.send_error("Could not parse that command.");
                    }
                }
            }
        }
    }
}

/// Drains the outbound queue, coalescing any additionally-pending payloads
/// into one newline-separated text frame, and sends periodic pings. Runs
/// until the outbound channel closes or a write fails.
pub async fn write_pump(session: Arc<Session>, mut sender: SplitSink<WebSocket, Message>) {
    let Some(mut outbound_rx) = session.take_outbound_receiver() else {
        warn!(session_id = %session.session_id(), "write pump started twice");
        return;
    };

    let mut ping_interval = interval(PING_PERIOD);
    ping_interval.tick().await; // first tick fires immediately; discard it

    loop {
        tokio::select! {
            biased;

            msg = outbound_rx.recv() => {
                let Some(first) = msg else {
                    debug!(session_id = %session.session_id(), "outbound queue closed");
                    break;
                };
                let mut batch = vec![first];
                while let Ok(more) = outbound_rx.try_recv() {
                    batch.push(more);
                }
                if !write_batch(&mut sender, &batch).await {
                    break;
                }
            }

            _ = ping_interval.tick() => {
                if timeout(WRITE_WAIT, sender.send(Message::Ping(Vec::new()))).await.is_err() {
                    debug!(session_id = %session.session_id(), "ping write timed out");
                    break;
                }
            }
        }
    }

    session.close_once();
    let _ = timeout(WRITE_WAIT, sender.close()).await;
}

async fn write_batch(sender: &mut SplitSink<WebSocket, Message>, batch: &[ServerMessage]) -> bool {
    let joined = batch
        .iter()
        .filter_map(|m| serde_json::to_string(m).ok())
        .collect::<Vec<_>>()
        .join("\n");

    match timeout(WRITE_WAIT, sender.send(Message::Text(joined))).await {
        Ok(Ok(())) => true,
        _ => false,
    }
}
