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

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::info;

use core_common::{CharacterId, SessionId};
use core_repos::CharacterRepo;
use core_session::{pump, Session};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_upgrade_handler))
        .route("/healthz", get(healthz_handler))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct WsQuery {
    character_id: Option<String>,
}

/// `GET /ws?character_id=<uuid>`. Auth is a stand-in: the real handshake
/// middleware (out of scope) would place a verified user id into the
/// request context; here that's simply the `x-user-id` header.
async fn ws_upgrade_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let user_id = match headers.get("x-user-id").and_then(|v| v.to_str().ok()) {
        None => return (StatusCode::UNAUTHORIZED, "missing x-user-id").into_response(),
        Some(value) if value.trim().is_empty() => {
            return (StatusCode::BAD_REQUEST, "invalid x-user-id").into_response()
        }
        Some(value) => value.to_string(),
    };

    let character = match query.character_id {
        Some(raw) => match raw.parse::<CharacterId>() {
            Ok(character_id) => match state.character_repo.get(character_id).await {
                Ok(character) => character,
                Err(_) => return (StatusCode::BAD_REQUEST, "unknown character_id").into_response(),
            },
            Err(_) => return (StatusCode::BAD_REQUEST, "malformed character_id").into_response(),
        },
        // Stands in for `LobbyService.ensureLobbyCharacter`; this fake never
        // fails, but a real implementation's failure path is the 500 below.
        None => state.character_repo.ensure_lobby_character(&user_id),
    };

    if character.user_id != user_id {
        return (StatusCode::BAD_REQUEST, "character does not belong to this user").into_response();
    }

    info!(character_id = %character.character_id, %user_id, "upgrading websocket connection");

    ws.on_upgrade(move |socket| async move {
        let session = Arc::new(Session::new(
            SessionId::new_random(),
            character.character_id,
            user_id,
            character.world_id,
            character.name.clone(),
        ));

        let (sender, receiver) = socket.split();
        let (inbound_tx, mut inbound_rx) = tokio::sync::mpsc::unbounded_channel();
        let channel = state.hub.inbound_channel();

        channel.register(session.clone(), character.position);

        let write_task = tokio::spawn(pump::write_pump(session.clone(), sender));
        let read_task = tokio::spawn(pump::read_pump(session.clone(), receiver, inbound_tx));

        let forward_task = {
            let channel = channel.clone();
            tokio::spawn(async move {
                while let Some((session, frame)) = inbound_rx.recv().await {
                    channel.inbound(session, frame);
                }
            })
        };

        let _ = read_task.await;
        channel.unregister(character.character_id);
        forward_task.abort();
        let _ = write_task.await;
    })
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
}

async fn healthz_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: core_common::build::version(),
        uptime_seconds: state.uptime_seconds(),
    })
}
