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

use async_trait::async_trait;
use core_protocol::CommandEnvelope;
use core_session::GameClient;

/// The only capability the hub imports from the command-dispatching side.
/// The hub never sees a concrete `CommandDispatcher`; it just hands
/// `(client, command)` pairs to whatever implements this, in the order they
/// arrived for that client.
#[async_trait]
pub trait CommandProcessor: Send + Sync {
    async fn process(&self, client: Arc<dyn GameClient>, command: CommandEnvelope);
}
