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

//! Parses inbound command envelopes, enforces rate limits and
//! preconditions, and routes to the lobby or in-world handler table. Only
//! depends on the hub crate's narrow [`core_hub::Broadcaster`] capability —
//! never a concrete `Hub` — which is what keeps the hub/dispatcher
//! dependency one-directional.

pub mod dispatcher;
pub mod error;
pub mod movement;

pub use dispatcher::CommandDispatcher;
pub use error::DispatchError;
