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

//! The hub owns every live session, indexes it by character identity and
//! position, and routes inbound client messages to the command processor.
//! It imports only a narrow [`CommandProcessor`] capability from the
//! dispatcher side, and exposes only a narrow [`Broadcaster`] capability
//! back — the two never share a concrete type, which is what lets them be
//! constructed and tested independently (see the dispatcher crate's
//! cyclic-reference note).

pub mod broadcaster;
pub mod hub;
pub mod processor;

pub use broadcaster::Broadcaster;
pub use hub::Hub;
pub use processor::CommandProcessor;

/// Candidate-set size above which a broadcast fans sends out across a
/// `JoinSet` instead of sending inline on the hub's routing task.
pub const BROADCAST_WORKER_THRESHOLD: usize = 10;
