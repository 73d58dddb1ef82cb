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

//! One live client connection: identity, a bounded outbound queue, and the
//! read/write pumps that move frames between the socket and that queue.
//! `Session` is the production implementation of [`GameClient`]; tests drive
//! the dispatcher against a plain in-memory double instead.

pub mod client;
pub mod pump;
pub mod session;

pub use client::{GameClient, SendOutcome};
pub use session::{Session, SessionState};

use std::time::Duration;

/// Default keepalive/timeout tuning, overridable per `Session::new_with_timing`.
pub const PONG_WAIT: Duration = Duration::from_secs(60);
pub const PING_PERIOD: Duration = Duration::from_secs(54);
pub const WRITE_WAIT: Duration = Duration::from_secs(10);
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

const _: () = assert!(PING_PERIOD.as_secs() < PONG_WAIT.as_secs());
