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

//! Narrow interfaces onto the collaborators this core treats as external:
//! character/world persistence, a rate limiter, and a best-effort event
//! sink. Production backings (a real database, Redis) are out of scope;
//! this crate ships in-memory fakes suitable for the demo binary and for
//! driving the dispatcher in tests.

pub mod character;
pub mod event_sink;
pub mod fakes;
pub mod rate_limiter;
pub mod world;

pub use character::{Character, CharacterRepo, CharacterRepoError};
pub use event_sink::{DomainEvent, EventSink};
pub use fakes::{InMemoryCharacterRepo, InMemoryEventSink, InMemoryRateLimiter, InMemoryWorldRepo};
pub use rate_limiter::{RateLimiter, RateLimiterError};
pub use world::{World, WorldRepo, WorldRepoError, WorldShape};
