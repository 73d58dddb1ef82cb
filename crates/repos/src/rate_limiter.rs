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

use async_trait::async_trait;
use core_common::CharacterId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RateLimiterError {
    #[error("rate limiter backend unavailable: {0}")]
    Unavailable(String),
}

/// Per-character admission control in front of the dispatcher. Any
/// implementation must hold at least a 20-token burst with 1 token/sec
/// refill by default; the in-memory fake in this crate is the reference.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn allow(&self, character_id: CharacterId) -> Result<bool, RateLimiterError>;
}
